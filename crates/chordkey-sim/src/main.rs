//! Drives the chord engine from a scripted trace of physical pin presses and
//! prints the HID reports a host would receive.
//!
//! ```bash
//! chordkey-sim --keymap c7k demos/c7k-hello.json
//! RUST_LOG=chordkey_core=debug chordkey-sim --keymap nnv2 --profile fast.json trace.json
//! ```

mod script;
mod virtual_hw;

use anyhow::{anyhow, Context};
use chordkey_core::{layouts, Engine, Profile};
use clap::Parser;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use script::Script;
use virtual_hw::{ChannelTransport, HostReport, VirtualBank, VirtualExpander};

/// Chorded keyboard simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board keymap: c7k (wired, one hand) or nnv2 (wireless, two hands)
    #[arg(short, long, default_value = "c7k")]
    keymap: String,

    /// JSON file with timing overrides; missing fields keep the board preset
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// JSON array of frames: {"hold_ms": N, "left": [pins], "right": [pins]}
    script: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_profile(base: &Profile, path: &Path) -> anyhow::Result<Profile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    let mut value = serde_json::to_value(base)?;
    let overrides: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid profile {}", path.display()))?;
    if let (Some(fields), Some(patch)) = (value.as_object_mut(), overrides.as_object()) {
        for (k, v) in patch {
            fields.insert(k.clone(), v.clone());
        }
    }
    Ok(serde_json::from_value(value)?)
}

fn print_reports(rx: Receiver<HostReport>) -> usize {
    let mut count = 0;
    for report in rx {
        println!("{}", report);
        count += 1;
    }
    count
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let board = layouts::by_name(&args.keymap)
        .ok_or_else(|| anyhow!("Unknown keymap '{}' (expected c7k or nnv2)", args.keymap))?;
    let script = Script::load(&args.script)?;
    info!(
        "Loaded {} frames ({:?}) from {}",
        script.frames.len(),
        script.duration(),
        args.script.display()
    );

    let bank = Arc::new(Mutex::new(VirtualBank::default()));
    let (tx, rx) = crossbeam_channel::unbounded();
    let host = thread::spawn(move || print_reports(rx));

    let mut engine = Engine::new(
        board,
        VirtualExpander::new(bank.clone()),
        ChannelTransport::new(tx, bank.clone()),
    );
    if let Some(path) = &args.profile {
        let profile = load_profile(engine.profile(), path)?;
        info!("Profile override from {}", path.display());
        engine.set_profile(profile);
    }

    let player = script.spawn_player(bank);
    let summary = engine.run()?;
    // Dropping the engine closes the report channel.
    drop(engine);

    player
        .join()
        .map_err(|_| anyhow!("Script player thread panicked"))?;
    let received = host
        .join()
        .map_err(|_| anyhow!("Host thread panicked"))?;

    info!(
        "Done: {} cycles, {} decisions, {} reports received.",
        summary.cycles, summary.emitted, received
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_profile_override_keeps_preset_fields() {
        let dir = std::env::temp_dir().join(format!("chordkey-sim-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("profile.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{"poll_interval_ms": 5, "normal_repeat": true}}"#).unwrap();

        let base = Profile::wireless();
        let profile = load_profile(&base, &path).unwrap();
        assert_eq!(profile.poll_interval_ms, 5);
        assert!(profile.normal_repeat);
        assert_eq!(profile.combo_window_ms, base.combo_window_ms);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
