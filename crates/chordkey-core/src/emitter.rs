use crate::error::TransportError;
use crate::keycode::Keycode;
use crate::types::Decision;
use std::time::{Duration, Instant};
use tracing::debug;

const CONNECT_POLL: Duration = Duration::from_millis(20);

/// Link to the host (USB or BLE HID). Reports are sent as issued; nothing is
/// retried or buffered on this side.
pub trait HidTransport {
    fn press(&mut self, code: Keycode) -> Result<(), TransportError>;
    fn press_pair(&mut self, first: Keycode, second: Keycode) -> Result<(), TransportError>;
    fn release_all(&mut self) -> Result<(), TransportError>;
    fn move_mouse(&mut self, dx: i8, dy: i8) -> Result<(), TransportError>;
    fn is_connected(&self) -> bool;

    /// Waits until the host is connected or `timeout` passes.
    /// Returns whether the host is connected.
    fn wait_connected(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_connected() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(CONNECT_POLL.min(deadline - now));
        }
    }
}

/// Turns decisions into HID reports. Key taps are always followed by a
/// release-all so no key stays down on the host.
pub struct Emitter<T> {
    transport: T,
}

impl<T: HidTransport> Emitter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn emit(&mut self, decision: Decision) -> Result<(), TransportError> {
        debug!("Emit {:?}", decision);
        match decision {
            Decision::Tap(code) => {
                let pressed = self.transport.press(code);
                let released = self.transport.release_all();
                pressed.and(released)
            }
            Decision::TapPair(first, second) => {
                let pressed = self.transport.press_pair(first, second);
                let released = self.transport.release_all();
                pressed.and(released)
            }
            Decision::MouseMove(dx, dy) => self.transport.move_mouse(dx, dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Report {
        Press(Keycode),
        Pair(Keycode, Keycode),
        ReleaseAll,
        Mouse(i8, i8),
    }

    #[derive(Default)]
    struct Recorder {
        log: Vec<Report>,
        fail_press: bool,
        connected_after: u32,
        polls: std::cell::Cell<u32>,
    }

    impl HidTransport for Recorder {
        fn press(&mut self, code: Keycode) -> Result<(), TransportError> {
            self.log.push(Report::Press(code));
            if self.fail_press {
                return Err(TransportError::Rejected("buffer full".into()));
            }
            Ok(())
        }

        fn press_pair(&mut self, first: Keycode, second: Keycode) -> Result<(), TransportError> {
            self.log.push(Report::Pair(first, second));
            Ok(())
        }

        fn release_all(&mut self) -> Result<(), TransportError> {
            self.log.push(Report::ReleaseAll);
            Ok(())
        }

        fn move_mouse(&mut self, dx: i8, dy: i8) -> Result<(), TransportError> {
            self.log.push(Report::Mouse(dx, dy));
            Ok(())
        }

        fn is_connected(&self) -> bool {
            let n = self.polls.get() + 1;
            self.polls.set(n);
            n > self.connected_after
        }
    }

    #[test]
    fn test_tap_is_followed_by_release_all() {
        let mut emitter = Emitter::new(Recorder::default());
        emitter.emit(Decision::Tap(Keycode::E)).unwrap();
        emitter
            .emit(Decision::TapPair(Keycode::LEFT_CONTROL, Keycode::C))
            .unwrap();
        assert_eq!(
            emitter.transport().log,
            vec![
                Report::Press(Keycode::E),
                Report::ReleaseAll,
                Report::Pair(Keycode::LEFT_CONTROL, Keycode::C),
                Report::ReleaseAll,
            ]
        );
    }

    #[test]
    fn test_mouse_move_has_no_release() {
        let mut emitter = Emitter::new(Recorder::default());
        emitter.emit(Decision::MouseMove(0, -10)).unwrap();
        assert_eq!(emitter.transport().log, vec![Report::Mouse(0, -10)]);
    }

    #[test]
    fn test_failed_press_still_releases_and_reports() {
        let mut emitter = Emitter::new(Recorder {
            fail_press: true,
            ..Default::default()
        });
        let err = emitter.emit(Decision::Tap(Keycode::A)).unwrap_err();
        assert_eq!(err, TransportError::Rejected("buffer full".into()));
        assert_eq!(
            emitter.transport().log,
            vec![Report::Press(Keycode::A), Report::ReleaseAll]
        );
    }

    #[test]
    fn test_wait_connected() {
        let mut late = Recorder {
            connected_after: 2,
            ..Default::default()
        };
        assert!(late.wait_connected(Duration::from_secs(1)));

        let mut never = Recorder {
            connected_after: u32::MAX,
            ..Default::default()
        };
        assert!(!never.wait_connected(Duration::from_millis(30)));
    }
}
