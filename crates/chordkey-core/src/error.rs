use crate::matrix::PinId;
use std::time::Duration;
use thiserror::Error;

/// A single pin could not be read this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transient read failure on {pin}")]
pub struct PinError {
    pub pin: PinId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("host connection lost")]
    Disconnected,
    #[error("transport rejected report: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("host did not connect within {0:?}")]
    ConnectTimeout(Duration),
}
