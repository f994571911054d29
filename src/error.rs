//! Error taxonomy for the mixing console.
//!
//! Out-of-range parameter values are never errors: they are clamped and the
//! stored value is returned to the caller instead.

use thiserror::Error;

use crate::mixer::{ChannelId, SessionHandle};

pub type Result<T> = std::result::Result<T, MixerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MixerError {
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    #[error("unknown session {0}")]
    UnknownSession(SessionHandle),

    #[error("unknown channel parameter `{0}`")]
    UnknownParameter(String),

    /// The audio subsystem is missing or suspended. Retry after resuming it.
    #[error("audio subsystem unavailable: {0}")]
    Unavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Coarse classification callers can match on without caring about payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unavailable,
    InvalidConfiguration,
    InvalidInput,
}

impl MixerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MixerError::UnknownChannel(_) | MixerError::UnknownSession(_) => ErrorKind::NotFound,
            MixerError::UnknownParameter(_) => ErrorKind::InvalidInput,
            MixerError::Unavailable(_) => ErrorKind::Unavailable,
            MixerError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
        }
    }

    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        MixerError::InvalidConfiguration(msg.into())
    }

    pub(crate) fn unavailable(msg: impl Into<String>) -> Self {
        MixerError::Unavailable(msg.into())
    }
}
