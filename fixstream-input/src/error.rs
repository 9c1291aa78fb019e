/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Error types for the consumer-facing input.

use crate::context::ContextError;
use fixstream_core::error::{ConfigError, EngineError};
use thiserror::Error;

/// Errors surfaced by [`crate::Input`] operations.
#[derive(Debug, Error)]
pub enum InputError {
    /// `read` was called before a successful `connect` or after the event
    /// channel was torn down.
    #[error("not connected")]
    NotConnected,

    /// The event channel is closed and drained.
    #[error("end of input")]
    EndOfInput,

    /// The caller's context was cancelled.
    #[error("context cancelled")]
    Cancelled,

    /// The caller's context deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The input has been closed and cannot be reconnected.
    #[error("input is closed")]
    Closed,

    /// Engine construction or lifecycle failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine settings could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The input configuration is not valid.
    #[error("invalid input configuration: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    /// An event could not be rendered.
    #[error("failed to render event: {0}")]
    Render(#[source] serde_json::Error),
}

impl From<ContextError> for InputError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => Self::Cancelled,
            ContextError::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

impl InputError {
    /// Returns true if the error came from the caller's context.
    #[must_use]
    pub const fn is_context(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
