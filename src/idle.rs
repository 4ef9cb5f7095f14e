//! User input idle detection.
//!
//! Provides the `IdleSource` capability and its X11 implementation.

mod x11;

pub use x11::X11IdleSource;

use thiserror::Error;

use crate::domain::IdleReading;

/// Source of "milliseconds since last input" readings for the session.
pub trait IdleSource {
    /// Query the current idle time.
    ///
    /// Must be cheap enough to call on every poll.
    fn query(&mut self) -> Result<IdleReading, IdleError>;
}

/// Errors that can occur in idle detection.
#[derive(Error, Debug)]
pub enum IdleError {
    #[error("Failed to connect to X11 display: {0}")]
    ConnectionFailed(String),

    #[error("XScreenSaver extension not available")]
    ExtensionMissing,

    #[error("Failed to query idle time: {0}")]
    QueryFailed(String),
}
