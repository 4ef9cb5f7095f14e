//! Domain types for idle-gated process control.

use std::fmt;

use thiserror::Error;

/// Milliseconds since the last user input event.
///
/// Produced fresh on every poll and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IdleReading(u64);

impl IdleReading {
    /// Create a reading from milliseconds of inactivity.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Get the reading in milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

/// Idle duration separating suspended from active behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(u64);

impl Threshold {
    /// Create a threshold from whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Create a threshold from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Get the threshold in milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns true if the reading is strictly above the threshold.
    pub fn is_exceeded_by(self, reading: IdleReading) -> bool {
        reading.0 > self.0
    }

    /// Returns true if the reading is strictly below the threshold.
    pub fn is_undercut_by(self, reading: IdleReading) -> bool {
        reading.0 < self.0
    }
}

/// Identifier of the controlled process. Always strictly positive.
///
/// Zero and negative values address process groups or every process the
/// caller may signal, so they are rejected on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetPid(i32);

impl TargetPid {
    /// Validate a raw pid.
    pub fn new(raw: i32) -> Result<Self, PidError> {
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(PidError::NotPositive(raw))
        }
    }

    /// Get the raw pid.
    pub fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TargetPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected pid values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PidError {
    #[error("You don't want to do this with pid: {0}")]
    NotPositive(i32),
}

/// Instruction sent to the target process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Suspend execution (`SIGSTOP`).
    Stop,
    /// Resume execution (`SIGCONT`).
    Continue,
}

impl Directive {
    /// Progressive verb used when logging the directive.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Stop => "Stopping",
            Self::Continue => "Continuing",
        }
    }
}
