//! Runtime configuration for the controller.
//!
//! There is no config file: everything comes from the command line and is
//! validated before any resource is acquired.

use std::time::Duration;

use crate::domain::TargetPid;
use crate::domain::Threshold;

/// Poll cadence while the target is stopped.
pub const SUSPENDED_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll cadence while the target is running.
pub const ACTIVE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for one controller run. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Process to stop and continue.
    pub pid: TargetPid,

    /// Idle time above which the target may run.
    pub threshold: Threshold,

    /// Delay between polls while the target is stopped (default: 1s).
    pub suspended_poll_interval: Duration,

    /// Delay between polls while the target is running (default: 50ms).
    pub active_poll_interval: Duration,
}

impl ControllerConfig {
    /// Create a config with the default poll cadences.
    pub fn new(pid: TargetPid, threshold: Threshold) -> Self {
        Self {
            pid,
            threshold,
            suspended_poll_interval: SUSPENDED_POLL_INTERVAL,
            active_poll_interval: ACTIVE_POLL_INTERVAL,
        }
    }
}
