//! Stop/continue signal delivery to the target process.

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use thiserror::Error;
use tracing::info;

use crate::domain::Directive;
use crate::domain::TargetPid;

/// Delivers directives to a process.
pub trait Signaller {
    /// Send the signal for `directive` to `pid`.
    fn deliver(&mut self, pid: TargetPid, directive: Directive) -> Result<(), SignalError>;
}

/// Errors that can occur while signalling the target.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Failed to send {signal} to process {pid}: {source}")]
    DeliveryFailed {
        pid: TargetPid,
        signal: Signal,
        #[source]
        source: Errno,
    },
}

/// OS signal for a directive.
pub fn signal_for(directive: Directive) -> Signal {
    match directive {
        Directive::Stop => Signal::SIGSTOP,
        Directive::Continue => Signal::SIGCONT,
    }
}

/// Sends real `SIGSTOP`/`SIGCONT` signals with `kill(2)`.
#[derive(Debug, Default)]
pub struct KillSignaller;

impl Signaller for KillSignaller {
    fn deliver(&mut self, pid: TargetPid, directive: Directive) -> Result<(), SignalError> {
        let signal = signal_for(directive);
        kill(Pid::from_raw(pid.as_raw()), signal).map_err(|source| {
            SignalError::DeliveryFailed {
                pid,
                signal,
                source,
            }
        })
    }
}

/// Logs directives instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunSignaller;

impl Signaller for DryRunSignaller {
    fn deliver(&mut self, pid: TargetPid, directive: Directive) -> Result<(), SignalError> {
        info!(
            "[DRY RUN] Would send {} to process {}",
            signal_for(directive),
            pid
        );
        Ok(())
    }
}
