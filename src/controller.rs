//! Idle-gated process control state machine.
//!
//! Keeps the target stopped while the user is active:
//! - Stop unconditionally on startup
//! - Continue once idle time is strictly above the threshold
//! - Stop again as soon as idle time is strictly below it
//!
//! A reading equal to the threshold never changes state.

use std::future::Future;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::ControllerConfig;
use crate::domain::Directive;
use crate::domain::IdleReading;
use crate::domain::Threshold;
use crate::idle::IdleError;
use crate::idle::IdleSource;
use crate::process::Signaller;

/// Controller state, mirroring the last directive sent to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Target stopped, waiting for the idle threshold to be crossed.
    Suspended,
    /// Target running, waiting for user activity.
    Active,
}

impl ControllerState {
    /// Delay before the next poll while in this state.
    pub fn poll_interval(self, config: &ControllerConfig) -> Duration {
        match self {
            Self::Suspended => config.suspended_poll_interval,
            Self::Active => config.active_poll_interval,
        }
    }
}

impl From<Directive> for ControllerState {
    fn from(directive: Directive) -> Self {
        match directive {
            Directive::Stop => Self::Suspended,
            Directive::Continue => Self::Active,
        }
    }
}

/// Decide which directive, if any, a reading calls for in `state`.
pub fn evaluate(
    state: ControllerState,
    reading: IdleReading,
    threshold: Threshold,
) -> Option<Directive> {
    match state {
        ControllerState::Suspended if threshold.is_exceeded_by(reading) => {
            Some(Directive::Continue)
        }
        ControllerState::Active if threshold.is_undercut_by(reading) => Some(Directive::Stop),
        _ => None,
    }
}

/// Polls an idle source and stops or continues the target accordingly.
pub struct ProcessController<I, S> {
    idle: I,
    signaller: S,
    config: ControllerConfig,
    state: ControllerState,
}

impl<I: IdleSource, S: Signaller> ProcessController<I, S> {
    /// Create a controller. No directive is sent until `start` or `run`.
    pub fn new(idle: I, signaller: S, config: ControllerConfig) -> Self {
        Self {
            idle,
            signaller,
            config,
            state: ControllerState::Suspended,
        }
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Stop the target regardless of idle time and enter `Suspended`.
    pub fn start(&mut self) {
        self.issue(Directive::Stop);
    }

    /// Take one idle reading and apply any resulting transition.
    ///
    /// Returns the state after the reading.
    pub fn poll(&mut self) -> Result<ControllerState, IdleError> {
        let reading = self.idle.query()?;
        debug!(
            "Current idle time: {}ms/{}ms",
            reading.as_millis(),
            self.config.threshold.as_millis()
        );

        if let Some(directive) = evaluate(self.state, reading, self.config.threshold) {
            self.issue(directive);
        }

        Ok(self.state)
    }

    /// Start, then poll until `shutdown` resolves or the idle source fails.
    ///
    /// Sleeps between polls for the cadence of the current state.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), IdleError>
    where
        F: Future<Output = ()>,
    {
        self.start();
        info!(
            "Controlling process {} (threshold {}ms)",
            self.config.pid,
            self.config.threshold.as_millis()
        );

        tokio::pin!(shutdown);

        loop {
            let state = self.poll()?;

            tokio::select! {
                () = tokio::time::sleep(state.poll_interval(&self.config)) => {}
                () = &mut shutdown => {
                    info!("Shutdown requested, leaving process {} {:?}", self.config.pid, self.state);
                    return Ok(());
                }
            }
        }
    }

    /// Give back the idle source and signaller.
    pub fn into_parts(self) -> (I, S) {
        (self.idle, self.signaller)
    }

    fn issue(&mut self, directive: Directive) {
        info!("{} process: {}", directive.verb(), self.config.pid);

        // Delivery failures never alter the state machine: the target is
        // assumed to be in the state last directed.
        if let Err(e) = self.signaller.deliver(self.config.pid, directive) {
            warn!("{}", e);
        }

        self.state = directive.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TargetPid;
    use crate::process::SignalError;
    use nix::errno::Errno;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    /// Replays fixed readings, then fails like a lost display.
    struct ScriptedIdle {
        readings: VecDeque<u64>,
        polled_at: Vec<Instant>,
    }

    impl IdleSource for ScriptedIdle {
        fn query(&mut self) -> Result<IdleReading, IdleError> {
            self.polled_at.push(Instant::now());
            self.readings
                .pop_front()
                .map(IdleReading::from_millis)
                .ok_or_else(|| IdleError::QueryFailed("script exhausted".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingSignaller {
        sent: Vec<(TargetPid, Directive)>,
        fail: bool,
    }

    impl Signaller for RecordingSignaller {
        fn deliver(&mut self, pid: TargetPid, directive: Directive) -> Result<(), SignalError> {
            self.sent.push((pid, directive));
            if self.fail {
                return Err(SignalError::DeliveryFailed {
                    pid,
                    signal: crate::process::signal_for(directive),
                    source: Errno::ESRCH,
                });
            }
            Ok(())
        }
    }

    fn pid() -> TargetPid {
        TargetPid::new(1234).unwrap()
    }

    fn controller(
        readings: &[u64],
        threshold_secs: u64,
    ) -> ProcessController<ScriptedIdle, RecordingSignaller> {
        let idle = ScriptedIdle {
            readings: readings.iter().copied().collect(),
            polled_at: Vec::new(),
        };
        let config = ControllerConfig::new(pid(), Threshold::from_secs(threshold_secs));
        ProcessController::new(idle, RecordingSignaller::default(), config)
    }

    fn directives(c: &ProcessController<ScriptedIdle, RecordingSignaller>) -> Vec<Directive> {
        c.signaller.sent.iter().map(|(_, d)| *d).collect()
    }

    #[test]
    fn test_evaluate_transitions() {
        let t = Threshold::from_millis(5000);
        let r = IdleReading::from_millis;

        assert_eq!(
            evaluate(ControllerState::Suspended, r(5001), t),
            Some(Directive::Continue)
        );
        assert_eq!(evaluate(ControllerState::Suspended, r(4999), t), None);
        assert_eq!(
            evaluate(ControllerState::Active, r(4999), t),
            Some(Directive::Stop)
        );
        assert_eq!(evaluate(ControllerState::Active, r(5001), t), None);
    }

    #[test]
    fn test_evaluate_dead_zone() {
        let t = Threshold::from_millis(5000);
        let r = IdleReading::from_millis(5000);
        assert_eq!(evaluate(ControllerState::Suspended, r, t), None);
        assert_eq!(evaluate(ControllerState::Active, r, t), None);
    }

    #[test]
    fn test_start_stops_once_even_when_idle() {
        let mut c = controller(&[60_000], 5);
        c.start();
        assert_eq!(directives(&c), vec![Directive::Stop]);
        assert_eq!(c.state(), ControllerState::Suspended);
        assert!(c.idle.polled_at.is_empty());
    }

    #[test]
    fn test_suspended_to_active_continues_once() {
        let mut c = controller(&[6000, 7000, 8000], 5);
        c.start();

        for _ in 0..3 {
            assert_eq!(c.poll().unwrap(), ControllerState::Active);
        }
        assert_eq!(directives(&c), vec![Directive::Stop, Directive::Continue]);
    }

    #[test]
    fn test_active_to_suspended_stops_once() {
        let mut c = controller(&[6000, 100, 200, 300], 5);
        c.start();

        assert_eq!(c.poll().unwrap(), ControllerState::Active);
        for _ in 0..3 {
            assert_eq!(c.poll().unwrap(), ControllerState::Suspended);
        }
        assert_eq!(
            directives(&c),
            vec![Directive::Stop, Directive::Continue, Directive::Stop]
        );
    }

    #[test]
    fn test_reading_at_threshold_keeps_state() {
        let mut c = controller(&[5000, 6000, 5000, 5000], 5);
        c.start();

        assert_eq!(c.poll().unwrap(), ControllerState::Suspended);
        assert_eq!(c.poll().unwrap(), ControllerState::Active);
        assert_eq!(c.poll().unwrap(), ControllerState::Active);
        assert_eq!(c.poll().unwrap(), ControllerState::Active);
        assert_eq!(directives(&c), vec![Directive::Stop, Directive::Continue]);
    }

    #[test]
    fn test_scenario_threshold_five_seconds() {
        let mut c = controller(&[0, 2000, 6000], 5);
        c.start();
        for _ in 0..3 {
            c.poll().unwrap();
        }

        assert_eq!(
            c.signaller.sent,
            vec![(pid(), Directive::Stop), (pid(), Directive::Continue)]
        );
        assert_eq!(c.state(), ControllerState::Active);
    }

    #[test]
    fn test_zero_threshold_activates_on_first_input_gap() {
        let mut c = controller(&[0, 1], 0);
        c.start();

        assert_eq!(c.poll().unwrap(), ControllerState::Suspended);
        assert_eq!(c.poll().unwrap(), ControllerState::Active);
        assert_eq!(directives(&c), vec![Directive::Stop, Directive::Continue]);
    }

    #[test]
    fn test_delivery_failure_still_transitions() {
        let mut c = controller(&[6000, 0], 5);
        c.signaller.fail = true;
        c.start();

        assert_eq!(c.state(), ControllerState::Suspended);
        assert_eq!(c.poll().unwrap(), ControllerState::Active);
        assert_eq!(c.poll().unwrap(), ControllerState::Suspended);
        assert_eq!(
            directives(&c),
            vec![Directive::Stop, Directive::Continue, Directive::Stop]
        );
    }

    #[test]
    fn test_poll_propagates_idle_error() {
        let mut c = controller(&[], 5);
        c.start();
        assert!(matches!(c.poll(), Err(IdleError::QueryFailed(_))));
        assert_eq!(directives(&c), vec![Directive::Stop]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_before_first_poll() {
        let mut c = controller(&[], 5);
        let result = c.run(std::future::pending()).await;

        assert!(result.is_err());
        assert_eq!(directives(&c), vec![Directive::Stop]);
        assert_eq!(c.idle.polled_at.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_cadence_follows_state() {
        // Suspended, Active, Active, Suspended, Suspended
        let mut c = controller(&[0, 6000, 6000, 0, 0], 5);
        let result = c.run(std::future::pending()).await;
        assert!(result.is_err());

        let at = &c.idle.polled_at;
        assert_eq!(at.len(), 6);
        let gaps: Vec<Duration> = at.windows(2).map(|w| w[1] - w[0]).collect();
        let expected = [1000, 50, 50, 1000, 1000].map(Duration::from_millis);

        for (gap, want) in gaps.iter().zip(expected) {
            assert!(
                *gap >= want && *gap < want + Duration::from_millis(5),
                "gap {gap:?}, expected {want:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_on_shutdown() {
        let mut c = controller(&[0; 10], 5);
        let shutdown = tokio::time::sleep(Duration::from_millis(2500));
        c.run(shutdown).await.unwrap();

        assert_eq!(c.idle.polled_at.len(), 3);
        assert_eq!(directives(&c), vec![Directive::Stop]);
        assert_eq!(c.state(), ControllerState::Suspended);
    }

    #[test]
    fn test_into_parts_returns_collaborators() {
        let mut c = controller(&[6000], 5);
        c.start();
        c.poll().unwrap();

        let (idle, signaller) = c.into_parts();
        assert_eq!(idle.polled_at.len(), 1);
        assert_eq!(signaller.sent.len(), 2);
    }
}
