//! idlestop - run a background process only while the user is idle.
//!
//! Stops the target process with `SIGSTOP` while there is user input on the
//! X11 session and continues it with `SIGCONT` once the session has been idle
//! longer than a threshold.

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod idle;
pub mod process;

pub use config::ControllerConfig;
pub use controller::ControllerState;
pub use controller::ProcessController;
pub use domain::Directive;
pub use domain::IdleReading;
pub use domain::TargetPid;
pub use domain::Threshold;
pub use idle::IdleSource;
pub use idle::X11IdleSource;
pub use process::DryRunSignaller;
pub use process::KillSignaller;
pub use process::Signaller;
