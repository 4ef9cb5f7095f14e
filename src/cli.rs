//! Command-line interface.
//!
//! Invalid input never produces a failure status: a wrong argument count or
//! a malformed value prints the usage text and exits 0.

use std::ffi::OsString;

use clap::Parser;
use clap::error::ErrorKind;

/// Usage text printed for a wrong argument count or malformed values.
pub const USAGE: &str = "\
Stops a process given by [pid], until the user has been inactive for [secs] seconds.
Usage: idlestop [secs] [pid]
Note that killing idlestop will not make the process continue - send SIGCONT to it to do that.";

/// Stop a process while the user is active, continue it once they go idle.
#[derive(Parser, Debug)]
#[command(name = "idlestop")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Killing idlestop leaves the process in its current state.")]
pub struct Args {
    /// Idle time in seconds after which the process may run.
    pub seconds: u64,

    /// Process to control.
    #[arg(allow_negative_numbers = true)]
    pub pid: i32,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log directives instead of signalling the process.
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of parsing the command line.
#[derive(Debug)]
pub enum Invocation {
    /// Arguments are well-formed; pid still needs validation.
    Run(Args),
    /// Help or version output was requested.
    Info(clap::Error),
    /// Wrong argument count (`None`) or a malformed value.
    Usage(Option<clap::Error>),
}

/// Parse arguments, sorting every parse failure into an `Invocation`.
pub fn parse_from<I, T>(argv: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Ok(args) => Invocation::Run(args),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Invocation::Info(e),
            ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument => {
                Invocation::Usage(None)
            }
            _ => Invocation::Usage(Some(e)),
        },
    }
}
