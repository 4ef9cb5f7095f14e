//! idlestop - keep a process stopped until the user goes idle.
//!
//! Polls X11 idle time and sends `SIGCONT` to the target once the user has
//! been inactive for the given number of seconds, and `SIGSTOP` as soon as
//! they are back.

use anyhow::Context;
use anyhow::Result;
use idlestop::ControllerConfig;
use idlestop::ControllerState;
use idlestop::DryRunSignaller;
use idlestop::KillSignaller;
use idlestop::ProcessController;
use idlestop::Signaller;
use idlestop::TargetPid;
use idlestop::Threshold;
use idlestop::X11IdleSource;
use idlestop::cli;
use idlestop::cli::Invocation;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match cli::parse_from(std::env::args_os()) {
        Invocation::Run(args) => args,
        Invocation::Info(e) => {
            e.print()?;
            return Ok(());
        }
        Invocation::Usage(e) => {
            if let Some(e) = e {
                e.print()?;
            }
            println!("{}", cli::USAGE);
            return Ok(());
        }
    };

    let pid = match TargetPid::new(args.pid) {
        Ok(pid) => pid,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    init_logging(&args.log_level)?;

    info!("idlestop v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ControllerConfig::new(pid, Threshold::from_secs(args.seconds));
    let idle = X11IdleSource::open().context("Failed to open X11 idle time source")?;

    if args.dry_run {
        info!("Dry run: no signals will be sent");
        run(idle, DryRunSignaller, config).await
    } else {
        run(idle, KillSignaller, config).await
    }
}

/// Initialize logging with the specified level.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(format!("idlestop={level}"))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

/// Drive the controller until shutdown, then release the display.
async fn run<S: Signaller>(
    idle: X11IdleSource,
    signaller: S,
    config: ControllerConfig,
) -> Result<()> {
    let mut controller = ProcessController::new(idle, signaller, config);
    let result = controller.run(shutdown_signal()).await;

    let state = controller.state();
    let (idle, _) = controller.into_parts();
    idle.close();

    result.context("Idle time source became unavailable")?;

    if state == ControllerState::Suspended {
        warn!(
            "Process {} is still stopped; send SIGCONT to it to resume",
            config.pid
        );
    }
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::SignalKind;
    use tokio::signal::unix::signal;

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}
