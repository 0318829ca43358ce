//! Keymaster host - self-update and remote control for an installed application
//!
//! Runs the update check loop and the control-channel loop side by side and
//! funnels every UI call from both through one pump on the main task.

mod bridge;
mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use keymaster_control::ControlChannelMonitor;
use keymaster_core::types::LoggingConfig;
use keymaster_core::{ui_channel, HierarchicalConfigLoader, PumpExit, RuntimeConfig, UiBridge};
use keymaster_update::{CheckOutcome, UpdateOrchestrator};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bridge::{default_controls, ConsoleBridge};
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    let config = HierarchicalConfigLoader::new()?
        .with_file(cli.config.clone())
        .load_runtime_config()
        .context("Failed to load configuration")?;

    init_tracing(cli.verbose, cli.quiet, &config.logging)?;

    let host = Arc::new(ConsoleBridge::new(
        default_controls(),
        console::user_attended(),
    ));
    let (dispatcher, pump) = ui_channel(host);
    let bridge: Arc<dyn UiBridge> = Arc::new(dispatcher);

    let orchestrator = Arc::new(
        UpdateOrchestrator::from_config(&config, env!("CARGO_PKG_VERSION"), bridge.clone())
            .context("Failed to initialize updater")?,
    );
    let monitor = Arc::new(
        ControlChannelMonitor::from_config(&config, bridge)
            .context("Failed to initialize control channel")?,
    );

    output::kv("Current version", &orchestrator.current_version().to_string());

    if cli.once {
        return run_once(orchestrator, monitor, pump.run()).await;
    }

    run(&config, orchestrator, monitor, pump.run()).await
}

/// Run both loops until the pump terminates or the user interrupts
async fn run(
    config: &RuntimeConfig,
    orchestrator: Arc<UpdateOrchestrator>,
    monitor: Arc<ControlChannelMonitor>,
    pump: impl std::future::Future<Output = PumpExit>,
) -> Result<()> {
    let update_task = orchestrator.start_periodic_checks(config.update.check_interval());
    let control_task = monitor.start();

    tokio::select! {
        exit = pump => {
            debug!("UI pump exited: {:?}", exit);
            if exit == PumpExit::Terminated {
                std::process::exit(0);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping");
        }
    }

    update_task.stop().await;
    control_task.stop().await;
    Ok(())
}

/// One update check and one control poll. Exits the process if either one
/// terminates the application.
async fn run_once(
    orchestrator: Arc<UpdateOrchestrator>,
    monitor: Arc<ControlChannelMonitor>,
    pump: impl std::future::Future<Output = PumpExit>,
) -> Result<()> {
    let work = tokio::spawn(async move {
        let outcome = orchestrator.check().await;
        orchestrator.wait_for_session().await;
        monitor.poll_once().await;
        (outcome, monitor.current_status())
    });

    // The dispatchers live inside `work`, so the pump disconnects once it is done.
    if pump.await == PumpExit::Terminated {
        std::process::exit(0);
    }

    let (outcome, status) = work.await.context("Update task failed")?;
    match outcome {
        CheckOutcome::Failed(e) => output::error(&format!("Update check failed: {}", e)),
        other => debug!("Update check: {:?}", other),
    }
    output::kv("Control status", status.as_str());
    Ok(())
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool, logging: &LoggingConfig) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .with(filter)
        .init();
    Ok(())
}
