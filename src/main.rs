//! userland-worker CLI entry point.
//!
//! `start` schedules the one-shot setup task and waits for it; `check`
//! inspects the enforcement state and the camera probe without changing
//! anything.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use userland_worker::config::WorkerConfig;
use userland_worker::executor::argv::{ArgVector, ARGV_SLOTS};
use userland_worker::executor::runner::UserModeHelper;
use userland_worker::executor::shell::path_exists;
use userland_worker::logging;
use userland_worker::params::{self, CapabilityFlag};
use userland_worker::selinux::selinuxfs::SelinuxFs;
use userland_worker::selinux::Enforcement;
use userland_worker::setup::camera::LIBCAMERASERVICE_PATH;
use userland_worker::worker::{self, RunOutcome, WorkerDeps};

/// Deferred boot-time userland setup.
#[derive(Parser)]
#[command(name = "userland-worker", version, about)]
struct Cli {
    /// Config file (default: `$USERLAND_WORKER_CONFIG` or /etc/userland-worker.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Schedule the setup task once and wait for it to finish.
    Start {
        /// Treat the running image as inline and skip setup.
        #[arg(long)]
        inline: bool,
    },
    /// Report enforcement state and probe results without changing anything.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config =
        WorkerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Start { inline } => handle_start(config, inline).await,
        Command::Check => handle_check(config).await,
    }
}

/// Schedule the worker and wait for its outcome.
async fn handle_start(config: WorkerConfig, inline: bool) -> anyhow::Result<()> {
    let _logging_guard = match config.logging.dir.as_deref() {
        Some(dir) => Some(logging::init_production(dir, &config.logging.level)?),
        None => {
            logging::init_cli(&config.logging.level);
            None
        }
    };

    let is_libcam = match config.params.is_libcam_path.clone() {
        Some(path) => CapabilityFlag::with_export(path),
        None => CapabilityFlag::new(),
    };

    let deps = WorkerDeps {
        runner: Arc::new(UserModeHelper::new()),
        enforcement: Arc::new(SelinuxFs::new(config.selinux.enforce_path.clone())),
        is_libcam: Arc::new(is_libcam),
        poll: config.worker.poll_policy(),
        is_inline: inline || config.boot.inline,
    };

    info!(
        delay_ms = config.worker.start_delay_ms,
        enforce_path = %config.selinux.enforce_path.display(),
        "userland worker started"
    );

    let outcome = worker::schedule(deps, config.worker.start_delay())
        .await
        .context("userland worker task panicked")??;

    match outcome {
        RunOutcome::SkippedInline => info!("userland worker skipped"),
        RunOutcome::Completed(report) => info!(
            failed_steps = report.failed_steps(),
            is_libcam = report.timestamp_source.is_libcam(),
            "userland worker done"
        ),
    }

    Ok(())
}

/// Print enforcement state, probe status and the exported flag.
async fn handle_check(config: WorkerConfig) -> anyhow::Result<()> {
    logging::init_cli(&config.logging.level);

    let backend = SelinuxFs::new(config.selinux.enforce_path.clone());
    match backend.is_enforcing() {
        Ok(true) => println!("selinux: enforcing"),
        Ok(false) => println!("selinux: permissive"),
        Err(e) => println!("selinux: unknown ({e})"),
    }

    let runner = UserModeHelper::new();
    let mut argv = ArgVector::acquire(ARGV_SLOTS).context("couldn't allocate memory")?;
    let status = path_exists(&runner, &mut argv, LIBCAMERASERVICE_PATH, true).await;
    argv.release();
    println!("libcameraservice probe: status {status}");

    if let Some(path) = &config.params.is_libcam_path {
        match params::read_param(path) {
            Ok(value) => println!("is_libcam: {value}"),
            Err(e) => println!("is_libcam: unavailable ({e:#})"),
        }
    }

    Ok(())
}
