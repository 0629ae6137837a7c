//! The deferred userland setup task.
//!
//! [`schedule`] submits [`run`] once on the runtime after a delay and returns
//! immediately. The task has no cancellation path: once scheduled it runs to
//! completion, and the only early exit is the inline-image check.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::executor::argv::{AllocationError, ArgVector, ARGV_SLOTS, ARG_CAPACITY};
use crate::executor::CommandRunner;
use crate::params::CapabilityFlag;
use crate::selinux::{self, Enforcement, PollOutcome, PollPolicy, RelaxedEnforcement, Toggle};
use crate::setup::camera::{self, TimestampSource};
use crate::setup::{swap, StepResult};

/// Handles the task reads and writes.
pub struct WorkerDeps {
    /// Spawns helper programs.
    pub runner: Arc<dyn CommandRunner>,
    /// Security subsystem accessor.
    pub enforcement: Arc<dyn Enforcement>,
    /// Published `is_libcam` value.
    pub is_libcam: Arc<CapabilityFlag>,
    /// Enforcement poll bounds.
    pub poll: PollPolicy,
    /// Inline image: skip every setup action.
    pub is_inline: bool,
}

/// Errors that abort a run before any setup action.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The argument buffers could not be allocated.
    #[error("couldn't allocate memory: {0}")]
    Allocation(#[from] AllocationError),
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Enforcement poll result.
    pub poll: PollOutcome,
    /// What happened to the enforcement flag.
    pub toggle: Toggle,
    /// Swap activation steps, in order.
    pub swap: Vec<StepResult>,
    /// Timestamp source chosen by the camera probe.
    pub timestamp_source: TimestampSource,
}

impl RunReport {
    /// Number of swap steps that did not exit with status 0.
    pub fn failed_steps(&self) -> usize {
        self.swap.iter().filter(|s| !s.succeeded()).count()
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Inline image detected, nothing was done.
    SkippedInline,
    /// Setup actions ran.
    Completed(RunReport),
}

/// Run the setup task once.
///
/// # Errors
///
/// Returns [`WorkerError::Allocation`] when the argument buffers cannot be
/// acquired; no setup action runs in that case.
pub async fn run(deps: &WorkerDeps) -> Result<RunOutcome, WorkerError> {
    run_with_capacity(deps, ARG_CAPACITY).await
}

/// [`run`] with a custom argument slot capacity.
///
/// # Errors
///
/// Returns [`WorkerError::Allocation`] when the argument buffers cannot be
/// acquired.
#[doc(hidden)]
pub async fn run_with_capacity(
    deps: &WorkerDeps,
    capacity: usize,
) -> Result<RunOutcome, WorkerError> {
    if deps.is_inline {
        info!("inline ROM detected, skipping userland worker");
        return Ok(RunOutcome::SkippedInline);
    }

    let mut argv = match ArgVector::acquire_with_capacity(ARGV_SLOTS, capacity) {
        Ok(argv) => argv,
        Err(e) => {
            error!(error = %e, "couldn't allocate argument buffers");
            return Err(e.into());
        }
    };

    let backend = deps.enforcement.as_ref();
    let poll = selinux::read_enforcement_with_retry(backend, deps.poll).await;
    let guard = poll
        .is_enforcing()
        .then(|| RelaxedEnforcement::relax(backend));

    let runner = deps.runner.as_ref();
    let swap = swap::activate(runner, &mut argv).await;
    let timestamp_source = camera::probe(runner, &mut argv, &deps.is_libcam).await;

    let toggle = match guard {
        None => Toggle::Unchanged,
        Some(guard) => match guard.restore() {
            Ok(()) => Toggle::Restored,
            Err(e) => {
                error!(error = %e, "failed to restore enforcement");
                Toggle::RestoreFailed(e.to_string())
            }
        },
    };

    argv.release();

    let report = RunReport {
        poll,
        toggle,
        swap,
        timestamp_source,
    };
    info!(
        poll_attempts = report.poll.attempts,
        toggle = ?report.toggle,
        failed_steps = report.failed_steps(),
        is_libcam = report.timestamp_source.is_libcam(),
        "userland worker finished"
    );

    Ok(RunOutcome::Completed(report))
}

/// Submit [`run`] to execute once after `delay`.
///
/// Returns immediately; the handle resolves with the run's outcome.
pub fn schedule(
    deps: WorkerDeps,
    delay: Duration,
) -> JoinHandle<Result<RunOutcome, WorkerError>> {
    debug!(
        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        "scheduling userland worker"
    );

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        run(&deps).await
    })
}
