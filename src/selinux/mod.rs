//! Enforcement toggle guard.
//!
//! Polls the security subsystem until it reports "enforcing" (or the retry
//! budget runs out), relaxes enforcement around the setup actions, and puts
//! it back afterwards. A [`RelaxedEnforcement`] guard restores the state on
//! drop, so an unwinding task never leaves the host permissive.

pub mod selinuxfs;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, warn};

/// Errors produced by an [`Enforcement`] backend.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    /// The enforcement node could not be read.
    #[error("failed to read enforcement state from {}: {source}", .path.display())]
    Read {
        /// Path of the enforcement node.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The enforcement node could not be written.
    #[error("failed to write enforcement state to {}: {source}", .path.display())]
    Write {
        /// Path of the enforcement node.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The node held something other than `0` or `1`.
    #[error("unrecognised enforcement value {value:?} in {}", .path.display())]
    Malformed {
        /// Path of the enforcement node.
        path: PathBuf,
        /// Raw contents, trimmed.
        value: String,
    },
    /// The backend is not ready to answer yet.
    #[error("enforcement state unavailable: {0}")]
    Unavailable(String),
}

/// Access to the system-wide enforcement flag.
pub trait Enforcement: Send + Sync {
    /// Whether the security subsystem is currently enforcing.
    ///
    /// # Errors
    ///
    /// Returns an error when the state cannot be determined yet.
    fn is_enforcing(&self) -> Result<bool, EnforcementError>;

    /// Switch enforcement on (`true`) or to permissive (`false`).
    ///
    /// # Errors
    ///
    /// Returns an error when the state cannot be written.
    fn set_enforcing(&self, enforcing: bool) -> Result<(), EnforcementError>;
}

/// Bounds for the enforcement poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between attempts.
    pub interval: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_retries: 25,
        }
    }
}

/// One reading of the enforcement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The subsystem reported enforcing.
    Enforcing,
    /// The subsystem reported permissive.
    Permissive,
    /// The state could not be read.
    Unknown,
}

/// Result of [`read_enforcement_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Last observation made.
    pub observation: Observation,
    /// Number of reads performed, including the first.
    pub attempts: u32,
}

impl PollOutcome {
    /// Whether enforcement was confirmed and must be toggled.
    pub fn is_enforcing(&self) -> bool {
        self.observation == Observation::Enforcing
    }

    /// Whether the retry budget ran out before enforcement was confirmed.
    pub fn timed_out(&self) -> bool {
        !self.is_enforcing()
    }
}

/// What happened to the enforcement flag during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// Enforcement was never touched.
    Unchanged,
    /// Enforcement was relaxed and then restored.
    Restored,
    /// Enforcement was relaxed but writing it back failed.
    RestoreFailed(String),
}

fn observe(backend: &dyn Enforcement) -> Observation {
    match backend.is_enforcing() {
        Ok(true) => Observation::Enforcing,
        Ok(false) => Observation::Permissive,
        Err(e) => {
            debug!(error = %e, "enforcement state not readable yet");
            Observation::Unknown
        }
    }
}

/// Poll until the subsystem reports enforcing or the retry budget runs out.
///
/// A permissive or unreadable state is treated as "not settled yet" and
/// retried after `policy.interval`. Running out of retries is not an error:
/// the outcome carries the last observation and the caller skips the toggle.
pub async fn read_enforcement_with_retry(
    backend: &dyn Enforcement,
    policy: PollPolicy,
) -> PollOutcome {
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let observation = observe(backend);

        if observation == Observation::Enforcing {
            debug!(attempts, "enforcement confirmed");
            return PollOutcome {
                observation,
                attempts,
            };
        }

        if attempts.saturating_sub(1) >= policy.max_retries {
            warn!(
                attempts,
                observation = ?observation,
                "enforcement not confirmed, continuing without toggling"
            );
            return PollOutcome {
                observation,
                attempts,
            };
        }

        tokio::time::sleep(policy.interval).await;
    }
}

/// Enforcement relaxed for the lifetime of the guard.
///
/// Call [`restore`](Self::restore) on the normal path; dropping the guard
/// without it restores enforcement as well and logs the early exit.
#[must_use = "dropping the guard restores enforcement immediately"]
pub struct RelaxedEnforcement<'a> {
    backend: &'a dyn Enforcement,
    armed: bool,
}

impl<'a> RelaxedEnforcement<'a> {
    /// Switch the subsystem to permissive.
    ///
    /// A failed write is logged and the guard is still armed; writing
    /// "enforcing" back to a subsystem that never left it is harmless.
    pub fn relax(backend: &'a dyn Enforcement) -> Self {
        info!("setting selinux state: permissive");
        if let Err(e) = backend.set_enforcing(false) {
            warn!(error = %e, "failed to relax enforcement");
        }
        Self {
            backend,
            armed: true,
        }
    }

    /// Switch the subsystem back to enforcing.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the state could not be written.
    pub fn restore(mut self) -> Result<(), EnforcementError> {
        self.armed = false;
        info!("setting selinux state: enforcing");
        self.backend.set_enforcing(true)
    }
}

impl Drop for RelaxedEnforcement<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("setup interrupted, restoring enforcement");
        if let Err(e) = self.backend.set_enforcing(true) {
            error!(error = %e, "failed to restore enforcement");
        }
    }
}
