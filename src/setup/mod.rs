//! Setup actions run while enforcement is relaxed.
//!
//! Both actions are best effort: every step is attempted, failures are logged
//! and recorded, nothing is rolled back.

pub mod camera;
pub mod swap;

use crate::executor::ExitStatus;

/// Outcome of one setup command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Command line as issued.
    pub command: &'static str,
    /// Exit status reported by the runner.
    pub status: ExitStatus,
}

impl StepResult {
    /// Whether the command exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.status.success()
    }
}
