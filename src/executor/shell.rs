//! `sh -c` and `test` helpers.

use tracing::{error, info};

use super::argv::ArgVector;
use super::{CommandRunner, ExitStatus, EINVAL};

/// Interpreter used for shell commands.
pub const SHELL: &str = "/system/bin/sh";

/// Binary used for path predicates.
pub const TEST: &str = "/system/bin/test";

/// Run `cmd` through `/system/bin/sh -c` and log the outcome.
///
/// A command that does not fit in an argument slot is logged and reported as
/// `-EINVAL` without spawning anything.
pub async fn run_shell(runner: &dyn CommandRunner, argv: &mut ArgVector, cmd: &str) -> ExitStatus {
    if let Err(e) = argv.populate(&[SHELL, "-c", cmd]) {
        error!(cmd, error = %e, "refusing to run shell command");
        return ExitStatus::not_started(EINVAL);
    }

    let status = runner.run(argv).await;
    if status.success() {
        info!(cmd, "executed successfully");
    } else {
        error!(cmd, status = status.code(), "failed to execute");
    }
    status
}

/// Test whether `path` exists as a directory (`-d`) or regular file (`-f`).
///
/// Zero means the predicate held.
pub async fn path_exists(
    runner: &dyn CommandRunner,
    argv: &mut ArgVector,
    path: &str,
    is_dir: bool,
) -> ExitStatus {
    let predicate = if is_dir { "-d" } else { "-f" };
    if argv.populate(&[TEST, predicate, path]).is_err() {
        return ExitStatus::not_started(EINVAL);
    }
    runner.run(argv).await
}
