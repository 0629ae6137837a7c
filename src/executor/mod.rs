//! Helper program execution: argument buffers, the spawning seam, and the
//! shell/test helpers built on top of it.

use std::fmt;

use async_trait::async_trait;

pub mod argv;
pub mod runner;
pub mod shell;

use argv::ArgVector;

/// `EINVAL`, reported when a command is refused before spawning.
pub const EINVAL: i32 = 22;

/// `EIO`, reported when the spawn outcome could not be observed.
pub const EIO: i32 = 5;

/// Exit status of a helper invocation.
///
/// `0` is success and positive values are the program's own exit code
/// (`128 + signal` when it was killed). Negative values are `-errno` for a
/// program that never started, as with kernel user-mode helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(i32);

impl ExitStatus {
    /// Successful exit.
    pub const SUCCESS: Self = Self(0);

    /// Status from a raw exit code.
    pub fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Status for a program that could not be started.
    pub fn not_started(errno: i32) -> Self {
        Self(errno.saturating_abs().saturating_neg())
    }

    /// Status for a spawn that failed with an I/O error.
    pub fn from_spawn_error(err: &std::io::Error) -> Self {
        Self::not_started(err.raw_os_error().unwrap_or(EIO))
    }

    /// Raw status code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Whether the program exited with code 0.
    pub fn success(self) -> bool {
        self.0 == 0
    }

    /// Whether the program was actually started.
    pub fn started(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spawns the program named by `argv[0]` and waits for it to terminate.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the populated prefix of `argv` and return its exit status.
    ///
    /// Blocks the calling task until the child terminates. Failures are
    /// reported through the status, never as a panic or an error.
    async fn run(&self, argv: &ArgVector) -> ExitStatus;
}
