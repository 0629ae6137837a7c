//! Production [`CommandRunner`] that spawns helpers on the host.
//!
//! The child gets a cleared environment replaced by [`ENVP`], no stdio, and
//! the caller's credentials. The wait happens on the blocking pool so the
//! runtime keeps servicing timers while a helper runs.

use std::process::{Command, Stdio};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::argv::ArgVector;
use super::{CommandRunner, ExitStatus, EINVAL, EIO};

/// Fixed environment handed to every helper.
pub const ENVP: [&str; 6] = [
    "SHELL=/bin/sh",
    "HOME=/",
    "USER=shell",
    "TERM=xterm-256color",
    "PATH=/product/bin:/apex/com.android.runtime/bin:/apex/com.android.art/bin:/system_ext/bin:/system/bin:/system/xbin:/odm/bin:/vendor/bin:/vendor/xbin",
    "DISPLAY=:0",
];

/// Spawns helpers synchronously with the fixed environment.
#[derive(Debug, Clone)]
pub struct UserModeHelper {
    env: Vec<(String, String)>,
}

impl UserModeHelper {
    /// Create a runner using [`ENVP`].
    pub fn new() -> Self {
        Self::with_env(&ENVP)
    }

    /// Create a runner with a custom `KEY=VALUE` environment list.
    ///
    /// Entries without `=` are ignored.
    pub fn with_env(envp: &[&str]) -> Self {
        Self {
            env: parse_env(envp),
        }
    }

    /// Environment pairs passed to every child.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }
}

impl Default for UserModeHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `KEY=VALUE` entries into pairs.
pub fn parse_env(envp: &[&str]) -> Vec<(String, String)> {
    envp.iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

/// Map a finished process to an [`ExitStatus`].
fn status_from_process(status: std::process::ExitStatus) -> ExitStatus {
    if let Some(code) = status.code() {
        return ExitStatus::from_code(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitStatus::from_code(128_i32.saturating_add(signal));
        }
    }

    ExitStatus::not_started(EIO)
}

#[async_trait]
impl CommandRunner for UserModeHelper {
    async fn run(&self, argv: &ArgVector) -> ExitStatus {
        let Some((program, args)) = argv.split_program() else {
            warn!("refusing to spawn an empty argument vector");
            return ExitStatus::not_started(EINVAL);
        };

        let program = program.to_owned();
        let args: Vec<String> = args.into_iter().map(str::to_owned).collect();
        let env = self.env.clone();
        debug!(program = %program, args = ?args, "spawning helper");

        let label = program.clone();
        let result = tokio::task::spawn_blocking(move || {
            Command::new(&program)
                .args(&args)
                .env_clear()
                .envs(env)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
        })
        .await;

        match result {
            Ok(Ok(status)) => status_from_process(status),
            Ok(Err(e)) => {
                warn!(program = %label, error = %e, "failed to spawn helper");
                ExitStatus::from_spawn_error(&e)
            }
            Err(e) => {
                warn!(program = %label, error = %e, "helper wait task panicked");
                ExitStatus::not_started(EIO)
            }
        }
    }
}
