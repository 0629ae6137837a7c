//! Configuration loading.
//!
//! Loads `/etc/userland-worker.toml` (or `$USERLAND_WORKER_CONFIG`, or the
//! path given on the command line). Every section has defaults, so a missing
//! or empty file is valid.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::selinux::selinuxfs::DEFAULT_ENFORCE_PATH;
use crate::selinux::PollPolicy;

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/userland-worker.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "USERLAND_WORKER_CONFIG";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Task timing and poll bounds.
    pub worker: TimingConfig,
    /// Security subsystem access.
    pub selinux: SelinuxConfig,
    /// Boot image variant.
    pub boot: BootConfig,
    /// Exported parameters.
    pub params: ParamsConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl WorkerConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// `explicit` wins over `$USERLAND_WORKER_CONFIG`, which wins over
    /// [`DEFAULT_CONFIG_PATH`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = config_path_with(explicit, |key| std::env::var(key).ok());
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file only, no env overrides.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests never touch the process environment.
    /// Invalid values are ignored with a warning.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("USERLAND_WORKER_INLINE") {
            match parse_flag(&v) {
                Some(inline) => self.boot.inline = inline,
                None => warn_invalid("USERLAND_WORKER_INLINE", &v),
            }
        }

        if let Some(v) = env("USERLAND_WORKER_START_DELAY_MS") {
            match v.parse() {
                Ok(n) => self.worker.start_delay_ms = n,
                Err(_) => warn_invalid("USERLAND_WORKER_START_DELAY_MS", &v),
            }
        }

        if let Some(v) = env("USERLAND_WORKER_MAX_RETRIES") {
            match v.parse() {
                Ok(n) => self.worker.max_retries = n,
                Err(_) => warn_invalid("USERLAND_WORKER_MAX_RETRIES", &v),
            }
        }

        if let Some(v) = env("USERLAND_WORKER_ENFORCE_PATH") {
            self.selinux.enforce_path = PathBuf::from(v);
        }
    }
}

/// Resolve the config path using a custom env resolver.
#[doc(hidden)]
pub fn config_path_with(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(p) = env(CONFIG_PATH_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn warn_invalid(var: &str, value: &str) {
    tracing::warn!(var, value, "ignoring invalid env override");
}

// ── Sections ────────────────────────────────────────────────────

/// Task timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between scheduling and running the task.
    pub start_delay_ms: u64,
    /// Delay between enforcement polls.
    pub poll_interval_ms: u64,
    /// Enforcement poll retries after the first attempt.
    pub max_retries: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 500,
            poll_interval_ms: 500,
            max_retries: 25,
        }
    }
}

impl TimingConfig {
    /// Delay before the task runs.
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Poll bounds for the enforcement guard.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_retries: self.max_retries,
        }
    }
}

/// Security subsystem settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelinuxConfig {
    /// selinuxfs enforce node.
    pub enforce_path: PathBuf,
}

impl Default for SelinuxConfig {
    fn default() -> Self {
        Self {
            enforce_path: PathBuf::from(DEFAULT_ENFORCE_PATH),
        }
    }
}

/// Boot image variant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Inline image: the task does nothing.
    pub inline: bool,
}

/// Exported parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    /// File mirroring `is_libcam`; unset keeps the value in-process only.
    pub is_libcam_path: Option<PathBuf>,
}

/// Log output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for JSON log files; unset logs to stderr only.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            dir: None,
        }
    }
}
