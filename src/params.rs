//! Exported runtime parameters.
//!
//! `is_libcam` selects the camera buffer timestamp source for downstream
//! consumers: `0` for system monotonic time, `1` for boot time. The value
//! lives in a shared [`CapabilityFlag`] and is optionally mirrored to a
//! parameter file as decimal text.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Context;
use tracing::{debug, warn};

/// Process-wide `is_libcam` value.
#[derive(Debug, Default)]
pub struct CapabilityFlag {
    value: AtomicU32,
    export_path: Option<PathBuf>,
}

impl CapabilityFlag {
    /// In-process flag, initially `0`, never written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag mirrored to `path` on every write.
    pub fn with_export(path: PathBuf) -> Self {
        Self {
            value: AtomicU32::new(0),
            export_path: Some(path),
        }
    }

    /// Current value.
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }

    /// Store `value` and mirror it to the parameter file, if any.
    ///
    /// A failed mirror write is logged; the in-process value is still set.
    pub fn set(&self, value: u32) {
        self.value.store(value, Ordering::SeqCst);

        if let Some(path) = &self.export_path {
            match write_param(path, value) {
                Ok(()) => debug!(path = %path.display(), value, "is_libcam exported"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to export is_libcam"),
            }
        }
    }

    /// Parameter file the flag is mirrored to.
    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }
}

/// Write `value` to `path` as decimal text, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_param(path: &Path, value: u32) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{value}\n"))
}

/// Read a decimal parameter written by [`write_param`] or by an external tool.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold an unsigned
/// integer.
pub fn read_param(path: &Path) -> anyhow::Result<u32> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read parameter {}", path.display()))?;
    raw.trim()
        .parse()
        .with_context(|| format!("parameter {} is not an unsigned integer", path.display()))
}
