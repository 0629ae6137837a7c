//! [`Enforcement`] backend over the selinuxfs `enforce` node.

use std::path::{Path, PathBuf};

use super::{Enforcement, EnforcementError};

/// Default location of the enforce node.
pub const DEFAULT_ENFORCE_PATH: &str = "/sys/fs/selinux/enforce";

/// Reads and writes `"1"` / `"0"` on the selinuxfs enforce node.
#[derive(Debug, Clone)]
pub struct SelinuxFs {
    enforce_path: PathBuf,
}

impl SelinuxFs {
    /// Backend for the node at `enforce_path`.
    pub fn new(enforce_path: PathBuf) -> Self {
        Self { enforce_path }
    }

    /// Path of the enforce node.
    pub fn path(&self) -> &Path {
        &self.enforce_path
    }
}

impl Default for SelinuxFs {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_ENFORCE_PATH))
    }
}

impl Enforcement for SelinuxFs {
    fn is_enforcing(&self) -> Result<bool, EnforcementError> {
        let raw =
            std::fs::read_to_string(&self.enforce_path).map_err(|source| EnforcementError::Read {
                path: self.enforce_path.clone(),
                source,
            })?;

        match raw.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(EnforcementError::Malformed {
                path: self.enforce_path.clone(),
                value: other.to_owned(),
            }),
        }
    }

    fn set_enforcing(&self, enforcing: bool) -> Result<(), EnforcementError> {
        let value = if enforcing { "1" } else { "0" };
        std::fs::write(&self.enforce_path, value).map_err(|source| EnforcementError::Write {
            path: self.enforce_path.clone(),
            source,
        })
    }
}
