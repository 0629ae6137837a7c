//! Camera service probe that picks the buffer timestamp source.

use tracing::info;

use crate::executor::argv::ArgVector;
use crate::executor::shell::path_exists;
use crate::executor::CommandRunner;
use crate::params::CapabilityFlag;

/// Library whose presence selects monotonic timestamps.
pub const LIBCAMERASERVICE_PATH: &str = "/system/lib64/libcameraservice.so";

/// Clock used for camera buffer timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    /// System monotonic time (`is_libcam = 0`).
    Monotonic,
    /// Boot time (`is_libcam = 1`).
    BootTime,
}

impl TimestampSource {
    /// Value published as `is_libcam`.
    pub fn is_libcam(self) -> u32 {
        match self {
            Self::Monotonic => 0,
            Self::BootTime => 1,
        }
    }
}

/// Probe for `libcameraservice.so` and publish the result in `flag`.
pub async fn probe(
    runner: &dyn CommandRunner,
    argv: &mut ArgVector,
    flag: &CapabilityFlag,
) -> TimestampSource {
    // Probed with `-d` as shipped; it does not hold for a regular .so file.
    let status = path_exists(runner, argv, LIBCAMERASERVICE_PATH, true).await;

    let source = if status.success() {
        info!("libcameraservice exists in lib64, using system monotonic time for buffer timestamps");
        TimestampSource::Monotonic
    } else {
        info!(
            status = status.code(),
            "libcameraservice does not exist in lib64, using boot time for buffer timestamps"
        );
        TimestampSource::BootTime
    };

    flag.set(source.is_libcam());
    source
}
