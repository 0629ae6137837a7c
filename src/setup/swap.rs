//! vbswap activation.

use tracing::{info, warn};

use super::StepResult;
use crate::executor::argv::ArgVector;
use crate::executor::shell::run_shell;
use crate::executor::CommandRunner;

/// Shell commands issued in order: size the device, format it, enable it.
pub const SWAP_COMMANDS: [&str; 3] = [
    "/system/bin/echo 4294967296 > /sys/devices/virtual/block/vbswap0/disksize",
    "/system/bin/mkswap /dev/block/vbswap0",
    "/system/bin/swapon /dev/block/vbswap0",
];

/// Size, format and enable `vbswap0`.
///
/// Each command runs regardless of the previous one's status.
pub async fn activate(runner: &dyn CommandRunner, argv: &mut ArgVector) -> Vec<StepResult> {
    let mut results = Vec::with_capacity(SWAP_COMMANDS.len());

    for command in SWAP_COMMANDS {
        let status = run_shell(runner, argv, command).await;
        results.push(StepResult { command, status });
    }

    let failed = results.iter().filter(|r| !r.succeeded()).count();
    if failed == 0 {
        info!("vbswap0 activated");
    } else {
        warn!(failed, total = results.len(), "vbswap0 activation incomplete");
    }

    results
}
