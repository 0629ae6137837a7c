//! Tests for `src/setup/camera.rs` — timestamp source selection.

use userland_worker::executor::argv::{ArgVector, ARGV_SLOTS};
use userland_worker::executor::shell::TEST;
use userland_worker::params::CapabilityFlag;
use userland_worker::setup::camera::{probe, TimestampSource, LIBCAMERASERVICE_PATH};

use crate::support::ScriptedRunner;

#[tokio::test]
async fn probe_uses_directory_predicate_on_library_path() {
    let runner = ScriptedRunner::succeeding();
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    let flag = CapabilityFlag::new();

    probe(&runner, &mut argv, &flag).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec![TEST, "-d", LIBCAMERASERVICE_PATH]);
}

#[tokio::test]
async fn present_library_selects_monotonic() {
    let runner = ScriptedRunner::succeeding();
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    let flag = CapabilityFlag::new();
    flag.set(1);

    let source = probe(&runner, &mut argv, &flag).await;

    assert_eq!(source, TimestampSource::Monotonic);
    assert_eq!(flag.get(), 0);
}

#[tokio::test]
async fn absent_library_selects_boot_time() {
    let runner = ScriptedRunner::new(|_| 1);
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    let flag = CapabilityFlag::new();

    let source = probe(&runner, &mut argv, &flag).await;

    assert_eq!(source, TimestampSource::BootTime);
    assert_eq!(flag.get(), 1);
}

#[tokio::test]
async fn unstartable_test_binary_selects_boot_time() {
    let runner = ScriptedRunner::new(|_| -2);
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    let flag = CapabilityFlag::new();

    assert_eq!(
        probe(&runner, &mut argv, &flag).await,
        TimestampSource::BootTime
    );
}

#[test]
fn is_libcam_values() {
    assert_eq!(TimestampSource::Monotonic.is_libcam(), 0);
    assert_eq!(TimestampSource::BootTime.is_libcam(), 1);
}
