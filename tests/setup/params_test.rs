//! Tests for `src/params.rs` — the exported `is_libcam` value.

use std::sync::Arc;

use userland_worker::params::{read_param, write_param, CapabilityFlag};

#[test]
fn in_process_flag_defaults_to_zero() {
    let flag = CapabilityFlag::new();
    assert_eq!(flag.get(), 0);
    assert!(flag.export_path().is_none());
}

#[test]
fn set_is_visible_through_shared_handle() {
    let flag = Arc::new(CapabilityFlag::new());
    let reader = Arc::clone(&flag);
    flag.set(1);
    assert_eq!(reader.get(), 1);
}

#[test]
fn exported_flag_is_mirrored_to_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("params/is_libcam");
    let flag = CapabilityFlag::with_export(path.clone());

    flag.set(1);

    assert_eq!(std::fs::read_to_string(&path).expect("read param"), "1\n");
    assert_eq!(read_param(&path).expect("parse param"), 1);
}

#[test]
fn unwritable_export_keeps_in_process_value() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").expect("write blocker");
    let flag = CapabilityFlag::with_export(blocker.join("is_libcam"));

    flag.set(1);

    assert_eq!(flag.get(), 1);
}

#[test]
fn read_param_accepts_external_writes() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("is_libcam");
    std::fs::write(&path, " 0 \n").expect("write param");
    assert_eq!(read_param(&path).expect("parse param"), 0);

    write_param(&path, 1).expect("write param");
    assert_eq!(read_param(&path).expect("parse param"), 1);
}

#[test]
fn read_param_rejects_garbage() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("is_libcam");
    std::fs::write(&path, "yes").expect("write param");
    assert!(read_param(&path).is_err());
}
