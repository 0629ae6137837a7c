//! Tests for `src/selinux/selinuxfs.rs` against a temp enforce node.

use userland_worker::selinux::selinuxfs::{SelinuxFs, DEFAULT_ENFORCE_PATH};
use userland_worker::selinux::{Enforcement, EnforcementError};

fn node_with(contents: &str) -> (tempfile::TempDir, SelinuxFs) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("enforce");
    std::fs::write(&path, contents).expect("write node");
    (dir, SelinuxFs::new(path))
}

#[test]
fn default_points_at_selinuxfs() {
    let backend = SelinuxFs::default();
    assert_eq!(backend.path(), std::path::Path::new(DEFAULT_ENFORCE_PATH));
}

#[test]
fn reads_one_and_zero() {
    let (_dir, enforcing) = node_with("1\n");
    assert!(enforcing.is_enforcing().expect("readable"));

    let (_dir2, permissive) = node_with("0");
    assert!(!permissive.is_enforcing().expect("readable"));
}

#[test]
fn writes_round_trip_through_node() {
    let (_dir, backend) = node_with("1");

    backend.set_enforcing(false).expect("writable");
    assert_eq!(
        std::fs::read_to_string(backend.path()).expect("read node"),
        "0"
    );
    assert!(!backend.is_enforcing().expect("readable"));

    backend.set_enforcing(true).expect("writable");
    assert!(backend.is_enforcing().expect("readable"));
}

#[test]
fn malformed_contents_are_rejected() {
    let (_dir, backend) = node_with("enforcing");
    match backend.is_enforcing() {
        Err(EnforcementError::Malformed { value, .. }) => assert_eq!(value, "enforcing"),
        other => panic!("expected malformed error, got: {other:?}"),
    }
}

#[test]
fn missing_node_is_a_read_error() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let backend = SelinuxFs::new(dir.path().join("absent"));
    assert!(matches!(
        backend.is_enforcing(),
        Err(EnforcementError::Read { .. })
    ));
}

#[test]
fn unwritable_node_is_a_write_error() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let backend = SelinuxFs::new(dir.path().join("no/such/dir/enforce"));
    assert!(matches!(
        backend.set_enforcing(true),
        Err(EnforcementError::Write { .. })
    ));
}
