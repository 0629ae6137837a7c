//! Tests for `src/executor/argv.rs` — acquisition, population, end marker.

use userland_worker::executor::argv::{
    AllocationError, ArgVector, ArgvError, ARGV_SLOTS, ARG_CAPACITY,
};

#[test]
fn acquire_and_release_any_size() {
    for size in 1..=16 {
        let argv = ArgVector::acquire(size).expect("small vectors allocate");
        assert_eq!(argv.slot_count(), size);
        assert!(argv.is_empty());
        argv.release();
    }
}

#[test]
fn impossible_slot_capacity_fails_at_first_slot() {
    let result = ArgVector::acquire_with_capacity(ARGV_SLOTS, usize::MAX);
    match result {
        Err(AllocationError::Slot { slot, .. }) => assert_eq!(slot, 0),
        Err(other) => panic!("expected slot failure, got: {other}"),
        Ok(_) => panic!("usize::MAX capacity must not allocate"),
    }
}

#[test]
fn impossible_slot_count_fails_on_the_table() {
    let result = ArgVector::acquire_with_capacity(usize::MAX, ARG_CAPACITY);
    assert!(matches!(result, Err(AllocationError::Vector { .. })));
}

#[test]
fn populate_places_end_marker_after_arguments() {
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    argv.populate(&["/system/bin/sh", "-c", "true"])
        .expect("fits");

    assert_eq!(argv.terminator(), 3);
    assert_eq!(argv.get(0), Some("/system/bin/sh"));
    assert_eq!(argv.get(2), Some("true"));
    assert_eq!(argv.get(3), None);
}

#[test]
fn repopulating_hides_previous_longer_contents() {
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    argv.populate(&["/system/bin/test", "-d", "/a/very/long/path/that/was/here"])
        .expect("fits");
    argv.populate(&["/bin/true"]).expect("fits");

    let args: Vec<&str> = argv.args().collect();
    assert_eq!(args, vec!["/bin/true"]);
    assert_eq!(argv.terminator(), 1);
    assert_eq!(argv.get(1), None);
}

#[test]
fn argument_must_leave_room_for_nul() {
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    let exact = "a".repeat(ARG_CAPACITY);
    let err = argv
        .populate(&["/system/bin/sh", "-c", &exact])
        .expect_err("capacity-length argument must be rejected");
    assert_eq!(
        err,
        ArgvError::TooLong {
            index: 2,
            len: ARG_CAPACITY,
            capacity: ARG_CAPACITY,
        }
    );

    let fits = "a".repeat(ARG_CAPACITY.saturating_sub(1));
    assert!(argv.populate(&["/system/bin/sh", "-c", &fits]).is_ok());
}

#[test]
fn full_vector_has_no_room_for_end_marker() {
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    let err = argv
        .populate(&["a", "b", "c", "d"])
        .expect_err("four arguments do not fit in four slots");
    assert_eq!(err, ArgvError::NoTerminator { count: 4, size: 4 });
    assert!(argv.is_empty());
}

#[test]
fn split_program_separates_argv0() {
    let mut argv = ArgVector::acquire(ARGV_SLOTS).expect("should allocate");
    assert!(argv.split_program().is_none());

    argv.populate(&["/system/bin/test", "-f", "/etc/hosts"])
        .expect("fits");
    let (program, args) = argv.split_program().expect("populated");
    assert_eq!(program, "/system/bin/test");
    assert_eq!(args, vec!["-f", "/etc/hosts"]);
}
