//! userland-worker — deferred boot-time userland setup.
//!
//! Runs once, shortly after boot: waits for SELinux to report enforcing,
//! relaxes it, activates the vbswap device, probes for the camera service
//! library to pick a timestamp source, and restores enforcement. Every host
//! effect goes through a spawned helper program and its exit status.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod executor;
pub mod logging;
pub mod params;
pub mod selinux;
pub mod setup;
pub mod worker;
