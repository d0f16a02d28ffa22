//! Logging setup for Keel
//!
//! All crates log through `tracing` macros. This crate installs the global
//! subscriber once, from [`keel_config::LoggingConfig`], in the format the
//! operator asked for.

pub mod init;

pub use init::{build_filter, init_logging_from_config, init_simple_tracing};
