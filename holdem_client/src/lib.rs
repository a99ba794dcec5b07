//! Internal modules for the line client.
//!
//! This library provides command parsing and frame rendering used by the
//! holdem_client binary.

pub mod commands;
pub mod view;
