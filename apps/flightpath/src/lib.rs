//! # Flightpath shell
//!
//! Library half of the `flightpath` binary: argument parsing, command
//! implementations and configuration loading. Kept as a library so the
//! integration tests can drive commands without spawning a process.

pub mod cli;
pub mod config;
