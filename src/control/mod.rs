// src/control/mod.rs

//! Operator-facing control inputs: typed commands and termination signals.

pub mod commands;
pub mod shutdown;

pub use commands::{OperatorCommand, parse_command, spawn_command_reader};
pub use shutdown::spawn_signal_listener;
