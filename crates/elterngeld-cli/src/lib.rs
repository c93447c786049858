//! Elterngeld CLI library
//!
//! Argument parsing, answer printing and the `ask` and `chat` commands. The
//! binary in `main.rs` sets up logging and wires these together.

pub mod cli;
pub mod commands;
pub mod output;
