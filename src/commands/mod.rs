//! # CLI Command Implementations
//!
//! Each command module contains:
//! - An `Args` struct that defines the command's arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `action_pins` library to do the work.

pub mod update;
