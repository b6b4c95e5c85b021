//! Command-line interface components
//!
//! CLI-specific code for the tripdata mirror application: argument parsing
//! and the per-command handlers.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GlobalArgs, MirrorArgs, PlanArgs};
pub use commands::{handle_mirror, handle_plan, handle_provision};
