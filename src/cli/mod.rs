// src/cli/mod.rs
//! CLI command handlers.

pub mod args;
pub mod display;
pub mod handlers;

pub use args::{Cli, Commands};
pub use handlers::{dispatch, AppContext};
