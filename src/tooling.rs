//! Tooling & Integration Layer
//!
//! The `promptmux` command line and the text formatters it prints with.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, OutputFormat};
