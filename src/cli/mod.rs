//! CLI layer: argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

pub use args::{CommonArgs, CreateCli, LoadCli};
pub use error::{CliError, CliResult};
