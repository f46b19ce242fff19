//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, ValueHint};

/// Options shared by both tools.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Increase log verbosity on stderr (-d, -dd, -ddd)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,
}

/// Create a new edge dictionary in a clone of the latest version and activate it
#[derive(Parser, Debug)]
#[command(name = "create-edge-dict")]
#[command(author, version, about, long_about = None)]
pub struct CreateCli {
    /// Fastly API token
    #[arg(value_name = "API-TOKEN")]
    pub token: String,

    /// Service to change
    #[arg(value_name = "SERVICE-ID")]
    pub service_id: String,

    /// Name of the dictionary to create
    #[arg(value_name = "DICTIONARY-NAME")]
    pub dictionary: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Add key/value pairs from a CSV file to an existing edge dictionary
///
/// Column 1 is the key, column 3 the value; other columns are ignored.
#[derive(Parser, Debug)]
#[command(name = "add-csv-to-edge-dict")]
#[command(author, version, about, long_about)]
pub struct LoadCli {
    /// Fastly API token
    #[arg(value_name = "API-TOKEN")]
    pub token: String,

    /// Service owning the dictionary
    #[arg(value_name = "SERVICE-ID")]
    pub service_id: String,

    /// Name of the dictionary to fill
    #[arg(value_name = "DICTIONARY-NAME")]
    pub dictionary: String,

    /// CSV file with the entries
    #[arg(value_name = "FILE-PATH", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}
