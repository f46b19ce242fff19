//! Command-line automation for Fastly edge dictionaries.
//!
//! Two tools share this library: `create-edge-dict` adds an empty dictionary
//! to a new version and activates it, `add-csv-to-edge-dict` uploads CSV rows
//! into an existing dictionary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
