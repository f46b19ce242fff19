//! Command execution for both binaries

use std::process;

use clap::Parser;
use tracing::{debug, instrument};

use crate::cli::args::{CreateCli, LoadCli};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::RowOutcome;
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;

/// Parse arguments, exiting with a usage error when they are wrong.
///
/// `--help` and `--version` still exit successfully.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(exitcode::USAGE);
        }
        Err(e) => e.exit(),
    }
}

fn require_non_empty(name: &str, value: &str) -> CliResult<()> {
    if value.trim().is_empty() {
        return Err(CliError::InvalidArgs(format!("{name} must not be empty")));
    }
    Ok(())
}

fn build_container(token: &str) -> CliResult<ServiceContainer> {
    let settings = Settings::load()?;
    if let Ok(effective) = settings.to_toml() {
        debug!("effective settings:\n{}", effective);
    }
    Ok(ServiceContainer::new(settings, token)?)
}

/// Run `create-edge-dict` against the real API.
pub fn run_create(cli: &CreateCli) -> CliResult<()> {
    require_non_empty("SERVICE-ID", &cli.service_id)?;
    require_non_empty("DICTIONARY-NAME", &cli.dictionary)?;
    let container = build_container(&cli.token)?;
    execute_create(&container, cli)
}

/// Run `add-csv-to-edge-dict` against the real API.
pub fn run_load(cli: &LoadCli) -> CliResult<()> {
    require_non_empty("SERVICE-ID", &cli.service_id)?;
    require_non_empty("DICTIONARY-NAME", &cli.dictionary)?;
    let container = build_container(&cli.token)?;
    execute_load(&container, cli)
}

#[instrument(skip_all, fields(service = %cli.service_id, dictionary = %cli.dictionary))]
pub fn execute_create(container: &ServiceContainer, cli: &CreateCli) -> CliResult<()> {
    let created = container
        .creator()
        .create_with(&cli.service_id, &cli.dictionary, |dictionary| {
            output::action(
                "Edge Dictionary Added",
                &format!("Name: {} ID: {}", dictionary.name, dictionary.id),
            );
        })?;
    output::success(&format!(
        "Version Number {} is activated",
        created.version.number
    ));
    Ok(())
}

#[instrument(skip_all, fields(service = %cli.service_id, dictionary = %cli.dictionary))]
pub fn execute_load(container: &ServiceContainer, cli: &LoadCli) -> CliResult<()> {
    let summary = container.bulk_loader().load_file(
        &cli.service_id,
        &cli.dictionary,
        &cli.file,
        report_row,
    )?;
    output::info(&summary);
    Ok(())
}

fn report_row(outcome: &RowOutcome) {
    match outcome {
        RowOutcome::Added { key, value } => output::info(&format!("Added: {key} --> {value}")),
        RowOutcome::Skipped { reason, .. } => output::notice(reason),
        RowOutcome::Rejected { key, message } => {
            debug!("rejected {}: {}", key, message);
            output::notice("Something went wrong - maybe the entry key already exists.");
        }
    }
}
