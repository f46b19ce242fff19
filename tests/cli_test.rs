//! CLI argument parsing, exit code mapping and command execution

use std::sync::Arc;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use edgedict::application::ApplicationError;
use edgedict::cli::commands::{execute_create, execute_load};
use edgedict::cli::{CliError, CreateCli, LoadCli};
use edgedict::config::Settings;
use edgedict::domain::DomainError;
use edgedict::exitcode;
use edgedict::infrastructure::di::ServiceContainer;
use edgedict::infrastructure::traits::{ApiError, RealFileSystem};
use edgedict::infrastructure::InfraError;
use edgedict::util::testing::{init_test_setup, FakeConfigApi, Operation};

fn container(api: Arc<FakeConfigApi>) -> ServiceContainer {
    init_test_setup();
    ServiceContainer::with_deps(Settings::default(), api, Arc::new(RealFileSystem))
}

#[rstest]
#[case::no_args(&["create-edge-dict"])]
#[case::two_args(&["create-edge-dict", "token", "svc"])]
#[case::four_args(&["create-edge-dict", "token", "svc", "dict", "extra"])]
fn given_wrong_arity_when_parsing_create_then_error(#[case] argv: &[&str]) {
    assert!(CreateCli::try_parse_from(argv).is_err());
}

#[rstest]
#[case::three_args(&["add-csv-to-edge-dict", "token", "svc", "dict"])]
#[case::five_args(&["add-csv-to-edge-dict", "token", "svc", "dict", "f.csv", "extra"])]
fn given_wrong_arity_when_parsing_load_then_error(#[case] argv: &[&str]) {
    assert!(LoadCli::try_parse_from(argv).is_err());
}

#[test]
fn given_positionals_when_parsing_load_then_fields_in_order() {
    let cli = LoadCli::try_parse_from([
        "add-csv-to-edge-dict",
        "token",
        "svc",
        "redirects",
        "entries.csv",
        "-dd",
    ])
    .unwrap();

    assert_eq!(cli.token, "token");
    assert_eq!(cli.service_id, "svc");
    assert_eq!(cli.dictionary, "redirects");
    assert_eq!(cli.file.to_str(), Some("entries.csv"));
    assert_eq!(cli.common.debug, 2);
}

#[rstest]
#[case::usage(CliError::InvalidArgs("x".into()), exitcode::USAGE)]
#[case::client(InfraError::Client(ApiError::MissingToken).into(), exitcode::CONFIG)]
#[case::conflict(
    ApplicationError::Domain(DomainError::DictionaryExists { name: "d".into(), id: "1".into() }).into(),
    exitcode::SOFTWARE
)]
#[case::remote(
    ApplicationError::remote("clone version", ApiError::Http { status: 500, message: "boom".into() }).into(),
    exitcode::UNAVAILABLE
)]
#[case::malformed(
    ApplicationError::Domain(DomainError::MalformedRow { line: 3, fields: 2 }).into(),
    exitcode::DATAERR
)]
#[case::config(ApplicationError::Config { message: "bad".into() }.into(), exitcode::CONFIG)]
fn given_error_when_exit_code_then_maps_to_sysexits(#[case] err: CliError, #[case] expected: i32) {
    assert_eq!(err.exit_code(), expected);
}

#[test]
fn given_fake_api_when_execute_create_then_dictionary_is_live() {
    // Arrange
    let api = Arc::new(FakeConfigApi::new().with_version(7, true));
    let container = container(api.clone());
    let cli = CreateCli::try_parse_from(["create-edge-dict", "token", "svc", "redirects"]).unwrap();

    // Act
    execute_create(&container, &cli).unwrap();

    // Assert
    assert!(api.version(8).unwrap().active);
    assert!(api.dictionary(8, "redirects").is_some());
}

#[test]
fn given_existing_dictionary_when_execute_create_then_software_exit() {
    let api = Arc::new(
        FakeConfigApi::new()
            .with_version(1, true)
            .with_dictionary(1, "redirects"),
    );
    let container = container(api.clone());
    let cli = CreateCli::try_parse_from(["create-edge-dict", "token", "svc", "redirects"]).unwrap();

    let err = execute_create(&container, &cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    assert!(!api.operations().contains(&Operation::CloneVersion));
}

#[test]
fn given_csv_when_execute_load_then_items_stored() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("entries.csv");
    std::fs::write(&path, "/a,comment,/b\n,comment,/skip\n").unwrap();
    let api = Arc::new(
        FakeConfigApi::new()
            .with_version(1, true)
            .with_dictionary(1, "redirects"),
    );
    let container = container(api.clone());
    let cli = LoadCli::try_parse_from([
        "add-csv-to-edge-dict",
        "token",
        "svc",
        "redirects",
        path.to_str().unwrap(),
    ])
    .unwrap();

    execute_load(&container, &cli).unwrap();

    let items = api.items("dict-1");
    assert_eq!(items.len(), 1);
    assert_eq!(items.get("/a").map(String::as_str), Some("/b"));
}

#[test]
fn given_missing_file_when_execute_load_then_noinput_exit() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(
        FakeConfigApi::new()
            .with_version(1, true)
            .with_dictionary(1, "redirects"),
    );
    let container = container(api);
    let missing = temp.path().join("missing.csv");
    let cli = LoadCli::try_parse_from([
        "add-csv-to-edge-dict",
        "token",
        "svc",
        "redirects",
        missing.to_str().unwrap(),
    ])
    .unwrap();

    let err = execute_load(&container, &cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}
