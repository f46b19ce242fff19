//! Tests for DictionaryBulkLoader
//!
//! Rows are uploaded one by one; empty keys/values and rejected uploads are
//! reported and skipped, a malformed record stops the run.

use std::path::PathBuf;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use edgedict::application::services::DictionaryBulkLoader;
use edgedict::application::ApplicationError;
use edgedict::domain::{DomainError, LoadSummary, RowOutcome, SkipReason};
use edgedict::infrastructure::traits::RealFileSystem;
use edgedict::util::testing::{init_test_setup, ApiCall, FakeConfigApi, Operation};

/// Fake with version 1 holding dictionary "redirects" (id dict-1).
fn fake() -> FakeConfigApi {
    FakeConfigApi::new()
        .with_version(1, true)
        .with_dictionary(1, "redirects")
}

fn setup(api: FakeConfigApi) -> (Arc<FakeConfigApi>, DictionaryBulkLoader) {
    init_test_setup();
    let api = Arc::new(api);
    let loader = DictionaryBulkLoader::new(api.clone(), Arc::new(RealFileSystem));
    (api, loader)
}

/// Helper to create a temp CSV file for testing
fn create_csv(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("entries.csv");
    std::fs::write(&path, content).expect("write csv file");
    path
}

fn item_calls(api: &FakeConfigApi) -> Vec<(String, String)> {
    api.calls()
        .into_iter()
        .filter_map(|c| match c {
            ApiCall::CreateDictionaryItem { key, value, .. } => Some((key, value)),
            _ => None,
        })
        .collect()
}

#[test]
fn given_row_with_ignored_column_when_loading_then_uploads_first_and_third() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, "\"k1\",\"ignored\",\"v1\"\n");
    let (api, loader) = setup(fake());
    let mut outcomes = Vec::new();

    // Act
    let summary = loader
        .load_file("svc", "redirects", &csv, |o| outcomes.push(o.clone()))
        .unwrap();

    // Assert
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::CreateDictionaryItem {
            service_id: "svc".into(),
            dictionary_id: "dict-1".into(),
            key: "k1".into(),
            value: "v1".into(),
        })
    );
    assert_eq!(item_calls(&api).len(), 1);
    assert_eq!(
        outcomes,
        vec![RowOutcome::Added {
            key: "k1".into(),
            value: "v1".into()
        }]
    );
    assert_eq!(summary.added, 1);
}

#[rstest]
#[case::empty_key(",x,y\n", SkipReason::EmptyKey)]
#[case::quoted_empty_key("\"\",x,y\n", SkipReason::EmptyKey)]
#[case::empty_value("x,y,\n", SkipReason::EmptyValue)]
#[case::quoted_empty_value("x,y,\"\"\n", SkipReason::EmptyValue)]
fn given_incomplete_row_when_loading_then_skips_without_upload(
    #[case] content: &str,
    #[case] expected: SkipReason,
) {
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, content);
    let (api, loader) = setup(fake());
    let mut outcomes = Vec::new();

    let summary = loader
        .load_file("svc", "redirects", &csv, |o| outcomes.push(o.clone()))
        .unwrap();

    assert!(item_calls(&api).is_empty());
    assert_eq!(
        outcomes,
        vec![RowOutcome::Skipped {
            line: 1,
            reason: expected
        }]
    );
    assert_eq!(summary.skipped, 1);
}

#[test]
fn given_duplicate_key_when_loading_then_reports_and_continues() {
    // Arrange: "a" already exists in the dictionary
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, "a,_,1\nb,_,2\na,_,3\nc,_,4\n");
    let (api, loader) = setup(fake().with_item("dict-1", "a", "old"));
    let mut outcomes = Vec::new();

    // Act
    let summary = loader
        .load_file("svc", "redirects", &csv, |o| outcomes.push(o.clone()))
        .unwrap();

    // Assert
    assert_eq!(item_calls(&api).len(), 4);
    assert!(matches!(outcomes[0], RowOutcome::Rejected { ref key, .. } if key == "a"));
    assert!(matches!(outcomes[2], RowOutcome::Rejected { ref key, .. } if key == "a"));
    assert_eq!(summary.added, 2);
    assert_eq!(summary.failed, 2);
    let items = api.items("dict-1");
    assert_eq!(items.get("a").map(String::as_str), Some("old"));
    assert_eq!(items.get("b").map(String::as_str), Some("2"));
    assert_eq!(items.get("c").map(String::as_str), Some("4"));
}

#[test]
fn given_malformed_second_row_when_loading_then_processes_first_and_halts() {
    // Arrange: row 2 has a different field count
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, "k1,_,v1\nbroken,row\nk3,_,v3\nk4,_,v4\n");
    let (api, loader) = setup(fake());
    let mut outcomes = Vec::new();

    // Act
    let err = loader
        .load_file("svc", "redirects", &csv, |o| outcomes.push(o.clone()))
        .unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Parse { line: Some(2), .. }), "{err:?}");
    assert_eq!(item_calls(&api), vec![("k1".to_string(), "v1".to_string())]);
    assert_eq!(outcomes.len(), 1);
}

#[test]
fn given_missing_dictionary_when_loading_then_aborts_before_reading_file() {
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, "k1,_,v1\n");
    let (api, loader) = setup(FakeConfigApi::new().with_version(1, true));

    let err = loader
        .load_file("svc", "redirects", &csv, |_| {})
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DictionaryNotFound { .. })
    ));
    assert_eq!(
        err.to_string(),
        "Edge Dictionary called redirects does not exist on this service"
    );
    assert_eq!(
        api.operations(),
        vec![Operation::LatestVersion, Operation::GetDictionary]
    );
}

#[test]
fn given_dictionary_when_loading_then_never_clones_version() {
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, "k1,_,v1\nk2,_,v2\n");
    let (api, loader) = setup(fake());

    loader.load_file("svc", "redirects", &csv, |_| {}).unwrap();

    assert!(!api.operations().contains(&Operation::CloneVersion));
    assert!(!api.operations().contains(&Operation::ActivateVersion));
}

#[test]
fn given_missing_file_when_loading_then_input_error() {
    let temp = TempDir::new().unwrap();
    let (_api, loader) = setup(fake());

    let err = loader
        .load_file("svc", "redirects", &temp.path().join("nope.csv"), |_| {})
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Input { .. }));
}

#[test]
fn given_empty_file_when_loading_then_empty_summary() {
    let temp = TempDir::new().unwrap();
    let csv = create_csv(&temp, "");
    let (api, loader) = setup(fake());

    let summary = loader.load_file("svc", "redirects", &csv, |_| {}).unwrap();

    assert_eq!(summary, LoadSummary::default());
    assert!(item_calls(&api).is_empty());
}

#[test]
fn given_reader_when_load_rows_then_streams_in_file_order() {
    let (api, loader) = setup(fake());
    let dictionary = api.dictionary(1, "redirects").unwrap();
    let input = "/a,x,/b\n,x,/skip\n/c,x,/d\n";

    let summary = loader
        .load_rows("svc", &dictionary, input.as_bytes(), |_| {})
        .unwrap();

    assert_eq!(
        item_calls(&api),
        vec![
            ("/a".to_string(), "/b".to_string()),
            ("/c".to_string(), "/d".to_string()),
        ]
    );
    assert_eq!(summary.to_string(), "2 added, 1 skipped, 0 failed");
}

#[test]
fn given_directory_as_file_when_loading_then_input_error() {
    let temp = TempDir::new().unwrap();
    let (api, loader) = setup(fake());

    let err = loader
        .load_file("svc", "redirects", temp.path(), |_| {})
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Input { .. }));
    assert!(item_calls(&api).is_empty());
}

#[cfg(unix)]
#[test]
fn given_named_pipe_when_loading_then_reads_streamed_rows() {
    use std::io::Write;
    use std::process::Command;

    // Arrange
    let temp = TempDir::new().unwrap();
    let pipe = temp.path().join("pipe.csv");
    let status = Command::new("mkfifo").arg(&pipe).status().unwrap();
    assert!(status.success());
    let writer_path = pipe.clone();
    let writer = std::thread::spawn(move || {
        let mut fifo = std::fs::OpenOptions::new()
            .write(true)
            .open(writer_path)
            .unwrap();
        fifo.write_all(b"k1,_,v1\n").unwrap();
    });
    let (api, loader) = setup(fake());

    // Act
    let summary = loader.load_file("svc", "redirects", &pipe, |_| {}).unwrap();
    writer.join().unwrap();

    // Assert
    assert_eq!(summary.added, 1);
    assert_eq!(item_calls(&api), vec![("k1".to_string(), "v1".to_string())]);
}
