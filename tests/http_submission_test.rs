use httpmock::prelude::*;
use parts_transfer::domain::ports::ConfigProvider;
use parts_transfer::{
    Console, EntrySource, HttpSink, LifecycleState, LocalStorage, ManualClock, TomlConfig,
    TransferError, TransferSession,
};
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

fn config_for(server: &MockServer, path: &str, timeout_seconds: u64) -> TomlConfig {
    let mut file = NamedTempFile::new().unwrap();
    let content = format!(
        r#"
[sink]
endpoint = "{}"
timeout_seconds = {}

[scanner]
cooldown_seconds = 1.5

[workflow]
confirmation = "two_step"
"#,
        server.url(path),
        timeout_seconds
    );
    file.write_all(content.as_bytes()).unwrap();
    TomlConfig::from_file(file.path()).unwrap()
}

fn sink_for(config: &TomlConfig) -> HttpSink {
    HttpSink::new(config.require_endpoint().unwrap(), config.sink_timeout()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_transfer_posts_payload() {
    let server = MockServer::start();
    let webhook = server.mock(|when, then| {
        when.method(POST)
            .path("/macros/exec")
            .header("content-type", "application/json")
            .json_body_partial(
                r#"{
                    "fromLocation": "Main Warehouse",
                    "toLocation": "OTT19001",
                    "parts": [
                        {"barcode": "ABC123", "quantity": 2},
                        {"barcode": "Z9", "quantity": 1}
                    ],
                    "totalParts": 3,
                    "partTypes": 2
                }"#,
            );
        then.status(200).body("OK");
    });

    let config = config_for(&server, "/macros/exec", 10);
    let mut session = TransferSession::from_config(&config, sink_for(&config), ManualClock::default());

    session.set_from_location("Main Warehouse").unwrap();
    session.set_to_location("OTT19001").unwrap();
    session.ingest("abc123", EntrySource::Manual).unwrap();
    session.ingest("Z9", EntrySource::Scanner).unwrap();
    session.ingest("ABC123 ", EntrySource::Scanner).unwrap();
    session.review().unwrap();

    let transfer = session.confirm().await.unwrap();
    assert!(transfer.id.starts_with("TXN-"));

    webhook.assert();
    assert_eq!(session.state(), LifecycleState::Submitted);
    assert!(session.ledger().is_empty());
}

#[tokio::test]
async fn test_server_error_keeps_transfer_reviewable() {
    let server = MockServer::start();
    let webhook = server.mock(|when, then| {
        when.method(POST).path("/exec");
        then.status(503);
    });

    let config = config_for(&server, "/exec", 10);
    let mut session = TransferSession::from_config(&config, sink_for(&config), ManualClock::default());
    session.set_from_location("A1 Dock").unwrap();
    session.set_to_location("B2 Shelf").unwrap();
    session.ingest("X1", EntrySource::Manual).unwrap();
    session.review().unwrap();

    let result = session.confirm().await.map(|_| ());

    webhook.assert();
    assert!(matches!(result, Err(TransferError::SubmissionFailed { .. })));
    assert_eq!(session.state(), LifecycleState::Reviewing);
    assert_eq!(session.ledger().total_items(), 1);
}

#[tokio::test]
async fn test_timeout_is_a_recoverable_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/slow");
        then.status(200).delay(Duration::from_secs(3));
    });

    let config = config_for(&server, "/slow", 1);
    let mut session = TransferSession::from_config(&config, sink_for(&config), ManualClock::default());
    session.set_from_location("A").unwrap();
    session.set_to_location("B").unwrap();
    session.ingest("X1", EntrySource::Manual).unwrap();
    session.review().unwrap();

    let err = session.confirm().await.map(|_| ()).unwrap_err();
    assert!(matches!(err, TransferError::SubmissionFailed { .. }));
    assert!(err.is_recoverable());
    assert_eq!(session.state(), LifecycleState::Reviewing);

    session.cancel().unwrap();
    assert_eq!(session.state(), LifecycleState::Drafting);
    assert_eq!(session.ledger().total_items(), 1);
}

#[tokio::test]
async fn test_console_retry_after_failure() {
    let server = MockServer::start();
    let mut failing = server.mock(|when, then| {
        when.method(POST).path("/exec");
        then.status(500);
    });

    let config = config_for(&server, "/exec", 10);
    let session = TransferSession::from_config(&config, sink_for(&config), ManualClock::default());
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let mut console = Console::new(session, storage, Vec::new());

    for line in ["from Main Warehouse", "to OTT19001", "mode scan", "Z9", "review", "confirm"] {
        console.handle_line(line).await.unwrap();
    }
    failing.assert();
    assert_eq!(console.session().state(), LifecycleState::Reviewing);

    failing.delete();
    let ok = server.mock(|when, then| {
        when.method(POST).path("/exec");
        then.status(200);
    });

    console.handle_line("confirm").await.unwrap();
    console.handle_line("export").await.unwrap();
    ok.assert();

    let text = String::from_utf8(console.output().clone()).unwrap();
    assert!(text.contains("❌ Transfer failed - please try again"));
    assert!(text.contains("✅ TRANSFER COMPLETED SUCCESSFULLY!"));

    let id = console.session().receipt().unwrap().id.clone();
    assert!(temp_dir.path().join(format!("transfer_{}.txt", id)).exists());
}
