//! Tests for the sink module

use super::*;
use crate::error::Error;
use crate::normalize::ResultNormalizer;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tempfile::tempdir;

fn document(value: serde_json::Value) -> NormalizedDocument {
    let serde_json::Value::Object(map) = value else {
        panic!("not an object");
    };
    ResultNormalizer::new().normalize("T", &map).unwrap()
}

fn at(h: u32, m: u32, s: u32, ms: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_milli_opt(h, m, s, ms)
        .unwrap()
}

// ============================================================================
// Output Writer Tests
// ============================================================================

#[test]
fn test_artifact_file_name() {
    assert_eq!(
        artifact_file_name("Accounts", at(9, 5, 7, 42)),
        "Accounts-2024-03-15_09-05-07-042.xml"
    );
}

#[test]
fn test_artifact_file_name_uses_24_hour_clock() {
    let morning = artifact_file_name("Accounts", at(9, 0, 0, 0));
    let evening = artifact_file_name("Accounts", at(21, 0, 0, 0));
    assert_eq!(evening, "Accounts-2024-03-15_21-00-00-000.xml");
    assert!(morning < evening);
}

#[test]
fn test_write_creates_file_with_trailing_newline() {
    let dir = tempdir().unwrap();
    let writer = OutputWriter::new(dir.path());
    let doc = document(json!({"Id": "001"}));

    let artifact = writer.write_at("Accounts", &doc, at(10, 0, 0, 0)).unwrap();

    assert_eq!(artifact.name, "Accounts");
    assert_eq!(
        artifact.path,
        dir.path().join("Accounts-2024-03-15_10-00-00-000.xml")
    );
    let content = std::fs::read_to_string(&artifact.path).unwrap();
    assert_eq!(content, "<recordsFound><Id>001</Id></recordsFound>\n");
}

#[test]
fn test_write_creates_missing_output_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("out").join("today");
    let writer = OutputWriter::new(&nested);

    let artifact = writer
        .write("Contacts", &document(json!({"Id": "003"})))
        .unwrap();

    assert!(artifact.path.starts_with(&nested));
    assert!(artifact.path.exists());
}

#[test]
fn test_write_never_overwrites() {
    let dir = tempdir().unwrap();
    let writer = OutputWriter::new(dir.path());
    let stamp = at(10, 0, 0, 999);

    let first = writer
        .write_at("Accounts", &document(json!({"Id": "1"})), stamp)
        .unwrap();
    let second = writer
        .write_at("Accounts", &document(json!({"Id": "2"})), stamp)
        .unwrap();

    assert_ne!(first.path, second.path);
    assert_eq!(second.created_at, at(10, 0, 1, 0));
    assert!(std::fs::read_to_string(&first.path)
        .unwrap()
        .contains("<Id>1</Id>"));
    assert!(std::fs::read_to_string(&second.path)
        .unwrap()
        .contains("<Id>2</Id>"));
}

#[test]
fn test_write_failure_is_sink_write_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    let writer = OutputWriter::new(&blocker);

    let err = writer
        .write("Accounts", &document(json!({"Id": "1"})))
        .unwrap_err();
    assert!(matches!(err, Error::SinkWrite { .. }));
    assert!(err.is_fatal());
}

// ============================================================================
// Procedure Tests
// ============================================================================

#[test]
fn test_exec_statement() {
    let params = [
        ProcedureParam::new("Type", "Accounts"),
        ProcedureParam::new("xml_text", "<recordsFound/>"),
    ];
    assert_eq!(
        exec_statement("xmlParse", &params),
        "EXEC xmlParse @Type = @P1, @xml_text = @P2"
    );
    assert_eq!(exec_statement("dbo.ping", &[]), "EXEC dbo.ping");
}

#[tokio::test]
async fn test_duckdb_sink_journals_calls_in_order() {
    let dir = tempdir().unwrap();
    let sink = DuckDbSink::new(dir.path().join("journal.duckdb"));

    sink.call("xmlParse", &[ProcedureParam::new("Type", "Accounts")])
        .await
        .unwrap();
    sink.call(
        "sqlEmail",
        &[
            ProcedureParam::new("recepients", "ops@example.com"),
            ProcedureParam::new("subject", "hello"),
        ],
    )
    .await
    .unwrap();

    let calls = sink.calls().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].procedure, "xmlParse");
    assert_eq!(calls[0].param("Type"), Some("Accounts"));
    assert_eq!(calls[1].procedure, "sqlEmail");
    assert_eq!(calls[1].param("recepients"), Some("ops@example.com"));
    assert_eq!(calls[1].param("missing"), None);
}

#[tokio::test]
async fn test_duckdb_sink_unopenable_path_is_forward_error() {
    let dir = tempdir().unwrap();
    let sink = DuckDbSink::new(dir.path().join("missing").join("journal.duckdb"));

    let err = sink.call("xmlParse", &[]).await.unwrap_err();
    assert!(matches!(err, Error::SinkForward { ref procedure, .. } if procedure == "xmlParse"));
}

#[test]
fn test_duckdb_sink_undecodable_row_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.duckdb");
    {
        let conn = duckdb::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE procedure_calls (procedure_name VARCHAR, parameters INTEGER);
             INSERT INTO procedure_calls VALUES ('sqlEmail', 1);",
        )
        .unwrap();
    }

    let err = DuckDbSink::new(&path).calls().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("journal row"));
}

#[tokio::test]
async fn test_sqlserver_sink_unreachable_host_fails() {
    let sink = SqlServerSink::new(
        "server=tcp:127.0.0.1,1;database=extract;user id=sa;password=x;TrustServerCertificate=true",
        Duration::from_secs(2),
    );

    let err = sink.call("xmlParse", &[]).await.unwrap_err();
    assert!(matches!(err, Error::SinkForward { .. }));
    assert_eq!(err.exit_code(), 9);
}

// ============================================================================
// Sink Tests
// ============================================================================

#[tokio::test]
async fn test_sink_write_then_forward() {
    let dir = tempdir().unwrap();
    let journal = DuckDbSink::new(dir.path().join("journal.duckdb"));
    let sink = Sink::new(
        OutputWriter::new(dir.path().join("out")),
        Arc::new(journal.clone()),
        "xmlParse",
    );
    let doc = document(json!({"records": [{"Id": "001", "Name": "Acme"}]}));

    let artifact = sink.write("Accounts", &doc).unwrap();
    sink.forward("Accounts", &doc).await.unwrap();

    let file_name = artifact.path.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("Accounts-"));
    assert!(file_name.ends_with(".xml"));

    let calls = journal.calls().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].procedure, "xmlParse");
    assert_eq!(calls[0].param("Type"), Some("Accounts"));
    assert_eq!(calls[0].param("xml_text"), Some(doc.inner_xml()));
}
