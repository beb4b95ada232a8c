//! DuckDB procedure journal
//!
//! A local stand-in for SQL Server: every procedure call is appended to a
//! `procedure_calls` table in a DuckDB database file. Used for dry runs and
//! tests.

use super::procedure::{ProcedureParam, ProcedureSink};
use crate::error::{Error, Result};
use async_trait::async_trait;
use duckdb::Connection;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS procedure_calls (
    procedure_name VARCHAR NOT NULL,
    parameters VARCHAR NOT NULL,
    called_at TIMESTAMP DEFAULT current_timestamp
)";

/// One journaled call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Procedure name
    pub procedure: String,
    /// Parameters by name
    pub parameters: Map<String, Value>,
}

impl RecordedCall {
    /// Value of a parameter, if present and a string
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(Value::as_str)
    }
}

/// Journals procedure calls into DuckDB
#[derive(Debug, Clone)]
pub struct DuckDbSink {
    path: PathBuf,
}

impl DuckDbSink {
    /// Journal stored in the database file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> std::result::Result<Connection, duckdb::Error> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(conn)
    }

    /// All recorded calls in call order
    pub fn calls(&self) -> Result<Vec<RecordedCall>> {
        let conn = self
            .open()
            .map_err(|e| Error::config(format!("Failed to open journal: {e}")))?;

        let mut stmt = conn
            .prepare("SELECT procedure_name, parameters FROM procedure_calls ORDER BY rowid")
            .map_err(|e| Error::config(format!("Failed to prepare query: {e}")))?;

        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| Error::config(format!("Failed to read journal: {e}")))?
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::config(format!("Failed to read journal row: {e}")))?;

        rows.into_iter()
            .map(|(procedure, parameters)| {
                Ok(RecordedCall {
                    procedure,
                    parameters: serde_json::from_str(&parameters)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProcedureSink for DuckDbSink {
    async fn call(&self, procedure: &str, params: &[ProcedureParam]) -> Result<()> {
        let parameters: Map<String, Value> = params
            .iter()
            .map(|p| (p.name.clone(), Value::String(p.value.clone())))
            .collect();
        let parameters = Value::Object(parameters).to_string();

        let conn = self
            .open()
            .map_err(|e| Error::sink_forward(procedure, e.to_string()))?;
        conn.execute(
            "INSERT INTO procedure_calls (procedure_name, parameters) VALUES (?, ?)",
            duckdb::params![procedure, parameters],
        )
        .map_err(|e| Error::sink_forward(procedure, e.to_string()))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "duckdb"
    }
}
