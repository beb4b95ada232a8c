//! SQL Server procedure sink
//!
//! Uses `tiberius` over a `tokio` TCP stream. The connection string is an
//! ADO.NET style string (`server=tcp:host,1433;database=…;user id=…;password=…`).

use super::procedure::{ProcedureParam, ProcedureSink};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tiberius::{Client, Config, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

/// Executes stored procedures on SQL Server
pub struct SqlServerSink {
    connection_string: String,
    command_timeout: Duration,
}

impl SqlServerSink {
    /// Create a sink. `command_timeout` bounds connect plus execution.
    pub fn new(connection_string: impl Into<String>, command_timeout: Duration) -> Self {
        Self {
            connection_string: connection_string.into(),
            command_timeout,
        }
    }

    async fn execute(&self, procedure: &str, params: &[ProcedureParam]) -> Result<()> {
        let fail = |e: &dyn std::fmt::Display| Error::sink_forward(procedure, e.to_string());

        let config = Config::from_ado_string(&self.connection_string).map_err(|e| fail(&e))?;
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| fail(&e))?;
        tcp.set_nodelay(true).map_err(|e| fail(&e))?;

        let mut client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| fail(&e))?;

        let statement = exec_statement(procedure, params);
        let values: Vec<&dyn ToSql> = params.iter().map(|p| &p.value as &dyn ToSql).collect();

        debug!("Executing {} with {} parameter(s)", procedure, params.len());
        client
            .execute(statement, &values)
            .await
            .map_err(|e| fail(&e))?;
        client.close().await.map_err(|e| fail(&e))?;
        Ok(())
    }
}

#[async_trait]
impl ProcedureSink for SqlServerSink {
    async fn call(&self, procedure: &str, params: &[ProcedureParam]) -> Result<()> {
        match tokio::time::timeout(self.command_timeout, self.execute(procedure, params)).await {
            Ok(result) => result,
            Err(_) => Err(Error::sink_forward(
                procedure,
                format!("timed out after {}s", self.command_timeout.as_secs()),
            )),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sqlserver"
    }
}

impl std::fmt::Debug for SqlServerSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerSink")
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

/// `EXEC` statement binding each named parameter to a positional one:
/// `EXEC xmlParse @Type = @P1, @xml_text = @P2`
pub fn exec_statement(procedure: &str, params: &[ProcedureParam]) -> String {
    let bindings: Vec<String> = params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("@{} = @P{}", p.name, i + 1))
        .collect();

    if bindings.is_empty() {
        format!("EXEC {procedure}")
    } else {
        format!("EXEC {procedure} {}", bindings.join(", "))
    }
}
