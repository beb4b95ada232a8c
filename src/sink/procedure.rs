//! Stored procedure abstraction
//!
//! The pipeline only ever calls two procedures (`xmlParse` and `sqlEmail`),
//! by name, with named string parameters.

use crate::error::Result;
use async_trait::async_trait;

/// A named string parameter (`@name = value`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureParam {
    /// Parameter name without the `@` prefix
    pub name: String,
    /// Parameter value
    pub value: String,
}

impl ProcedureParam {
    /// Create a parameter
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Executes stored procedures against the relational sink.
///
/// Every call opens and releases its own connection.
#[async_trait]
pub trait ProcedureSink: Send + Sync {
    /// Execute `procedure` with `params`.
    ///
    /// Fails with [`crate::Error::SinkForward`].
    async fn call(&self, procedure: &str, params: &[ProcedureParam]) -> Result<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
