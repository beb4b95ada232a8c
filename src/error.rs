//! Error types for the Salesforce extractor
//!
//! This module defines the error hierarchy for the whole pipeline.
//! Every error is either per-query (the run skips that query and carries on)
//! or run-fatal (the run is escalated and the process exits non-zero).

use thiserror::Error;

/// The main error type for the extractor
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Password decryption failed: {message}")]
    Cipher { message: String },

    // ============================================================================
    // Salesforce Errors
    // ============================================================================
    #[error("Authentication failed (status {}): {body}", status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
    Authentication { status: Option<u16>, body: String },

    #[error("Network failure while querying '{query}': {source}")]
    Network {
        query: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Query '{query}' returned error {code}: {message}")]
    QueryExecution {
        query: String,
        code: String,
        message: String,
    },

    #[error("Malformed response for '{query}': {message}")]
    MalformedResponse {
        query: String,
        message: String,
        body: String,
    },

    // ============================================================================
    // Query File Errors
    // ============================================================================
    #[error("Failed to read query file '{path}': {message}")]
    QueryFile { path: String, message: String },

    #[error("Invalid query file line {line_number}: '{line}'")]
    InvalidQueryLine { line_number: usize, line: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Failed to convert response to XML: {message}")]
    Normalize { message: String },

    #[error("Failed to write results file '{path}': {source}")]
    SinkWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored procedure '{procedure}' failed: {message}")]
    SinkForward { procedure: String, message: String },

    #[error("Archive rotation failed: {message}")]
    Archive { message: String },

    #[error("Notification failed: {message}")]
    Notification { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a cipher error
    pub fn cipher(message: impl Into<String>) -> Self {
        Self::Cipher {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Authentication {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(
        query: impl Into<String>,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::MalformedResponse {
            query: query.into(),
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create a normalization error
    pub fn normalize(message: impl Into<String>) -> Self {
        Self::Normalize {
            message: message.into(),
        }
    }

    /// Create a sink forward error
    pub fn sink_forward(procedure: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkForward {
            procedure: procedure.into(),
            message: message.into(),
        }
    }

    /// Create an archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Create a notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run.
    ///
    /// Per-query errors are reported and the query loop moves on to the next line.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::QueryExecution { .. }
                | Error::MalformedResponse { .. }
                | Error::InvalidQueryLine { .. }
                | Error::Normalize { .. }
        )
    }

    /// Process exit code for a run that ended with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::Cipher { .. } => 3,
            Error::Archive { .. } => 4,
            Error::Authentication { .. } => 5,
            Error::Network { .. } => 6,
            Error::QueryFile { .. } => 7,
            Error::SinkWrite { .. } => 8,
            Error::SinkForward { .. } => 9,
            Error::QueryExecution { .. }
            | Error::MalformedResponse { .. }
            | Error::InvalidQueryLine { .. }
            | Error::Normalize { .. } => 2,
            Error::Notification { .. } | Error::Io(_) | Error::Other(_) => 1,
        }
    }

    /// Subject line used when this error is emailed to operators
    pub fn subject(&self) -> &'static str {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => "Error loading configuration",
            Error::Cipher { .. } => "Error decrypting Salesforce password",
            Error::Authentication { .. } => {
                "Error found while connecting to Salesforce with Salesforce Extract"
            }
            Error::Network { .. } => "Querying Salesforce failed",
            Error::QueryExecution { .. } => "Error when running Salesforce query",
            Error::MalformedResponse { .. } => "JSON parse failed",
            Error::QueryFile { .. } => "Reading query file failed",
            Error::InvalidQueryLine { .. } => "Invalid line in query file",
            Error::Normalize { .. } => "Converting JSON response to XML failed",
            Error::SinkWrite { .. } => "Failed to write query results file",
            Error::SinkForward { .. } => "Unable to run SQL stored procedure",
            Error::Archive { .. } => "Archiving previous results failed",
            Error::Notification { .. } => "Unable to send notification",
            Error::Io(_) | Error::Other(_) => "Salesforce Extract failed",
        }
    }
}

/// Result type alias for the extractor
pub type Result<T> = std::result::Result<T, Error>;
