//! Application settings
//!
//! The settings document is JSON (default `app-settings.json`) or YAML, with
//! every section nested under a top-level `Configuration` key. Field names are
//! PascalCase to stay compatible with existing deployments.
//!
//! Settings are loaded once, validated, and then shared read-only by every
//! pipeline component.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "app-settings.json";

// ============================================================================
// Document root
// ============================================================================

#[derive(Debug, Deserialize)]
struct SettingsDocument {
    #[serde(rename = "Configuration")]
    configuration: AppSettings,
}

/// Complete application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSettings {
    /// Free-form title for the deployment
    #[serde(default)]
    pub title: Option<String>,

    /// Salesforce credentials and endpoints
    #[serde(rename = "SalesForce")]
    pub salesforce: SalesforceSettings,

    /// Query file, output and log locations
    pub file_locations: FileLocations,

    /// SQL Server connection strings
    pub connection_strings: ConnectionStrings,

    /// Email settings
    #[serde(default)]
    pub email_settings: EmailSettings,

    /// Stored procedure names and sink options
    #[serde(rename = "SqlStoredProcedures")]
    pub stored_procedures: StoredProcedures,
}

// ============================================================================
// Sections
// ============================================================================

/// Salesforce connected-app credentials and endpoints
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesforceSettings {
    pub client_id: String,
    pub client_secret: String,
    pub user_name: String,
    pub user_security_token: String,
    /// Encrypted with the security token (see `salesforce-extract encrypt-password`)
    pub user_password: String,
    #[serde(rename = "SalesForceLoginEndPoint")]
    pub login_endpoint: String,
    /// Prefix for SOQL queries, e.g. `/services/data/v52.0/query?q=`
    #[serde(rename = "QueryEndPoint")]
    pub query_endpoint: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl SalesforceSettings {
    /// Timeout applied to every HTTP call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl std::fmt::Debug for SalesforceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceSettings")
            .field("client_id", &self.client_id)
            .field("user_name", &self.user_name)
            .field("login_endpoint", &self.login_endpoint)
            .field("query_endpoint", &self.query_endpoint)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish_non_exhaustive()
    }
}

fn default_request_timeout() -> u64 {
    120
}

/// File system locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileLocations {
    pub query_file: PathBuf,
    pub output_directory: PathBuf,
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    /// Paths containing any of these markers are never archived
    #[serde(default = "default_archive_exclusions")]
    pub archive_exclusions: Vec<String>,
}

fn default_archive_exclusions() -> Vec<String> {
    vec!["node_modules".to_string()]
}

/// Connection strings for the relational sink
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectionStrings {
    pub connection_prod: String,
    pub connection_test: String,
}

impl ConnectionStrings {
    /// Connection string for the given environment
    pub fn for_environment(&self, environment: Environment) -> &str {
        match environment {
            Environment::Production => &self.connection_prod,
            Environment::Test => &self.connection_test,
        }
    }
}

impl std::fmt::Debug for ConnectionStrings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectionStrings { .. }")
    }
}

/// Email settings.
///
/// Notifications go through the `sqlEmail` stored procedure; only `ToAddress`
/// is used (as the recipient list). The SMTP fields are accepted for
/// compatibility with existing settings files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailSettings {
    #[serde(rename = "SMTPClient", default)]
    pub smtp_client: Option<String>,
    #[serde(rename = "SMTPClientPort", default)]
    pub smtp_client_port: Option<u16>,
    #[serde(rename = "FromAddress", default)]
    pub from_address: Option<String>,
    #[serde(rename = "ToAddress", default)]
    pub to_address: String,
}

/// Which backend executes stored procedures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SinkBackend {
    /// Microsoft SQL Server (the connection string is an ADO string)
    #[default]
    SqlServer,
    /// Local DuckDB journal (the connection string is a database file path)
    DuckDb,
}

/// Stored procedure names and sink options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProcedures {
    #[serde(rename = "sqlEmail")]
    pub sql_email: String,
    #[serde(rename = "xmlParse")]
    pub xml_parse: String,
    #[serde(rename = "CommandTimeoutSeconds", default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
    #[serde(rename = "Backend", default)]
    pub backend: SinkBackend,
}

impl StoredProcedures {
    /// Timeout applied to every stored procedure call
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

fn default_command_timeout() -> u64 {
    10
}

/// Deployment environment, selects the connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    /// `ConnectionProd`
    Production,
    /// `ConnectionTest`
    Test,
}

impl Default for Environment {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Environment::Test
        } else {
            Environment::Production
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AppSettings {
    /// Load and validate settings from a JSON or YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read settings file '{}': {e}",
                path.display()
            ))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse and validate settings from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: SettingsDocument = serde_json::from_str(content)?;
        document.configuration.validate()?;
        Ok(document.configuration)
    }

    /// Parse and validate settings from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: SettingsDocument = serde_yaml::from_str(content)?;
        document.configuration.validate()?;
        Ok(document.configuration)
    }

    /// Check required fields and value formats
    pub fn validate(&self) -> Result<()> {
        let sf = &self.salesforce;
        require("SalesForce.ClientId", &sf.client_id)?;
        require("SalesForce.ClientSecret", &sf.client_secret)?;
        require("SalesForce.UserName", &sf.user_name)?;
        require("SalesForce.UserSecurityToken", &sf.user_security_token)?;
        require("SalesForce.UserPassword", &sf.user_password)?;
        require("SalesForce.SalesForceLoginEndPoint", &sf.login_endpoint)?;
        require("SalesForce.QueryEndPoint", &sf.query_endpoint)?;

        url::Url::parse(&sf.login_endpoint).map_err(|e| {
            Error::config(format!(
                "SalesForce.SalesForceLoginEndPoint is not a valid URL: {e}"
            ))
        })?;

        if sf.request_timeout_seconds == 0 {
            return Err(Error::config(
                "SalesForce.RequestTimeoutSeconds must be greater than zero",
            ));
        }

        let files = &self.file_locations;
        require(
            "FileLocations.QueryFile",
            &files.query_file.to_string_lossy(),
        )?;
        require(
            "FileLocations.OutputDirectory",
            &files.output_directory.to_string_lossy(),
        )?;

        require("EmailSettings.ToAddress", &self.email_settings.to_address)?;

        let procs = &self.stored_procedures;
        validate_procedure_name("SqlStoredProcedures.sqlEmail", &procs.sql_email)?;
        validate_procedure_name("SqlStoredProcedures.xmlParse", &procs.xml_parse)?;
        if procs.command_timeout_seconds == 0 {
            return Err(Error::config(
                "SqlStoredProcedures.CommandTimeoutSeconds must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::missing_field(field))
    } else {
        Ok(())
    }
}

/// Procedure names are interpolated into `EXEC`, so only plain
/// (optionally schema-qualified, optionally bracketed) identifiers are allowed.
fn validate_procedure_name(field: &str, name: &str) -> Result<()> {
    require(field, name)?;
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    if valid {
        Ok(())
    } else {
        Err(Error::config(format!(
            "{field} is not a valid procedure name: '{name}'"
        )))
    }
}
