//! Auth types
//!
//! Credentials for the OAuth password grant and the session it yields.

use crate::cipher;
use crate::config::SalesforceSettings;
use crate::error::Result;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Credentials for the OAuth 2.0 username-password flow
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Connected app consumer key
    pub client_id: String,
    /// Connected app consumer secret
    pub client_secret: SecretString,
    /// Salesforce user name
    pub username: String,
    /// Plaintext password (without the security token)
    pub password: SecretString,
    /// User security token, appended to the password on login
    pub security_token: SecretString,
    /// OAuth token endpoint
    pub login_endpoint: String,
}

impl Credentials {
    /// Build credentials from settings, decrypting the stored password
    /// with the security token.
    pub fn from_settings(settings: &SalesforceSettings) -> Result<Self> {
        let password = cipher::decrypt(&settings.user_password, &settings.user_security_token)?;
        Ok(Self {
            client_id: settings.client_id.clone(),
            client_secret: SecretString::from(settings.client_secret.clone()),
            username: settings.user_name.clone(),
            password: SecretString::from(password),
            security_token: SecretString::from(settings.user_security_token.clone()),
            login_endpoint: settings.login_endpoint.clone(),
        })
    }

    /// Password as sent to Salesforce: password followed by the security token
    pub(crate) fn login_password(&self) -> SecretString {
        SecretString::from(format!(
            "{}{}",
            self.password.expose_secret(),
            self.security_token.expose_secret()
        ))
    }
}

/// An authenticated Salesforce session, valid for one run
#[derive(Debug, Clone)]
pub struct Session {
    /// OAuth access token
    pub access_token: SecretString,
    /// Instance URL all API requests are made against
    pub service_base_url: String,
}

impl Session {
    /// Create a session
    pub fn new(access_token: impl Into<String>, service_base_url: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            service_base_url: service_base_url.into(),
        }
    }

    /// The bearer token
    pub fn token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Token endpoint response body
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub instance_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("00Dxx!secret-token", "https://na1.salesforce.com");
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("na1.salesforce.com"));
        assert_eq!(session.token(), "00Dxx!secret-token");
    }

    #[test]
    fn test_token_response_error_only() {
        let body = r#"{"error":"invalid_grant","error_description":"authentication failure"}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("invalid_grant"));
        assert!(parsed.access_token.is_none());
    }
}
