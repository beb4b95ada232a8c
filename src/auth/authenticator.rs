//! Authenticator implementation
//!
//! Performs the OAuth 2.0 username-password flow against the Salesforce
//! token endpoint.

use super::types::{Credentials, Session, TokenResponse};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use secrecy::ExposeSecret;
use tracing::{debug, info};

/// Authenticator obtains a [`Session`] from the login endpoint
pub struct Authenticator {
    credentials: Credentials,
    http_client: HttpClient,
}

impl Authenticator {
    /// Create an authenticator with a custom HTTP client
    pub fn with_client(credentials: Credentials, http_client: HttpClient) -> Self {
        Self {
            credentials,
            http_client,
        }
    }

    /// Exchange the credentials for an access token.
    ///
    /// Any non-200 status, an `error` field in the body, a network fault or
    /// an unparseable body fails with [`Error::Authentication`]. No retry.
    pub async fn authenticate(&self) -> Result<Session> {
        let creds = &self.credentials;
        let client_secret = creds.client_secret.expose_secret();
        let password = creds.login_password();

        let form = [
            ("grant_type", "password"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", client_secret),
            ("username", creds.username.as_str()),
            ("password", password.expose_secret()),
        ];

        debug!("Requesting access token for {}", creds.username);
        let response = self
            .http_client
            .post_form(&creds.login_endpoint, &form)
            .await
            .map_err(|e| Error::auth(e.status().map(|s| s.as_u16()), e.to_string()))?;

        if !response.is_ok() {
            return Err(Error::auth(Some(response.status), response.body));
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::auth(Some(response.status), format!("{e}: {}", response.body)))?;

        if let Some(error) = token.error.filter(|e| !e.is_empty()) {
            let description = token.error_description.unwrap_or_default();
            return Err(Error::auth(
                Some(response.status),
                format!("{error}: {description}"),
            ));
        }

        match (token.access_token, token.instance_url) {
            (Some(access_token), Some(instance_url))
                if !access_token.is_empty() && !instance_url.is_empty() =>
            {
                info!("Connected to Salesforce at {}", instance_url);
                Ok(Session::new(access_token, instance_url))
            }
            _ => Err(Error::auth(
                Some(response.status),
                format!(
                    "response is missing access_token or instance_url: {}",
                    response.body
                ),
            )),
        }
    }
}
