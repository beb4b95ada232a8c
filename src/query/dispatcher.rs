//! Query dispatch
//!
//! Routes a query line either through the SOQL query endpoint or directly to
//! a REST resource path, and resolves the response shape.

use super::definition::QueryDefinition;
use crate::auth::Session;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::form_urlencoded::byte_serialize;

/// Matches the SOQL `select` keyword as a whole word, any case
static SELECT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bselect\b").unwrap());

/// How a query line is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// SOQL, sent through the query endpoint
    Query(&'a str),
    /// Raw REST resource path, appended to the instance URL
    Resource(&'a str),
}

impl<'a> Route<'a> {
    /// Decide the route for a query line
    pub fn of(query_or_path: &'a str) -> Self {
        if SELECT_REGEX.is_match(query_or_path) {
            Route::Query(query_or_path)
        } else {
            Route::Resource(query_or_path)
        }
    }

    /// Build the request URL. SOQL is form-encoded; resource paths are used as is.
    pub fn url(&self, service_base_url: &str, query_endpoint: &str) -> String {
        match self {
            Route::Query(query) => {
                let encoded: String = byte_serialize(query.as_bytes()).collect();
                format!("{service_base_url}{query_endpoint}{encoded}")
            }
            Route::Resource(path) => format!("{service_base_url}{path}"),
        }
    }
}

/// Shape of a query response body.
///
/// The API sometimes wraps a single logical result (including error reports)
/// in an array; the first element is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// A JSON object
    Single(Map<String, Value>),
    /// A JSON array
    Sequence(Vec<Value>),
}

impl QueryResponse {
    /// Parse a raw response body
    pub fn parse(body: &str) -> std::result::Result<Self, String> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Ok(QueryResponse::Single(map)),
            Ok(Value::Array(items)) => Ok(QueryResponse::Sequence(items)),
            Ok(other) => Err(format!("expected a JSON object or array, found {}", kind(&other))),
            Err(e) => Err(format!("response is not valid JSON: {e}")),
        }
    }

    /// The effective result object
    pub fn into_effective(self) -> std::result::Result<Map<String, Value>, String> {
        match self {
            QueryResponse::Single(map) => Ok(map),
            QueryResponse::Sequence(items) => match items.into_iter().next() {
                Some(Value::Object(map)) => Ok(map),
                Some(other) => Err(format!(
                    "first array element is {}, not an object",
                    kind(&other)
                )),
                None => Err("response is an empty array".to_string()),
            },
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Executes queries against the Salesforce REST API
pub struct QueryDispatcher {
    client: HttpClient,
    query_endpoint: String,
}

impl QueryDispatcher {
    /// Create a dispatcher. `query_endpoint` is the SOQL prefix, e.g.
    /// `/services/data/v52.0/query?q=`.
    pub fn new(client: HttpClient, query_endpoint: impl Into<String>) -> Self {
        Self {
            client,
            query_endpoint: query_endpoint.into(),
        }
    }

    /// Request URL for a query line
    pub fn url_for(&self, session: &Session, query_or_path: &str) -> String {
        Route::of(query_or_path).url(&session.service_base_url, &self.query_endpoint)
    }

    /// Run the query and return the raw response body.
    ///
    /// Network failures are fatal ([`Error::Network`]).
    pub async fn dispatch(&self, session: &Session, query: &QueryDefinition) -> Result<String> {
        let url = self.url_for(session, &query.query_or_path);
        debug!("Running query {}: {}", query.name, query.query_or_path);

        let response = self
            .client
            .get_json_text(&url, session.token())
            .await
            .map_err(|source| Error::Network {
                query: query.name.clone(),
                source,
            })?;

        debug!(
            "Query {} returned status {} ({} bytes)",
            query.name,
            response.status,
            response.body.len()
        );
        Ok(response.body)
    }

    /// Run the query and resolve the response to its effective object.
    ///
    /// An unparseable body is a per-query [`Error::MalformedResponse`].
    pub async fn fetch(
        &self,
        session: &Session,
        query: &QueryDefinition,
    ) -> Result<Map<String, Value>> {
        let body = self.dispatch(session, query).await?;
        resolve(&query.name, &body)
    }
}

/// Resolve a raw body to the effective result object
pub fn resolve(query_name: &str, body: &str) -> Result<Map<String, Value>> {
    let response =
        QueryResponse::parse(body).map_err(|message| Error::malformed(query_name, message, body))?;

    if let QueryResponse::Sequence(items) = &response {
        warn!(
            "Query {} returned an array of {} item(s); using the first",
            query_name,
            items.len()
        );
    }

    response
        .into_effective()
        .map_err(|message| Error::malformed(query_name, message, body))
}
