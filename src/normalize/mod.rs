//! Result normalization module
//!
//! Turns the effective JSON object of a query response into the XML document
//! that is written to disk and forwarded to the `xmlParse` procedure.
//!
//! # Overview
//!
//! - An `errorCode` member marks a failed query; nothing is rendered.
//! - Otherwise the object is rendered under a `recordsFound` root element.
//! - Every `attributes` subtree (record metadata) is dropped, at any depth.

mod xml;

pub use xml::{encode_name, render, METADATA_ELEMENT};

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Root element of every normalized document
pub const ROOT_ELEMENT: &str = "recordsFound";

/// An XML rendering of one query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    inner_xml: String,
}

impl NormalizedDocument {
    /// Serialized root element, without an XML declaration
    pub fn inner_xml(&self) -> &str {
        &self.inner_xml
    }

    /// Consume the document and return its XML
    pub fn into_inner_xml(self) -> String {
        self.inner_xml
    }
}

/// Converts query results into [`NormalizedDocument`]s
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    root: String,
}

impl Default for ResultNormalizer {
    fn default() -> Self {
        Self {
            root: ROOT_ELEMENT.to_string(),
        }
    }
}

impl ResultNormalizer {
    /// Create a normalizer with the standard root element
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with a different root element
    pub fn with_root(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Normalize the effective result object of `query_name`.
    ///
    /// Fails with [`Error::QueryExecution`] when the object reports an `errorCode`.
    pub fn normalize(
        &self,
        query_name: &str,
        object: &Map<String, Value>,
    ) -> Result<NormalizedDocument> {
        if let Some(code) = object.get("errorCode") {
            return Err(Error::QueryExecution {
                query: query_name.to_string(),
                code: scalar_text(code),
                message: object.get("message").map(scalar_text).unwrap_or_default(),
            });
        }

        Ok(NormalizedDocument {
            inner_xml: render(&self.root, object)?,
        })
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests;
