//! Query module
//!
//! Reads the query file and executes each entry against Salesforce.
//!
//! # Overview
//!
//! - `QueryDefinition` / `QueryFileReader` - the `Name:QueryOrPath` file format
//! - `QueryDispatcher` - routes a line to the SOQL endpoint or a raw resource path
//! - `QueryResponse` - object-or-array response shape, resolved to one object

mod definition;
mod dispatcher;

pub use definition::{QueryDefinition, QueryFileReader};
pub use dispatcher::{resolve, QueryDispatcher, QueryResponse, Route};
