//! HTTP client module
//!
//! Provides the timeout-bounded HTTP client shared by authentication and
//! query dispatch.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpResponse};

#[cfg(test)]
mod tests;
