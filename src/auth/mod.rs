//! Authentication module
//!
//! Salesforce OAuth 2.0 username-password flow. The password is stored
//! encrypted in the settings file and decrypted with the security token when
//! credentials are built.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{Credentials, Session};
