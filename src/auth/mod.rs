//! Client-credentials authentication against Azure AD.

pub mod confidential;
pub mod credential;

pub use confidential::ConfidentialClient;
pub use credential::{ClientCredential, LOGIN_BASE_URL};

use async_trait::async_trait;

use crate::error::AuthError;

/// Capability to produce a currently valid bearer token on demand.
///
/// The rest of the program only sees this seam; token caching and transparent
/// re-acquisition live behind it.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, AuthError>;
}
