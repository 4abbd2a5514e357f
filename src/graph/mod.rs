//! Microsoft Graph API client for directory queries.

pub mod models;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::{ApiError, ConfigurationError};
use models::{DirectoryPage, Group, User};

/// Base URL for the stable Microsoft Graph surface.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed Graph client over a shared token provider.
pub struct GraphClient {
    token_provider: Arc<dyn TokenProvider>,
    http_client: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Create a client against the production Graph endpoint.
    pub fn new(token_provider: Arc<dyn TokenProvider>) -> Result<Self, ConfigurationError> {
        Self::with_base_url(token_provider, GRAPH_BASE_URL.to_string())
    }

    /// Create a client against an alternate Graph endpoint (tests).
    pub fn with_base_url(
        token_provider: Arc<dyn TokenProvider>,
        base_url: String,
    ) -> Result<Self, ConfigurationError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            token_provider,
            http_client,
            base_url,
        })
    }

    /// List up to `top` users, in the service's default order.
    pub async fn list_users(&self, top: usize) -> Result<Vec<User>, ApiError> {
        let url = format!("{}/users?$top={}", self.base_url, top);
        let page: DirectoryPage<User> = self.get_page(&url).await?;
        Ok(page.value)
    }

    /// List the groups visible to the configured application permissions.
    ///
    /// Reads a single page; no `@odata.nextLink` following.
    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        let url = format!("{}/groups", self.base_url);
        let page: DirectoryPage<Group> = self.get_page(&url).await?;
        Ok(page.value)
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<DirectoryPage<T>, ApiError> {
        let token = self.token_provider.bearer_token().await?;

        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        match response.status().as_u16() {
            200 => response
                .json()
                .await
                .map_err(|e| ApiError::ParseFailed(e.to_string())),
            401 => Err(ApiError::Unauthorized),
            403 => Err(ApiError::Forbidden),
            429 => Err(ApiError::RateLimited),
            // Don't expose raw API error details - just log status code
            status => Err(ApiError::RequestFailed(format!("HTTP {}", status))),
        }
    }
}
