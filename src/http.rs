//! Raw HTTP access with bearer-injecting request decoration.

use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::{ApiError, ConfigurationError};

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client that attaches `Authorization: Bearer <token>` to every
/// outgoing request before it is sent.
///
/// Used for endpoints the typed client does not cover (e.g. the preview
/// Graph surface).
pub struct AuthorizedHttpClient {
    token_provider: Arc<dyn TokenProvider>,
    http_client: reqwest::Client,
}

impl AuthorizedHttpClient {
    /// Create a new authorized client over a shared token provider.
    pub fn new(token_provider: Arc<dyn TokenProvider>) -> Result<Self, ConfigurationError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            token_provider,
            http_client,
        })
    }

    /// Obtain a token and attach the bearer header.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token_provider.bearer_token().await?;
        Ok(request.bearer_auth(token))
    }

    /// GET an absolute URL and return the raw response body as text.
    ///
    /// Non-success statuses surface the transport failure unchanged; no
    /// status-specific interpretation is applied.
    pub async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        debug!("GET {}", url);

        let request = self.authorize(self.http_client.get(url)).await?;

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use async_trait::async_trait;
    use httpmock::prelude::*;

    struct StaticTokenProvider;

    #[async_trait]
    impl TokenProvider for StaticTokenProvider {
        async fn bearer_token(&self) -> Result<String, AuthError> {
            Ok("test-token".to_string())
        }
    }

    fn client() -> AuthorizedHttpClient {
        AuthorizedHttpClient::new(Arc::new(StaticTokenProvider)).unwrap()
    }

    #[tokio::test]
    async fn test_body_returned_unchanged() {
        let server = MockServer::start();
        let body = r#"{"value":[{"displayName":"Bob"}]}"#;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users")
                .query_param("$top", "1")
                .header("authorization", "Bearer test-token");
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        });

        let url = format!("{}/users?$top=1", server.base_url());
        let text = client().get_text(&url).await.unwrap();

        assert_eq!(text, body);
        mock.assert();
    }

    #[tokio::test]
    async fn test_non_success_is_error() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/users");
            then.status(500);
        });

        let url = format!("{}/users", server.base_url());
        let result = client().get_text(&url).await;

        assert!(matches!(result, Err(ApiError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        struct FailingProvider;

        #[async_trait]
        impl TokenProvider for FailingProvider {
            async fn bearer_token(&self) -> Result<String, AuthError> {
                Err(AuthError::TokenRequestFailed("HTTP 401".into()))
            }
        }

        let client = AuthorizedHttpClient::new(Arc::new(FailingProvider)).unwrap();
        let result = client.get_text("http://localhost:1/users").await;

        assert!(matches!(result, Err(ApiError::Auth(_))));
    }
}
