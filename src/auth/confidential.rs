//! Confidential client implementing the client-credentials token flow.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::credential::{ClientCredential, LOGIN_BASE_URL};
use super::TokenProvider;
use crate::error::{AuthError, ConfigurationError};

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Re-request the token this long before its reported expiry.
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// A bearer token and the instant it expires.
struct CachedToken {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        self.expires_at - chrono::Duration::seconds(EXPIRY_SKEW_SECONDS) > Utc::now()
    }
}

/// Confidential client for a single app registration.
///
/// Posts the client-credentials form to the tenant token endpoint and caches
/// the resulting token in memory until shortly before expiry. Never persisted.
pub struct ConfidentialClient {
    credential: ClientCredential,
    login_base: String,
    http_client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ConfidentialClient {
    /// Create a client against the production login endpoint.
    pub fn new(credential: ClientCredential) -> Result<Self, ConfigurationError> {
        Self::with_login_base(credential, LOGIN_BASE_URL.to_string())
    }

    /// Create a client against an alternate login endpoint (tests).
    pub fn with_login_base(
        credential: ClientCredential,
        login_base: String,
    ) -> Result<Self, ConfigurationError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            credential,
            login_base,
            http_client,
            cached: Mutex::new(None),
        })
    }

    /// Request a fresh token from the token endpoint.
    async fn request_token(&self) -> Result<CachedToken, AuthError> {
        let token_endpoint = self.credential.token_endpoint(&self.login_base);

        let params = [
            ("client_id", self.credential.client_id.as_str()),
            ("client_secret", self.credential.client_secret.as_str()),
            ("scope", self.credential.scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        debug!("Requesting token from {}", token_endpoint);

        let response = self
            .http_client
            .post(&token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // Log error details for debugging (doesn't expose to caller)
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed: HTTP {} - {}", status, error_body);
            return Err(AuthError::TokenRequestFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ParseFailed(e.to_string()))?;

        let expires_at = Utc::now() + chrono::Duration::seconds(token_response.expires_in as i64);
        info!("Acquired token, expires at {}", expires_at);

        Ok(CachedToken {
            token: Zeroizing::new(token_response.access_token),
            expires_at,
        })
    }
}

#[async_trait]
impl TokenProvider for ConfidentialClient {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;

        match cached.as_ref() {
            Some(token) if token.is_valid() => Ok(token.token.to_string()),
            _ => {
                let token = self.request_token().await?;
                let value = token.token.to_string();
                *cached = Some(token);
                Ok(value)
            }
        }
    }
}

/// Token response from Azure AD.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AzureAdSettings;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> ConfidentialClient {
        let settings = AzureAdSettings {
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            tenant_id: "test-tenant".into(),
            redirect_uri: "https://localhost".into(),
            domain: "contoso.com".into(),
        };
        let credential = ClientCredential::from_settings(&settings).unwrap();
        ConfidentialClient::with_login_base(credential, server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn test_token_request_form() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/test-tenant/oauth2/v2.0/token")
                .body_includes("grant_type=client_credentials")
                .body_includes("client_id=test-client")
                .body_includes("client_secret=test-secret")
                .body_includes("scope=https%3A%2F%2Fgraph.microsoft.com%2F.default");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"tok-123","token_type":"Bearer","expires_in":3600}"#);
        });

        let token = client(&server).bearer_token().await.unwrap();

        assert_eq!(token, "tok-123");
        mock.assert();
    }

    #[tokio::test]
    async fn test_token_cached_across_calls() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"tok-123","token_type":"Bearer","expires_in":3600}"#);
        });

        let client = client(&server);
        for _ in 0..5 {
            assert_eq!(client.bearer_token().await.unwrap(), "tok-123");
        }

        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_token_re_requested() {
        let server = MockServer::start();

        // expires_in below the skew means the token is stale immediately
        let mock = server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"tok-123","token_type":"Bearer","expires_in":30}"#);
        });

        let client = client(&server);
        client.bearer_token().await.unwrap();
        client.bearer_token().await.unwrap();

        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_token_request_failure() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(401)
                .header("content-type", "application/json")
                .body(r#"{"error":"invalid_client"}"#);
        });

        let result = client(&server).bearer_token().await;

        match result {
            Err(AuthError::TokenRequestFailed(msg)) => assert_eq!(msg, "HTTP 401"),
            other => panic!("expected TokenRequestFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"unexpected":"shape"}"#);
        });

        let result = client(&server).bearer_token().await;
        assert!(matches!(result, Err(AuthError::ParseFailed(_))));
    }
}
