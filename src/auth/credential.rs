//! Confidential-client credential descriptor.

use url::Url;
use zeroize::Zeroizing;

use crate::error::ConfigurationError;
use crate::settings::AzureAdSettings;

/// Base URL of the Azure AD login endpoint.
pub const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";

/// The `.default` Graph scope: delegate to the permissions statically granted
/// on the app registration instead of requesting dynamic scopes.
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Credential descriptor for the OAuth2 client-credentials flow.
pub struct ClientCredential {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub tenant_id: String,
    #[allow(dead_code)]
    pub authority: Url,
    #[allow(dead_code)]
    pub redirect_uri: Url,
    pub scope: String,
}

impl ClientCredential {
    /// Build a credential from validated settings.
    ///
    /// The authority is derived from the tenant id; it and the redirect URI
    /// must parse as URLs.
    pub fn from_settings(settings: &AzureAdSettings) -> Result<Self, ConfigurationError> {
        let authority_str = format!("{}/{}/v2.0", LOGIN_BASE_URL, settings.tenant_id);
        let authority = Url::parse(&authority_str).map_err(|e| {
            ConfigurationError::InvalidAuthority(format!("{}: {}", authority_str, e))
        })?;

        let redirect_uri = Url::parse(&settings.redirect_uri).map_err(|e| {
            ConfigurationError::InvalidRedirectUri(format!("{}: {}", settings.redirect_uri, e))
        })?;

        Ok(Self {
            client_id: settings.client_id.clone(),
            client_secret: Zeroizing::new(settings.client_secret.clone()),
            tenant_id: settings.tenant_id.clone(),
            authority,
            redirect_uri,
            scope: DEFAULT_SCOPE.to_string(),
        })
    }

    /// Token endpoint for this tenant under `login_base`.
    pub fn token_endpoint(&self, login_base: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", login_base, self.tenant_id)
    }
}
