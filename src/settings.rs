//! Settings loading from `appsettings.json`.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigurationError;

/// Name of the settings file, looked up in the working directory.
pub const SETTINGS_FILE: &str = "appsettings.json";

/// Printed when the settings file is missing or incomplete.
pub const REMEDIATION_MESSAGE: &str =
    "Missing or invalid appsettings.json file. Please see README.md for configuration instructions.";

/// Root of `appsettings.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "AzureAd", default)]
    pub azure_ad: AzureAdSettings,
}

/// The `AzureAd` section of the settings file.
///
/// Missing keys deserialize to empty strings so that missing and empty values
/// are rejected identically.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AzureAdSettings {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub redirect_uri: String,
    pub domain: String,
}

impl AppSettings {
    /// Load settings from `appsettings.json` in `dir`.
    ///
    /// An absent file and a file with any required value missing or empty both
    /// yield `Ok(None)`; an unreadable or malformed file is an error.
    pub fn load(dir: &Path) -> Result<Option<Self>, ConfigurationError> {
        let path = dir.join(SETTINGS_FILE);

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let settings: AppSettings = serde_json::from_str(&contents)?;

        if settings.azure_ad.is_complete() {
            Ok(Some(settings))
        } else {
            debug!("Settings file is missing required values");
            Ok(None)
        }
    }
}

impl AzureAdSettings {
    /// All five required values present and non-empty.
    fn is_complete(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.tenant_id.is_empty()
            && !self.redirect_uri.is_empty()
            && !self.domain.is_empty()
    }
}
