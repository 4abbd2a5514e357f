//! Typed projections of Microsoft Graph directory records.

use serde::Deserialize;

/// Graph user record from the v1.0 `users` collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user.
    pub id: String,

    /// User's display name.
    pub display_name: Option<String>,

    /// User Principal Name (typically email-like format).
    pub user_principal_name: Option<String>,
}

impl User {
    /// Get the best available display name.
    pub fn display_name_or_upn(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.user_principal_name.clone())
            .unwrap_or_else(|| "Unknown User".to_string())
    }
}

/// Graph group record from the v1.0 `groups` collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Unique identifier for the group.
    pub id: String,

    /// Group display name.
    pub display_name: Option<String>,
}

/// Log-only projection of a group, created transiently per run.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub group_id: String,
    pub group_name: String,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            group_id: group.id.clone(),
            group_name: group.display_name.clone().unwrap_or_default(),
        }
    }
}

/// OData collection envelope returned by Graph list endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DirectoryPage<T> {
    #[serde(default)]
    pub value: Vec<T>,
}
