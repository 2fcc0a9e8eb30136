use serde::{Deserialize, Serialize};

/// Authenticated user, as returned by `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Team summary, as returned by `GET /teams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
}

/// Note record. The API sends camelCase keys and epoch-millisecond
/// timestamps; `content` is only present on single-note fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Note {
    /// Title for display; some note kinds come back without one.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}
