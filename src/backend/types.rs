//! Backend article types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export BackendConfig from config module to avoid duplication
pub use crate::config::schema::BackendConfig;

/// Bearer credential identifying one backend account.
///
/// Debug output never contains the secret itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, non-reversible tag that is safe to put in logs.
    pub fn fingerprint(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}…({} chars)", self.0.chars().count())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.fingerprint()).finish()
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Credential is invalid or expired.
    #[error("Backend rejected credential: {0}")]
    Auth(String),

    /// Referenced item or article does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend could not be reached (connect failure, timeout).
    #[error("Backend unreachable: {0}")]
    Connectivity(String),

    /// Any other failure reported by the backend.
    #[error("Backend error: {0}")]
    Api(String),
}

impl BackendError {
    /// Classify a transport-level error from the HTTP client.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            BackendError::Auth(format!("credential is not a valid header value: {err}"))
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            BackendError::Connectivity(err.to_string())
        } else {
            BackendError::Api(err.to_string())
        }
    }

    /// Classify the `errorCodes` of a GraphQL error union member.
    pub fn from_error_codes(operation: &str, codes: &[String]) -> Self {
        let joined = codes.join(",");
        if codes.iter().any(|c| c == "UNAUTHORIZED") {
            BackendError::Auth(format!("{operation}: {joined}"))
        } else if codes.iter().any(|c| c == "NOT_FOUND") {
            BackendError::NotFound(format!("{operation}: {joined}"))
        } else {
            BackendError::Api(format!("{operation}: {joined}"))
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Auth(_) => "auth",
            BackendError::NotFound(_) => "not_found",
            BackendError::Connectivity(_) => "connectivity",
            BackendError::Api(_) => "api",
        }
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// An article as stored by the backend (a search result node).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendArticle {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub original_article_url: Option<String>,
    pub slug: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    /// Short summary; the legacy API calls it the excerpt.
    pub description: Option<String>,
    /// Extracted readable HTML, only present when requested.
    pub content: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
}

impl BackendArticle {
    /// Canonical URL: the original article URL when known, else the saved URL.
    pub fn canonical_url(&self) -> Option<&str> {
        non_empty(self.original_article_url.as_deref()).or_else(|| non_empty(self.url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// The account behind a credential, returned when a session is established.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret-token");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("supe"));
    }

    #[test]
    fn test_error_code_classification() {
        let codes = vec!["NOT_FOUND".to_string()];
        assert!(matches!(
            BackendError::from_error_codes("setLinkArchived", &codes),
            BackendError::NotFound(_)
        ));

        let codes = vec!["UNAUTHORIZED".to_string()];
        assert!(matches!(
            BackendError::from_error_codes("search", &codes),
            BackendError::Auth(_)
        ));

        let codes = vec!["BAD_REQUEST".to_string()];
        let err = BackendError::from_error_codes("search", &codes);
        assert_eq!(err.to_string(), "Backend error: search: BAD_REQUEST");
    }

    #[test]
    fn test_article_decodes_sparse_node() {
        let article: BackendArticle = serde_json::from_str(
            r#"{"id":"a1","url":"https://example.com/post","savedAt":"2024-01-01T12:00:00.000Z"}"#,
        )
        .unwrap();

        assert_eq!(article.id, "a1");
        assert!(article.content.is_none());
        assert!(!article.is_archived);
        assert_eq!(article.saved_at.unwrap().timestamp(), 1_704_110_400);
    }

    #[test]
    fn test_canonical_url_prefers_original() {
        let mut article = BackendArticle {
            id: "a1".into(),
            url: Some("https://omnivore.app/me/slug".into()),
            ..Default::default()
        };
        assert_eq!(article.canonical_url(), Some("https://omnivore.app/me/slug"));

        article.original_article_url = Some("https://example.com/post".into());
        assert_eq!(article.canonical_url(), Some("https://example.com/post"));

        article.original_article_url = Some(String::new());
        assert_eq!(article.canonical_url(), Some("https://omnivore.app/me/slug"));
    }
}
