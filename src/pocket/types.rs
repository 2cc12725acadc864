//! Legacy (Pocket v3) request and response shapes.
//!
//! Numeric item fields are strings on the wire, as the legacy API sends them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `POST /v3/send` body.
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    pub actions: Vec<LegacyAction>,
}

/// One entry of a send batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LegacyAction {
    pub action: String,
    pub item_id: String,
}

/// `POST /v3/get` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetRequest {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// `POST /v3beta/text` body.
#[derive(Debug, Clone, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    pub url: String,
}

/// Response of `POST /v3/send`. Per-action outcomes are never reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendResponse {
    pub action_results: Vec<bool>,
}

/// Response of `POST /v3/get`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyListResponse {
    pub status: u8,
    pub complete: u8,
    /// Items keyed by `item_id`.
    pub list: BTreeMap<String, LegacyItem>,
    pub error: Option<String>,
    pub search_meta: SearchMeta,
    pub since: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMeta {
    pub search_type: String,
}

/// One saved item in the bulk listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyItem {
    pub item_id: String,
    pub resolved_id: String,
    pub given_url: String,
    pub given_title: String,
    pub favorite: String,
    /// "0" unread, "1" archived.
    pub status: String,
    pub time_added: String,
    pub time_updated: String,
    pub time_read: String,
    pub time_favorited: String,
    /// Position in the backend listing.
    pub sort_id: usize,
    pub resolved_title: String,
    pub resolved_url: String,
    pub excerpt: String,
    pub is_article: String,
    pub is_index: String,
    pub has_video: String,
    pub has_image: String,
    pub word_count: String,
    pub lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<BTreeMap<String, LegacyAuthor>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyAuthor {
    pub item_id: String,
    pub author_id: String,
    pub name: String,
    pub url: String,
}

/// Response of `POST /v3beta/text` (the legacy article view).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacySingleResponse {
    pub item_id: String,
    pub resolved_id: String,
    pub given_url: String,
    #[serde(rename = "resolvedUrl")]
    pub resolved_url_camel: String,
    pub resolved_url: String,
    pub title: String,
    pub host: String,
    pub excerpt: String,
    #[serde(rename = "datePublished")]
    pub date_published: Option<String>,
    #[serde(rename = "timePublished")]
    pub time_published: i64,
    #[serde(rename = "wordCount")]
    pub word_count: usize,
    #[serde(rename = "isArticle")]
    pub is_article: u8,
    #[serde(rename = "topImageUrl")]
    pub top_image_url: String,
    /// Extracted article HTML.
    pub article: String,
}
