//! Backend → legacy conversion.
//!
//! Pure functions: no I/O, no failure. Missing optional data maps to the
//! legacy API's empty/zero placeholders.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::backend::BackendArticle;
use crate::pocket::types::{
    LegacyAuthor, LegacyItem, LegacyListResponse, LegacySingleResponse, SearchMeta,
};

/// Convert a full listing into the legacy bulk envelope.
pub fn to_legacy_list(articles: &[BackendArticle]) -> LegacyListResponse {
    let list: BTreeMap<String, LegacyItem> = articles
        .iter()
        .enumerate()
        .map(|(position, article)| (article.id.clone(), to_legacy_item(article, position)))
        .collect();

    let since = articles
        .iter()
        .flat_map(|a| [unix(a.saved_at), unix(a.updated_at)])
        .max()
        .unwrap_or(0);

    LegacyListResponse {
        status: 1,
        complete: 1,
        list,
        error: None,
        search_meta: SearchMeta {
            search_type: "normal".to_string(),
        },
        since,
    }
}

/// Convert one article into a listing entry at `position`.
pub fn to_legacy_item(article: &BackendArticle, position: usize) -> LegacyItem {
    let resolved_url = article.canonical_url().unwrap_or_default().to_string();
    let title = article.title.clone().unwrap_or_default();
    let updated = unix(article.updated_at.or(article.saved_at));

    let authors = article.author.as_deref().filter(|a| !a.is_empty()).map(|name| {
        let author = LegacyAuthor {
            item_id: article.id.clone(),
            author_id: "1".to_string(),
            name: name.to_string(),
            url: String::new(),
        };
        BTreeMap::from([("1".to_string(), author)])
    });

    LegacyItem {
        item_id: article.id.clone(),
        resolved_id: article.id.clone(),
        given_url: given_url(article),
        given_title: title.clone(),
        favorite: "0".to_string(),
        status: if article.is_archived { "1" } else { "0" }.to_string(),
        time_added: unix(article.saved_at).to_string(),
        time_updated: updated.to_string(),
        time_read: if article.is_archived { updated } else { 0 }.to_string(),
        time_favorited: "0".to_string(),
        sort_id: position,
        resolved_title: title,
        resolved_url,
        excerpt: article.description.clone().unwrap_or_default(),
        is_article: "1".to_string(),
        is_index: "0".to_string(),
        has_video: "0".to_string(),
        has_image: if article.image.is_some() { "1" } else { "0" }.to_string(),
        word_count: content_word_count(article).to_string(),
        lang: String::new(),
        top_image_url: article.image.clone(),
        authors,
    }
}

/// Convert one article into the legacy article-view response.
pub fn to_legacy_single(article: &BackendArticle) -> LegacySingleResponse {
    let resolved_url = article.canonical_url().unwrap_or_default().to_string();
    let host = url::Url::parse(&resolved_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();

    LegacySingleResponse {
        item_id: article.id.clone(),
        resolved_id: article.id.clone(),
        given_url: given_url(article),
        resolved_url_camel: resolved_url.clone(),
        resolved_url,
        title: article.title.clone().unwrap_or_default(),
        host,
        excerpt: article.description.clone().unwrap_or_default(),
        date_published: article
            .published_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        time_published: unix(article.published_at),
        word_count: content_word_count(article),
        is_article: 1,
        top_image_url: article.image.clone().unwrap_or_default(),
        article: article.content.clone().unwrap_or_default(),
    }
}

fn given_url(article: &BackendArticle) -> String {
    article
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or_else(|| article.canonical_url())
        .unwrap_or_default()
        .to_string()
}

fn unix(timestamp: Option<DateTime<Utc>>) -> i64 {
    timestamp.map(|t| t.timestamp()).unwrap_or(0)
}

fn content_word_count(article: &BackendArticle) -> usize {
    article.content.as_deref().map(word_count).unwrap_or(0)
}

/// Count whitespace-separated words in HTML, ignoring markup.
pub fn word_count(html: &str) -> usize {
    let mut count = 0;
    let mut in_tag = false;
    let mut in_word = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                in_word = false;
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_whitespace() => in_word = false,
            _ => {
                if !in_word {
                    count += 1;
                    in_word = true;
                }
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(id: &str) -> BackendArticle {
        BackendArticle {
            id: id.to_string(),
            title: Some(format!("Title {id}")),
            url: Some(format!("https://example.com/{id}")),
            saved_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            description: Some("An excerpt".to_string()),
            content: Some("<p>Hello <b>brave</b> new world</p>".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_word_count_ignores_markup() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("<p>Hello <b>brave</b> new world</p>"), 4);
        assert_eq!(word_count("<img src=\"a b c\"/>one\ntwo"), 2);
    }

    #[test]
    fn test_list_has_one_entry_per_article() {
        let articles = vec![article("a"), article("b"), article("c")];
        let response = to_legacy_list(&articles);

        assert_eq!(response.list.len(), 3);
        for (position, a) in articles.iter().enumerate() {
            let item = &response.list[&a.id];
            assert_eq!(item.item_id, a.id);
            assert_eq!(item.sort_id, position);
        }
        assert_eq!(response.status, 1);
        assert_eq!(response.complete, 1);
    }

    #[test]
    fn test_empty_list() {
        let response = to_legacy_list(&[]);
        assert!(response.list.is_empty());
        assert_eq!(response.since, 0);
    }

    #[test]
    fn test_item_field_mapping() {
        let item = to_legacy_item(&article("a"), 0);

        assert_eq!(item.resolved_url, "https://example.com/a");
        assert_eq!(item.resolved_title, "Title a");
        assert_eq!(item.excerpt, "An excerpt");
        assert_eq!(item.word_count, "4");
        assert_eq!(item.time_added, "1704110400");
        assert_eq!(item.status, "0");
        assert!(item.authors.is_none());
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let bare = BackendArticle {
            id: "bare".to_string(),
            ..Default::default()
        };

        let item = to_legacy_item(&bare, 0);
        assert_eq!(item.item_id, "bare");
        assert_eq!(item.resolved_url, "");
        assert_eq!(item.resolved_title, "");
        assert_eq!(item.excerpt, "");
        assert_eq!(item.word_count, "0");
        assert_eq!(item.time_added, "0");
        assert_eq!(item.has_image, "0");

        let single = to_legacy_single(&bare);
        assert_eq!(single.article, "");
        assert_eq!(single.word_count, 0);
        assert_eq!(single.host, "");
        assert!(single.date_published.is_none());
    }

    #[test]
    fn test_archived_item_status() {
        let mut a = article("a");
        a.is_archived = true;
        a.updated_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        a.author = Some("Jo Writer".to_string());

        let item = to_legacy_item(&a, 0);
        assert_eq!(item.status, "1");
        assert_eq!(item.time_read, item.time_updated);
        assert_eq!(item.authors.unwrap()["1"].name, "Jo Writer");
    }

    #[test]
    fn test_single_uses_original_url() {
        let mut a = article("a");
        a.url = Some("https://omnivore.app/me/a".to_string());
        a.original_article_url = Some("https://blog.example.org/post".to_string());

        let single = to_legacy_single(&a);
        assert_eq!(single.given_url, "https://omnivore.app/me/a");
        assert_eq!(single.resolved_url, "https://blog.example.org/post");
        assert_eq!(single.resolved_url_camel, single.resolved_url);
        assert_eq!(single.host, "blog.example.org");
        assert_eq!(single.article, "<p>Hello <b>brave</b> new world</p>");
        assert_eq!(single.word_count, 4);
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let articles = vec![article("a"), article("b")];
        assert_eq!(to_legacy_list(&articles), to_legacy_list(&articles));
        assert_eq!(to_legacy_single(&articles[0]), to_legacy_single(&articles[0]));
    }

    #[test]
    fn test_single_json_field_names() {
        let json = serde_json::to_value(to_legacy_single(&article("a"))).unwrap();
        assert_eq!(json["resolvedUrl"], "https://example.com/a");
        assert_eq!(json["wordCount"], 4);
        assert_eq!(json["article"], "<p>Hello <b>brave</b> new world</p>");
    }
}
