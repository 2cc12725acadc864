//! GraphQL documents and wire envelopes for the backend API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::types::{BackendArticle, BackendError, BackendResult, Viewer};

pub const VIEWER_QUERY: &str = r#"
query Viewer {
  me {
    id
    name
  }
}"#;

pub const SEARCH_QUERY: &str = r#"
query Search($after: String, $first: Int, $query: String, $includeContent: Boolean) {
  search(after: $after, first: $first, query: $query, includeContent: $includeContent) {
    ... on SearchSuccess {
      edges {
        cursor
        node {
          id
          title
          slug
          url
          originalArticleUrl
          savedAt
          updatedAt
          publishedAt
          description
          content
          author
          siteName
          image
          isArchived
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
    ... on SearchError {
      errorCodes
    }
  }
}"#;

pub const ARCHIVE_MUTATION: &str = r#"
mutation SetLinkArchived($input: ArchiveLinkInput!) {
  setLinkArchived(input: $input) {
    ... on ArchiveLinkSuccess {
      linkId
      message
    }
    ... on ArchiveLinkError {
      message
      errorCodes
    }
  }
}"#;

pub const DELETE_MUTATION: &str = r#"
mutation SetBookmarkArticle($input: SetBookmarkArticleInput!) {
  setBookmarkArticle(input: $input) {
    ... on SetBookmarkArticleSuccess {
      bookmarkedArticle {
        id
      }
    }
    ... on SetBookmarkArticleError {
      errorCodes
    }
  }
}"#;

/// Outgoing request body.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

/// Incoming response body.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorExtensions {
    pub code: Option<String>,
}

impl<T> GraphqlResponse<T> {
    /// Turn top-level `errors` or a missing `data` into a backend error.
    pub fn into_result(self, operation: &str) -> BackendResult<T> {
        if !self.errors.is_empty() {
            let unauthenticated = self.errors.iter().any(|e| {
                matches!(
                    e.extensions.as_ref().and_then(|x| x.code.as_deref()),
                    Some("UNAUTHENTICATED" | "UNAUTHORIZED")
                )
            });
            let messages = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(if unauthenticated {
                BackendError::Auth(format!("{operation}: {messages}"))
            } else {
                BackendError::Api(format!("{operation}: {messages}"))
            });
        }
        self.data
            .ok_or_else(|| BackendError::Api(format!("{operation}: response carried no data")))
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewerData {
    pub me: Option<Viewer>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchResult,
}

/// `SearchSuccess | SearchError`, flattened.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub edges: Vec<SearchEdge>,
    pub page_info: Option<PageInfo>,
    pub error_codes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEdge {
    pub node: BackendArticle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of search results.
#[derive(Debug)]
pub struct SearchPage {
    pub articles: Vec<BackendArticle>,
    /// Cursor for the next page, `None` once the listing is exhausted.
    pub next_cursor: Option<String>,
}

impl SearchResult {
    pub fn into_page(self) -> BackendResult<SearchPage> {
        if let Some(codes) = self.error_codes {
            return Err(BackendError::from_error_codes("search", &codes));
        }
        let next_cursor = self
            .page_info
            .filter(|p| p.has_next_page)
            .and_then(|p| p.end_cursor);
        Ok(SearchPage {
            articles: self.edges.into_iter().map(|e| e.node).collect(),
            next_cursor,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ArchiveData {
    #[serde(rename = "setLinkArchived")]
    pub result: MutationResult,
}

#[derive(Debug, Deserialize)]
pub struct DeleteData {
    #[serde(rename = "setBookmarkArticle")]
    pub result: MutationResult,
}

/// Success-or-error union returned by both mutations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    pub error_codes: Option<Vec<String>>,
}

impl MutationResult {
    pub fn check(self, operation: &str) -> BackendResult<()> {
        match self.error_codes {
            Some(codes) => Err(BackendError::from_error_codes(operation, &codes)),
            None => Ok(()),
        }
    }
}

/// Quote a URL for use inside a search query.
pub fn url_search_query(url: &str) -> String {
    let escaped = url.replace('\\', "\\\\").replace('"', "\\\"");
    format!("in:all url:\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_success_page() {
        let data: GraphqlResponse<SearchData> = serde_json::from_str(
            r#"{"data":{"search":{
                "edges":[{"cursor":"1","node":{"id":"a"}},{"cursor":"2","node":{"id":"b"}}],
                "pageInfo":{"hasNextPage":true,"endCursor":"2"}}}}"#,
        )
        .unwrap();

        let page = data.into_result("search").unwrap().search.into_page().unwrap();
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("2"));
    }

    #[test]
    fn test_search_last_page_has_no_cursor() {
        let data: GraphqlResponse<SearchData> = serde_json::from_str(
            r#"{"data":{"search":{"edges":[],"pageInfo":{"hasNextPage":false,"endCursor":"9"}}}}"#,
        )
        .unwrap();
        let page = data.into_result("search").unwrap().search.into_page().unwrap();
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_search_error_union() {
        let data: GraphqlResponse<SearchData> =
            serde_json::from_str(r#"{"data":{"search":{"errorCodes":["QUERY_TOO_LONG"]}}}"#)
                .unwrap();
        let err = data.into_result("search").unwrap().search.into_page().unwrap_err();
        assert!(matches!(err, BackendError::Api(_)));
    }

    #[test]
    fn test_top_level_errors() {
        let data: GraphqlResponse<ViewerData> = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"not logged in","extensions":{"code":"UNAUTHENTICATED"}}]}"#,
        )
        .unwrap();
        assert!(matches!(data.into_result("viewer"), Err(BackendError::Auth(_))));

        let data: GraphqlResponse<ViewerData> =
            serde_json::from_str(r#"{"errors":[{"message":"boom"}]}"#).unwrap();
        assert!(matches!(data.into_result("viewer"), Err(BackendError::Api(_))));
    }

    #[test]
    fn test_mutation_result() {
        let ok: ArchiveData =
            serde_json::from_str(r#"{"setLinkArchived":{"linkId":"a","message":"ok"}}"#).unwrap();
        assert!(ok.result.check("setLinkArchived").is_ok());

        let missing: DeleteData =
            serde_json::from_str(r#"{"setBookmarkArticle":{"errorCodes":["NOT_FOUND"]}}"#)
                .unwrap();
        assert!(matches!(
            missing.result.check("setBookmarkArticle"),
            Err(BackendError::NotFound(_))
        ));
    }

    #[test]
    fn test_url_search_query_escapes_quotes() {
        assert_eq!(
            url_search_query(r#"https://example.com/a"b"#),
            r#"in:all url:"https://example.com/a\"b""#
        );
    }
}
