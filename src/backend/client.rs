//! Backend API client bound to one credential.
//!
//! # Responsibilities
//! - Establish a session for a credential (viewer query)
//! - Archive and delete items by identifier
//! - List the saved articles, paging until the listing is exhausted
//! - Resolve a single article (with content) by URL

use std::time::{Duration, Instant};

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::backend::graphql::{
    url_search_query, ArchiveData, DeleteData, GraphqlRequest, GraphqlResponse, SearchData,
    SearchPage, ViewerData, ARCHIVE_MUTATION, DELETE_MUTATION, SEARCH_QUERY, VIEWER_QUERY,
};
use crate::backend::types::{
    BackendArticle, BackendConfig, BackendError, BackendResult, Credential, Viewer,
};
use crate::observability::metrics;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Authenticated session against the backend article API.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
    credential: Credential,
    viewer: Viewer,
}

impl BackendClient {
    /// Establish a session for `credential`.
    ///
    /// Fails with [`BackendError::Auth`] if the backend does not recognise the
    /// credential and [`BackendError::Connectivity`] if it cannot be reached.
    pub async fn connect(config: &BackendConfig, credential: Credential) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BackendError::Connectivity(format!("failed to build HTTP client: {e}")))?;

        let data: ViewerData =
            execute(&http, &config.api_url, &credential, "viewer", VIEWER_QUERY, json!({})).await?;
        let viewer = data
            .me
            .ok_or_else(|| BackendError::Auth("no account behind credential".to_string()))?;

        tracing::info!(
            credential = %credential.fingerprint(),
            viewer_id = %viewer.id,
            "Backend session established"
        );

        Ok(Self {
            http,
            config: config.clone(),
            credential,
            viewer,
        })
    }

    /// The account this session belongs to.
    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Mark an item archived.
    pub async fn archive_link(&self, item_id: &str) -> BackendResult<()> {
        let data: ArchiveData = self
            .execute(
                "setLinkArchived",
                ARCHIVE_MUTATION,
                json!({ "input": { "linkId": item_id, "archived": true } }),
            )
            .await?;
        data.result.check("setLinkArchived")?;
        tracing::debug!(item_id = %item_id, "Archived item");
        Ok(())
    }

    /// Remove an item.
    pub async fn delete_link(&self, item_id: &str) -> BackendResult<()> {
        let data: DeleteData = self
            .execute(
                "setBookmarkArticle",
                DELETE_MUTATION,
                json!({ "input": { "articleID": item_id, "bookmark": false } }),
            )
            .await?;
        data.result.check("setBookmarkArticle")?;
        tracing::debug!(item_id = %item_id, "Deleted item");
        Ok(())
    }

    /// Fetch every saved article, following the cursor until exhausted.
    ///
    /// A failure on any page fails the whole listing.
    pub async fn fetch_pages(&self) -> BackendResult<Vec<BackendArticle>> {
        let mut articles = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .search(
                    &self.config.list_query,
                    after.as_deref(),
                    self.config.page_size,
                    self.config.list_include_content,
                )
                .await?;
            pages += 1;
            articles.extend(page.articles);

            match page.next_cursor {
                // A repeated cursor would loop forever.
                Some(cursor) if after.as_deref() != Some(cursor.as_str()) => after = Some(cursor),
                _ => break,
            }
        }

        tracing::debug!(pages, articles = articles.len(), "Fetched article listing");
        Ok(articles)
    }

    /// Resolve one article, with its content, by URL.
    pub async fn fetch_page(&self, url: &str) -> BackendResult<BackendArticle> {
        let page = self.search(&url_search_query(url), None, 1, true).await?;
        page.articles
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("no saved article for {url}")))
    }

    async fn search(
        &self,
        query: &str,
        after: Option<&str>,
        first: u32,
        include_content: bool,
    ) -> BackendResult<SearchPage> {
        let data: SearchData = self
            .execute(
                "search",
                SEARCH_QUERY,
                json!({
                    "after": after,
                    "first": first,
                    "query": query,
                    "includeContent": include_content,
                }),
            )
            .await?;
        data.search.into_page()
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> BackendResult<T> {
        execute(
            &self.http,
            &self.config.api_url,
            &self.credential,
            operation,
            query,
            variables,
        )
        .await
    }
}

/// Run one GraphQL operation and record its outcome.
async fn execute<T: DeserializeOwned>(
    http: &reqwest::Client,
    api_url: &str,
    credential: &Credential,
    operation: &'static str,
    query: &str,
    variables: Value,
) -> BackendResult<T> {
    let start = Instant::now();
    let result = send(http, api_url, credential, operation, query, variables).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record_backend_call(operation, outcome, start);
    if let Err(e) = &result {
        tracing::warn!(operation, error = %e, "Backend call failed");
    }
    result
}

async fn send<T: DeserializeOwned>(
    http: &reqwest::Client,
    api_url: &str,
    credential: &Credential,
    operation: &'static str,
    query: &str,
    variables: Value,
) -> BackendResult<T> {
    let response = http
        .post(api_url)
        .header(AUTHORIZATION, credential.as_str())
        .json(&GraphqlRequest { query, variables })
        .send()
        .await
        .map_err(BackendError::from_transport)?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Auth(format!("{operation}: HTTP {status}")));
    }
    if !status.is_success() {
        return Err(BackendError::Api(format!("{operation}: HTTP {status}")));
    }

    let body = response.bytes().await.map_err(BackendError::from_transport)?;
    let envelope: GraphqlResponse<T> = serde_json::from_slice(&body)
        .map_err(|e| BackendError::Api(format!("{operation}: malformed response: {e}")))?;
    envelope.into_result(operation)
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("api_url", &self.config.api_url)
            .field("credential", &self.credential)
            .field("viewer_id", &self.viewer.id)
            .finish()
    }
}
