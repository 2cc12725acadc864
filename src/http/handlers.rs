//! Legacy endpoint handlers.
//!
//! Each handler walks the same steps: validate the body, resolve the
//! credential, obtain the cached session, call the backend, convert.

use axum::{extract::State, Json};
use futures_util::future::join_all;

use crate::backend::{BackendClient, BackendError, BackendResult};
use crate::http::request::LegacyBody;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::pocket::{
    to_legacy_list, to_legacy_single, GetRequest, LegacyAction, LegacyListResponse,
    LegacySingleResponse, SendRequest, SendResponse, TextRequest,
};

/// `POST /v3/send`
pub async fn send_actions(
    State(state): State<AppState>,
    LegacyBody(request): LegacyBody<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let client = state.client_for(request.access_token.as_deref()).await?;

    let batch = ActionBatch::partition(&request.actions);
    tracing::info!(
        archive = batch.archive.len(),
        delete = batch.delete.len(),
        dropped = batch.dropped,
        "Dispatching action batch"
    );
    batch.run(&client).await?;

    Ok(Json(SendResponse::default()))
}

/// `POST /v3/get`
pub async fn get_list(
    State(state): State<AppState>,
    LegacyBody(request): LegacyBody<GetRequest>,
) -> Result<Json<LegacyListResponse>, ApiError> {
    let client = state.client_for(request.access_token.as_deref()).await?;

    let articles = client.fetch_pages().await?;
    tracing::info!(articles = articles.len(), "Serving article list");
    Ok(Json(to_legacy_list(&articles)))
}

/// `POST /v3beta/text`
pub async fn get_text(
    State(state): State<AppState>,
    LegacyBody(request): LegacyBody<TextRequest>,
) -> Result<Json<LegacySingleResponse>, ApiError> {
    let client = state.client_for(request.access_token.as_deref()).await?;

    let article = client.fetch_page(&request.url).await?;
    tracing::info!(item_id = %article.id, "Serving article text");
    Ok(Json(to_legacy_single(&article)))
}

/// `GET /beep`
pub async fn beep() -> &'static str {
    "boop"
}

/// Send actions split by kind. Unknown actions are only counted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ActionBatch {
    pub archive: Vec<String>,
    pub delete: Vec<String>,
    pub dropped: usize,
}

impl ActionBatch {
    pub fn partition(actions: &[LegacyAction]) -> Self {
        let mut batch = Self::default();
        for action in actions {
            match action.action.as_str() {
                "archive" => batch.archive.push(action.item_id.clone()),
                "delete" => batch.delete.push(action.item_id.clone()),
                other => {
                    tracing::debug!(action = %other, item_id = %action.item_id, "Dropping unsupported action");
                    batch.dropped += 1;
                }
            }
        }
        batch
    }

    /// Issue every call concurrently and wait for all of them.
    ///
    /// fail-fast-batch: if any call failed the whole batch fails, even
    /// though the other calls have already taken effect.
    pub async fn run(&self, client: &BackendClient) -> BackendResult<()> {
        let archives = join_all(self.archive.iter().map(|id| client.archive_link(id)));
        let deletes = join_all(self.delete.iter().map(|id| client.delete_link(id)));
        let (archived, deleted) = tokio::join!(archives, deletes);

        let outcomes = self
            .archive
            .iter()
            .zip(archived)
            .map(|(id, result)| ("archive", id, result))
            .chain(
                self.delete
                    .iter()
                    .zip(deleted)
                    .map(|(id, result)| ("delete", id, result)),
            );

        let mut first_error: Option<BackendError> = None;
        for (action, item_id, result) in outcomes {
            if let Err(e) = result {
                tracing::warn!(action, item_id = %item_id, error = %e, "Action failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
