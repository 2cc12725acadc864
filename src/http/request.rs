//! Request preprocessing middleware.
//!
//! # Responsibilities
//! - Repair the malformed `charset=UTF8` token legacy clients send
//! - Record per-endpoint request metrics
//! - Build the trace span carrying the request ID
//! - Decode legacy bodies sent either as JSON or as a urlencoded form
//!
//! # Design Decisions
//! - Content-type repair runs before any body extractor sees the request
//! - Metrics are labelled with the matched route, never the raw path

use std::time::Instant;

use axum::{
    body::Body,
    extract::{FromRequest, MatchedPath},
    http::{header::CONTENT_TYPE, HeaderValue, Request},
    middleware::Next,
    response::Response,
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::Span;

use crate::http::response::ApiError;
use crate::observability::metrics;

/// Request ID header set on every request and echoed on the response.
pub const X_REQUEST_ID: &str = "x-request-id";

const BAD_CHARSET: &str = "charset=UTF8";
const GOOD_CHARSET: &str = "charset=UTF-8";
const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Rewrite `charset=UTF8` to `charset=UTF-8` in the Content-Type header.
pub async fn normalize_content_type(mut req: Request<Body>, next: Next) -> Response {
    let fixed = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.contains(BAD_CHARSET))
        .map(|v| v.replace(BAD_CHARSET, GOOD_CHARSET));

    if let Some(fixed) = fixed {
        match HeaderValue::from_str(&fixed) {
            Ok(value) => {
                req.headers_mut().insert(CONTENT_TYPE, value);
            }
            Err(e) => tracing::debug!(error = %e, "Could not rewrite content type"),
        }
    }

    next.run(req).await
}

/// Count and time every request by matched route.
pub async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;
    metrics::record_request(endpoint, response.status().as_u16(), start);
    response
}

/// Request body decoded from JSON or, when the client says so, a urlencoded form.
///
/// Anything that is not `application/x-www-form-urlencoded` goes through the
/// JSON extractor, which rejects missing or foreign content types with 415.
#[derive(Debug)]
pub struct LegacyBody<T>(pub T);

impl<T, S> FromRequest<S> for LegacyBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

fn is_form(req: &Request<Body>) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_MIME))
}

/// Span for the trace layer, tagged with the request ID.
pub fn make_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use tower::ServiceExt;

    async fn echo_content_type(req: Request<Body>) -> String {
        req.headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn content_type_after_middleware(value: &str) -> String {
        let app = Router::new()
            .route("/", post(echo_content_type))
            .layer(axum::middleware::from_fn(normalize_content_type));

        let response = app
            .oneshot(
                Request::post("/")
                    .header(CONTENT_TYPE, value)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_rewrites_bad_charset() {
        assert_eq!(
            content_type_after_middleware("application/json; charset=UTF8").await,
            "application/json; charset=UTF-8"
        );
    }

    #[derive(serde::Deserialize)]
    struct Lookup {
        url: String,
    }

    async fn echo_url(LegacyBody(lookup): LegacyBody<Lookup>) -> String {
        lookup.url
    }

    async fn decode(content_type: Option<&str>, body: &'static str) -> (u16, String) {
        let app = Router::new().route("/", post(echo_url));
        let mut request = Request::post("/");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = app
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_legacy_body_accepts_json_and_form() {
        let json = decode(Some("application/json"), r#"{"url":"https://a.example/x"}"#).await;
        assert_eq!(json, (200, "https://a.example/x".to_string()));

        let form = decode(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "url=https%3A%2F%2Fa.example%2Fx",
        )
        .await;
        assert_eq!(form, (200, "https://a.example/x".to_string()));
    }

    #[tokio::test]
    async fn test_legacy_body_rejections() {
        assert_eq!(decode(None, r#"{"url":"x"}"#).await, (415, String::new()));
        assert_eq!(decode(Some("text/plain"), r#"{"url":"x"}"#).await, (415, String::new()));
        assert_eq!(decode(Some("application/json"), "{}").await, (422, String::new()));
        assert_eq!(
            decode(Some("application/x-www-form-urlencoded"), "other=1").await.0,
            422
        );
    }

    #[tokio::test]
    async fn test_leaves_good_charset_alone() {
        assert_eq!(
            content_type_after_middleware("application/json; charset=UTF-8").await,
            "application/json; charset=UTF-8"
        );
    }
}
