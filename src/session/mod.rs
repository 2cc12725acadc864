//! Backend session management.
//!
//! # Data Flow
//! ```text
//! access_token from request body (optional)
//!     → resolve_credential (request token, else configured fallback)
//!     → cache.rs (lookup-or-connect, one session per credential)
//!     → Arc<BackendClient> handed to the endpoint handler
//! ```
//!
//! # Design Decisions
//! - The cache is owned by the server state and injected into handlers
//! - Lookup-or-create is atomic per credential (per-key once-cell)
//! - Sessions are never evicted; failed connects leave no entry behind
//! - Tokens are trimmed of surrounding whitespace, the configured fallback included

pub mod cache;

pub use cache::SessionCache;

use crate::backend::Credential;

/// Pick the request's own token when it carries a non-empty one.
pub fn resolve_credential(access_token: Option<&str>, fallback: &Credential) -> Credential {
    match access_token.map(str::trim) {
        Some(token) if !token.is_empty() => Credential::new(token),
        _ => fallback.clone(),
    }
}
