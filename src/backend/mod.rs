//! Backend article API integration.
//!
//! # Data Flow
//! ```text
//! Credential (from request or fallback config)
//!     → client.rs (session per credential, GraphQL over HTTP)
//!     → graphql.rs (documents, response envelopes, union error codes)
//!     → types.rs (BackendArticle, BackendError)
//! ```
//!
//! # Design Decisions
//! - No retries and no recovery: every failure propagates to the caller
//! - Error taxonomy is Auth / NotFound / Connectivity / Api
//! - Credentials never appear in logs or Debug output

pub mod client;
pub mod graphql;
pub mod types;

pub use client::BackendClient;
pub use types::{BackendArticle, BackendError, BackendResult, Credential};
