//! Legacy read-it-later (Pocket v3) API surface.
//!
//! # Data Flow
//! ```text
//! Inbound JSON body
//!     → types.rs (SendRequest / GetRequest / TextRequest)
//!
//! Vec<BackendArticle> / BackendArticle
//!     → convert.rs (pure mapping, defaults for missing fields)
//!     → types.rs (LegacyListResponse / LegacySingleResponse)
//! ```

pub mod convert;
pub mod types;

pub use convert::{to_legacy_list, to_legacy_single};
pub use types::{
    GetRequest, LegacyAction, LegacyListResponse, LegacySingleResponse, SendRequest,
    SendResponse, TextRequest,
};
