//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID span, charset repair, metrics)
//!     → handlers.rs (validate body, resolve session, call backend)
//!     → pocket::convert (backend → legacy shape)
//!     → response.rs (failures → bare status codes)
//!     → Send to client
//! ```
//!
//! # Request States
//! ```text
//! Received → CredentialResolved → BackendInvoked → ResponseSent
//!                     └──────────────┴──────────→ ErrorReported (500)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
