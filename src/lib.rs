//! Read-later protocol translation proxy.
//!
//! Serves the legacy Pocket v3 endpoints and forwards each call to the
//! Omnivore GraphQL API, converting payloads between the two schemas.
//!
//! # Architecture Overview
//!
//! ```text
//!     Legacy client                ┌──────────────────────────────────────────────┐
//!     ─────────────────────────────┼─▶ http (charset repair, request ID, trace)   │
//!                                  │       │                                      │
//!                                  │       ▼                                      │
//!                                  │   handlers ──▶ session cache ──▶ backend ────┼──▶ GraphQL API
//!                                  │       │          (1 per credential)  client   │
//!                                  │       ▼                                      │
//!     ◀────────────────────────────┼── pocket::convert (backend → legacy shape)   │
//!                                  │                                              │
//!                                  │   config · observability · lifecycle         │
//!                                  └──────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pocket;
pub mod session;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
