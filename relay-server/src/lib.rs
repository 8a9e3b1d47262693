//! # relay-server
//!
//! Discovery token relay for nearby-relay.
//!
//! Two phones that want to range against each other must swap opaque
//! discovery tokens before they share any network link. This crate runs the
//! rendezvous point:
//! - Stores a submitted token under a short random numeric code
//! - Returns the token to whoever presents the code
//! - Never inspects token contents
//!
//! ## Architecture
//!
//! ```text
//! Phone A ──POST /──────┐            ┌────GET /{code}── Phone B
//!                       ▼            ▼
//!        ┌──────────────────────────────────┐
//!        │           relay-server           │
//!        │  ┌────────────────────────────┐  │
//!        │  │ SQLite (code, token, time) │  │
//!        │  └────────────────────────────┘  │
//!        └──────────────────────────────────┘
//! ```
//!
//! ## Endpoints
//!
//! - `POST /` with `{"token": "..."}` → `{id, token, success}`
//! - `GET /{code}` → `{id, token, success}`
//! - `GET /health`, `GET /metrics`
//! - anything else → plain text greeting

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleanup;
pub mod config;
pub mod error;
pub mod http;
pub mod limits;
pub mod server;
pub mod storage;

pub use server::TokenRelay;
