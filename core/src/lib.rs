//! API client core for the school portal backend.
//!
//! # Overview
//! Covers the chat bot and user-management endpoints: the current user, the
//! user list, a teacher's students, automatic student assignment and user
//! updates.
//!
//! # Design
//! - `PortalClient` is stateless and does no I/O. Each endpoint is split into
//!   `build_*` (produces request) and `parse_*` (consumes response).
//! - `PortalApi` is the async facade: build, execute through a `Transport`,
//!   parse. `ReqwestTransport` attaches the session cookie to every request
//!   marked `Credentials::Include`.
//! - Records stay as JSON values; only the fields used for error detection are
//!   checked.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::PortalApi;
pub use client::PortalClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{AssignmentSummary, ChatMessage, UserCode, UserRecord, UserUpdate};
