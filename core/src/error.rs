//! Error types for the todo API client.
//!
//! # Design
//! The two statuses the server uses for caller mistakes get their own
//! variants: 404 becomes `NotFound`, 400 becomes `Validation` carrying the
//! server's `{"error": ...}` message. Anything else unexpected lands in
//! `Http` with the raw status and body.

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404: the todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 400 and explained why.
    #[error("rejected by server: {0}")]
    Validation(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}
