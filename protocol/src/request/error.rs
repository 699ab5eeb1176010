//! Errors raised while building a request.
//!
//! These are caller mistakes. They happen before any response is looked
//! at, they never depend on the network, and retrying won't fix them.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Both the singular and the plural form of a field were set.
    #[error("conflicting request: both `{singular}` and `{plural}` are set")]
    ConflictingRequest {
        singular: &'static str,
        plural: &'static str,
    },

    /// The request asks for nothing at all.
    #[error("empty request: at least one claim, auth or signature is required")]
    EmptyRequest,

    /// A request item is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
