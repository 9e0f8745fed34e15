//! Domain-level error type shared by all crates.

/// Errors produced by domain logic, independent of any transport.
///
/// The api crate maps each variant onto an HTTP status and a machine-readable
/// error code; nothing here knows about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup failed.
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// A request failed field-level validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write conflicted with existing state (e.g. duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An operation was attempted against a record not in the expected
    /// state (e.g. completing an already-completed workout draft).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}
