//! Core error types for xprofile-options.
//!
//! [`XProfileError`] covers request-boundary failures (authorization, CSRF,
//! unresolved fields, invalid input), store failures, and configuration
//! problems. Every variant maps to an HTTP status via
//! [`XProfileError::status_code`].

use thiserror::Error;

/// The primary error type for xprofile-options.
#[derive(Error, Debug)]
pub enum XProfileError {
    // ── Request boundary ─────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The caller is not authenticated or lacks the required capability.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The form nonce is missing, malformed, expired, or scoped to another action.
    #[error("CSRF verification failed: {0}")]
    CsrfInvalid(String),

    // ── Append operation ─────────────────────────────────────────────

    /// The selected field identifier does not resolve to a field.
    #[error("Field not found: {0}")]
    FieldNotFound(i64),

    /// The field exists but its type does not take choice options.
    #[error("Field {id} has type '{field_type}', which does not accept options")]
    FieldNotChoice {
        /// The field identifier.
        id: i64,
        /// The field's type tag.
        field_type: String,
    },

    /// The submitted text contained no option lines.
    #[error("No options were submitted")]
    EmptyOptions,

    /// The submitted input is otherwise invalid (e.g. too many lines).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A single option insert failed.
    #[error("Failed to write option on line {line}: {message}")]
    StoreWriteFailure {
        /// 1-based position of the line within the submitted batch.
        line: usize,
        /// The underlying store error.
        message: String,
    },

    // ── Store ────────────────────────────────────────────────────────

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The database could not be opened or configured.
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl XProfileError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `EmptyOptions`, `ValidationError` -> 400
    /// - `Unauthorized`, `CsrfInvalid` -> 403
    /// - `FieldNotFound` -> 404
    /// - `FieldNotChoice` -> 422
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::EmptyOptions | Self::ValidationError(_) => 400,
            Self::Unauthorized(_) | Self::CsrfInvalid(_) => 403,
            Self::FieldNotFound(_) => 404,
            Self::FieldNotChoice { .. } => 422,
            Self::StoreWriteFailure { .. }
            | Self::DatabaseError(_)
            | Self::OperationalError(_)
            | Self::ConfigurationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` for errors caused by what the user submitted rather
    /// than by the store or the configuration.
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// A convenience type alias for `Result<T, XProfileError>`.
pub type XProfileResult<T> = Result<T, XProfileError>;
