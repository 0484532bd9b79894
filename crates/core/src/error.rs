//! Error types for the CBC Tutor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all CBC Tutor operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Curriculum errors ---
    #[error("Curriculum error: {0}")]
    Curriculum(#[from] CurriculumError),

    // --- External generation service errors ---
    #[error("Generation service error: {0}")]
    Provider(#[from] ProviderError),

    // --- Generic ---
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Invalid curriculum selections.
///
/// A correctly constrained selector never produces these; callers should
/// fail fast rather than recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurriculumError {
    #[error("Invalid grade '{0}': expected Grade 1 through Grade 9")]
    InvalidGrade(String),

    #[error("Invalid role '{0}': expected 'teacher' or 'student'")]
    InvalidRole(String),

    #[error("Subject '{subject}' is not offered in {tier}")]
    SubjectNotInTier { subject: String, tier: String },
}

/// Failures of the external text-generation service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {message} (status: {status_code})")]
    AuthenticationFailed { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. }
            | Self::AuthenticationFailed { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Whether the failure happened on the wire (connect, read, or deadline).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
