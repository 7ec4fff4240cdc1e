//! Common error handling utilities and conventions

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types that can be shared across crates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid session id: {value}")]
    InvalidSessionId { value: String },
}

impl CoreError {
    /// Create an invalid session id error
    pub fn invalid_session_id(value: impl Into<String>) -> Self {
        Self::InvalidSessionId {
            value: value.into(),
        }
    }
}
