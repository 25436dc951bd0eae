//! Library error type.
//!
//! Pure scoring never fails; only the confidence tracker and the stores behind it return
//! [`MemoryError`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, Error)]
pub enum MemoryError {
    /// The target record id does not exist in the store.
    #[error("memory not found: {0}")]
    NotFound(String),

    /// A direct promotion was requested for a record below the promotion thresholds.
    #[error(
        "memory {id} is not eligible for promotion: confidence {confidence:.2} (requires \
         {required_confidence:.2}), validations {validation_count} (requires {required_validations})"
    )]
    IneligiblePromotion {
        id: String,
        confidence: f64,
        required_confidence: f64,
        validation_count: u32,
        required_validations: u32,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("record lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for MemoryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
