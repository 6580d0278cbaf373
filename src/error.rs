//! Error types for the Gizi engine

use thiserror::Error;

use crate::types::MealSlot;

/// Errors that can occur during a nutrition calculation
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Food reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("No item at index {index} in {slot}")]
    ItemNotFound { slot: MealSlot, index: usize },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl EngineError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }
}
