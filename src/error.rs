//! Engine error taxonomy.
//!
//! Every engine converts any failure inside its own resolve/fit/predict path
//! into an `EngineError` and returns it as a value. Errors never cross the
//! engine boundary as panics; the server and the orchestrator render them as
//! `{"error": "<message>"}` payloads.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Required fields are missing or columns are incompatible.
    #[error("{0}")]
    Validation(String),

    /// No inline payload and no dataset file at any fallback location.
    /// Carries the last attempted path.
    #[error("Dataset not found at {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// Every row was filtered out, or the data carries no signal to model.
    #[error("{0}")]
    EmptyDataset(String),

    /// The fitting step itself failed (non-convergence, degenerate input).
    #[error("{0}")]
    Model(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn empty(msg: impl Into<String>) -> Self {
        EngineError::EmptyDataset(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        EngineError::Model(msg.into())
    }
}
