//! Error types for mel-lab

use thiserror::Error;

/// Orchestrator and front-end error type
///
/// Handler errors are rejected requests; they never modify workflow state.
/// Resolve and enrichment failures are recorded in the state instead.
#[derive(Debug, Error)]
pub enum LabError {
    /// Handler called with an argument outside its domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Handler not valid for the current workflow state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for orchestrator handlers
pub type LabResult<T> = Result<T, LabError>;
