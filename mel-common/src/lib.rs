//! # MEL Common Library
//!
//! Shared code for the Movie Evaluation Lab crates including:
//! - Error types
//! - Event types (WorkflowEvent enum) and the EventBus
//! - Bootstrap configuration loading and API URL resolution

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EnrichmentMode, EventBus, WorkflowEvent};
