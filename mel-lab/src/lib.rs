//! mel-lab library interface
//!
//! Client-side orchestration for the Movie Evaluation Lab: resolve a title or
//! id through the Remote API, disambiguate, then enrich the selected subject
//! with independently retried analyses.

pub mod api;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod retry;
pub mod view;

pub use crate::error::{LabError, LabResult};
pub use crate::orchestrator::{Enrichment, Orchestrator, Resolution, WorkflowState};
pub use crate::retry::RetryPolicy;

/// Build identification captured by build.rs
pub struct BuildInfo;

impl BuildInfo {
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
    pub const GIT_HASH: &'static str = env!("GIT_HASH");
    pub const BUILD_TIMESTAMP: &'static str = env!("BUILD_TIMESTAMP");
    pub const BUILD_PROFILE: &'static str = env!("BUILD_PROFILE");
}
