//! Test Helper Utilities
//!
//! Shared utilities for testing mel-lab

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_api;

pub use fixtures::*;
pub use mock_api::{Call, ScriptedApi};

use mel_lab::{Orchestrator, RetryPolicy};
use std::sync::Arc;

/// Orchestrator over a fresh scripted backend with the default retry policy
pub fn orchestrator_with(api: &Arc<ScriptedApi>) -> Orchestrator {
    Orchestrator::new(api.clone(), RetryPolicy::default())
}
