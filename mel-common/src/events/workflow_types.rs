//! Supporting enums for workflow events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Analysis mode understood by the Remote API `analyze` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentMode {
    /// Popularity ("popcorn") score
    Score,
    /// Long-form synopsis with ending
    Synopsis,
    /// Four-group composition breakdown
    Composition,
}

impl EnrichmentMode {
    /// Wire value for the `mode` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentMode::Score => "score",
            EnrichmentMode::Synopsis => "synopsis",
            EnrichmentMode::Composition => "composition",
        }
    }
}

impl fmt::Display for EnrichmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an enrichment request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    /// A payload was stored
    Succeeded,
    /// Every attempt failed; the result stays absent
    Exhausted,
}
