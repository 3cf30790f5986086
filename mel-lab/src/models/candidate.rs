//! Disambiguation candidates returned for ambiguous title queries

use super::subject::{SubjectId, SubjectKind};
use serde::{Deserialize, Serialize};

/// Lightweight subject summary shown in the candidate picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: SubjectId,
    #[serde(rename = "media_type", default = "default_kind")]
    pub kind: SubjectKind,
    pub title: String,
    /// Release year ("N/A" when unknown)
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub overview: String,
}

fn default_kind() -> SubjectKind {
    SubjectKind::Movie
}

/// One page of candidates plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePage {
    pub candidates: Vec<Candidate>,
    /// Current page (1-based)
    pub page: u32,
    pub total_pages: u32,
}

impl CandidatePage {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether `page` can be requested from this listing
    pub fn contains_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages.max(1)
    }
}
