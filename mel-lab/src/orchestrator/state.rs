//! Observable workflow state
//!
//! `WorkflowState` is what presentation collaborators read. It is only ever
//! mutated by the orchestrator while holding its write lock.

use crate::api::Analysis;
use crate::models::{CandidatePage, Composition, PopularityScore, Subject, SubjectKey, Synopsis};
use crate::view::TabScrollMemory;
use mel_common::EnrichmentMode;

/// Fixed user-facing message for every resolve failure
pub const NOT_FOUND_MESSAGE: &str = "Subject not found in the database.";

/// Outcome of the latest resolve
///
/// A candidate page and a subject can never be held at the same time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resolution {
    #[default]
    Empty,
    Candidates(CandidatePage),
    Subject(Box<Subject>),
}

impl Resolution {
    pub fn subject(&self) -> Option<&Subject> {
        match self {
            Resolution::Subject(subject) => Some(&**subject),
            _ => None,
        }
    }

    pub fn candidates(&self) -> Option<&CandidatePage> {
        match self {
            Resolution::Candidates(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Resolution::Empty)
    }
}

/// Lifecycle of one enrichment result for the current subject
///
/// `Ready` includes sentinel answers such as an unavailable popularity
/// score; `Exhausted` means every attempt failed and nothing was stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Idle,
    Loading,
    Ready(T),
    Exhausted,
}

impl<T> Default for Enrichment<T> {
    fn default() -> Self {
        Enrichment::Idle
    }
}

impl<T> Enrichment<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Enrichment::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Enrichment::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Enrichment::Exhausted)
    }
}

/// Two-step confirmation gate in front of the synopsis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynopsisGate {
    #[default]
    Closed,
    /// Step one done, waiting for confirmation
    Armed,
}

/// Everything the presentation layer may render
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowState {
    pub query: String,
    pub resolution: Resolution,
    /// A title resolve is in flight
    pub searching: bool,
    /// An id resolve (subject selection) is in flight
    pub loading_subject: bool,
    /// User-visible resolve failure
    pub error: Option<String>,
    pub popularity: Enrichment<PopularityScore>,
    pub composition: Enrichment<Composition>,
    pub synopsis: Enrichment<Synopsis>,
    pub synopsis_gate: SynopsisGate,
    /// Season chosen for a series synopsis
    pub selected_season: Option<String>,
    pub view: TabScrollMemory,
}

impl WorkflowState {
    pub fn subject(&self) -> Option<&Subject> {
        self.resolution.subject()
    }

    pub fn candidates(&self) -> Option<&CandidatePage> {
        self.resolution.candidates()
    }

    pub fn subject_key(&self) -> Option<SubjectKey> {
        self.subject().map(Subject::key)
    }

    /// Any resolve or enrichment outstanding
    pub fn is_busy(&self) -> bool {
        self.searching
            || self.loading_subject
            || self.popularity.is_loading()
            || self.composition.is_loading()
            || self.synopsis.is_loading()
    }

    pub fn is_loading(&self, mode: EnrichmentMode) -> bool {
        match mode {
            EnrichmentMode::Score => self.popularity.is_loading(),
            EnrichmentMode::Composition => self.composition.is_loading(),
            EnrichmentMode::Synopsis => self.synopsis.is_loading(),
        }
    }

    pub(crate) fn clear_enrichments(&mut self) {
        self.popularity = Enrichment::Idle;
        self.composition = Enrichment::Idle;
        self.synopsis = Enrichment::Idle;
        self.synopsis_gate = SynopsisGate::Closed;
        self.selected_season = None;
    }

    pub(crate) fn mark_loading(&mut self, mode: EnrichmentMode) {
        match mode {
            EnrichmentMode::Score => self.popularity = Enrichment::Loading,
            EnrichmentMode::Composition => self.composition = Enrichment::Loading,
            EnrichmentMode::Synopsis => self.synopsis = Enrichment::Loading,
        }
    }

    pub(crate) fn mark_exhausted(&mut self, mode: EnrichmentMode) {
        match mode {
            EnrichmentMode::Score => self.popularity = Enrichment::Exhausted,
            EnrichmentMode::Composition => self.composition = Enrichment::Exhausted,
            EnrichmentMode::Synopsis => self.synopsis = Enrichment::Exhausted,
        }
    }

    pub(crate) fn store(&mut self, analysis: Analysis) {
        match analysis {
            Analysis::Score(score) => self.popularity = Enrichment::Ready(score),
            Analysis::Composition(composition) => self.composition = Enrichment::Ready(composition),
            Analysis::Synopsis(synopsis) => self.synopsis = Enrichment::Ready(synopsis),
        }
    }
}
