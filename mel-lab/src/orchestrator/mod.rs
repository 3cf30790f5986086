//! Search → disambiguate → select → enrich workflow
//!
//! The [`Orchestrator`] owns the only copy of [`WorkflowState`]. Handlers
//! mutate state synchronously under the write lock, then hand network work to
//! tracked tokio tasks and return their join handles immediately.
//!
//! Every resolve, selection and reset bumps a generation counter. Tasks carry
//! the generation they were dispatched under and drop their response without
//! touching state if it no longer matches (last dispatch wins).

mod enrichment;
mod state;

pub use state::{Enrichment, Resolution, SynopsisGate, WorkflowState, NOT_FOUND_MESSAGE};

use chrono::Utc;
use crate::api::{RemoteApi, ResolveRequest, ResolveResponse};
use crate::error::{LabError, LabResult};
use crate::models::{SubjectId, SubjectKey, SubjectKind, SubjectRef};
use crate::retry::RetryPolicy;
use crate::view::ViewTab;
use mel_common::events::{EventBus, WorkflowEvent};
use mel_common::EnrichmentMode;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default event channel capacity
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Inner {
    state: WorkflowState,
    generation: u64,
}

struct Shared {
    api: Arc<dyn RemoteApi>,
    policy: RetryPolicy,
    events: EventBus,
    session_id: Uuid,
    tracker: TaskTracker,
    inner: RwLock<Inner>,
}

/// Workflow orchestrator handle (cheap to clone)
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn RemoteApi>, policy: RetryPolicy) -> Self {
        Self::with_event_bus(api, policy, EventBus::new(EVENT_CHANNEL_CAPACITY))
    }

    pub fn with_event_bus(api: Arc<dyn RemoteApi>, policy: RetryPolicy, events: EventBus) -> Self {
        let session_id = Uuid::new_v4();
        debug!(session_id = %session_id, ?policy, "Creating orchestrator");

        Self {
            shared: Arc::new(Shared {
                api,
                policy,
                events,
                session_id,
                tracker: TaskTracker::new(),
                inner: RwLock::new(Inner {
                    state: WorkflowState::default(),
                    generation: 0,
                }),
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    pub fn policy(&self) -> RetryPolicy {
        self.shared.policy
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> WorkflowState {
        self.shared.inner.read().await.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.shared.events.subscribe()
    }

    /// Wait until every dispatched task (including retries) has finished
    pub async fn wait_idle(&self) {
        self.shared.tracker.close();
        self.shared.tracker.wait().await;
        self.shared.tracker.reopen();
    }

    /// Store the search box text
    pub async fn set_query(&self, text: &str) {
        self.shared.inner.write().await.state.query = text.to_string();
    }

    /// Resolve a title query to candidates or a subject
    ///
    /// Clears the previous resolution, every enrichment and the error before
    /// dispatching. On a single-record answer popularity and composition are
    /// requested immediately; synopsis stays behind its confirmation gate.
    pub async fn resolve(&self, query: &str, page: u32) -> LabResult<JoinHandle<()>> {
        let title = query.trim();
        if title.is_empty() {
            return Err(LabError::InvalidInput("query must not be empty".to_string()));
        }
        if page == 0 {
            return Err(LabError::InvalidInput("page numbers start at 1".to_string()));
        }

        let generation = {
            let mut inner = self.shared.inner.write().await;
            inner.generation += 1;
            let state = &mut inner.state;
            state.query = query.to_string();
            state.resolution = Resolution::Empty;
            state.clear_enrichments();
            state.error = None;
            state.searching = true;
            state.loading_subject = false;
            inner.generation
        };

        info!(query = %title, page, generation, "Resolving title");
        self.shared.events.emit_lossy(WorkflowEvent::ResolveStarted {
            session_id: self.shared.session_id,
            generation,
            query: Some(title.to_string()),
            page,
            timestamp: Utc::now(),
        });

        let request = ResolveRequest::Title {
            title: title.to_string(),
            page,
        };
        let this = self.clone();
        Ok(self
            .shared
            .tracker
            .spawn(async move { this.run_resolve(generation, request).await }))
    }

    /// Load a subject by id (candidate pick or cross-reference link)
    pub async fn select_subject(
        &self,
        id: SubjectId,
        kind: SubjectKind,
    ) -> LabResult<JoinHandle<()>> {
        let generation = {
            let mut inner = self.shared.inner.write().await;
            inner.generation += 1;
            let state = &mut inner.state;
            state.resolution = Resolution::Empty;
            state.clear_enrichments();
            state.error = None;
            state.searching = false;
            state.loading_subject = true;
            inner.generation
        };

        info!(id = %id, kind = %kind, generation, "Selecting subject");
        self.shared.events.emit_lossy(WorkflowEvent::ResolveStarted {
            session_id: self.shared.session_id,
            generation,
            query: None,
            page: 1,
            timestamp: Utc::now(),
        });

        let this = self.clone();
        let request = ResolveRequest::Id { id, kind };
        Ok(self
            .shared
            .tracker
            .spawn(async move { this.run_resolve(generation, request).await }))
    }

    /// Follow a recommendation or collection link
    ///
    /// Season entries only name parts of a series and cannot be selected.
    pub async fn select_reference(&self, reference: &SubjectRef) -> LabResult<JoinHandle<()>> {
        let kind = reference.kind.subject_kind().ok_or_else(|| {
            LabError::InvalidInput(format!("'{}' is a season, not a subject", reference.title))
        })?;
        self.select_subject(reference.id, kind).await
    }

    /// Request another page of the displayed candidate list
    pub async fn change_page(&self, new_page: u32) -> LabResult<JoinHandle<()>> {
        let query = {
            let inner = self.shared.inner.read().await;
            let page = inner.state.candidates().ok_or_else(|| {
                LabError::InvalidState("no candidate list is displayed".to_string())
            })?;
            if !page.contains_page(new_page) {
                return Err(LabError::InvalidInput(format!(
                    "page {} outside 1..={}",
                    new_page, page.total_pages
                )));
            }
            inner.state.query.clone()
        };

        self.resolve(&query, new_page).await
    }

    /// Clear everything back to the initial state
    pub async fn reset(&self) {
        let generation = {
            let mut inner = self.shared.inner.write().await;
            inner.generation += 1;
            inner.state = WorkflowState::default();
            inner.generation
        };

        info!(generation, "Workflow reset");
        self.shared.events.emit_lossy(WorkflowEvent::WorkflowReset {
            session_id: self.shared.session_id,
            generation,
            timestamp: Utc::now(),
        });
    }

    /// Re-request the popularity score for the current subject
    ///
    /// Returns `Ok(None)` when a popularity request is already in flight.
    pub async fn refresh_popularity(&self) -> LabResult<Option<JoinHandle<()>>> {
        self.refresh(EnrichmentMode::Score).await
    }

    /// Re-request the composition breakdown for the current subject
    pub async fn refresh_composition(&self) -> LabResult<Option<JoinHandle<()>>> {
        self.refresh(EnrichmentMode::Composition).await
    }

    async fn refresh(&self, mode: EnrichmentMode) -> LabResult<Option<JoinHandle<()>>> {
        let mut inner = self.shared.inner.write().await;
        let key = inner
            .state
            .subject_key()
            .ok_or_else(|| LabError::InvalidState("no subject selected".to_string()))?;

        if inner.state.is_loading(mode) {
            debug!(id = %key.id, mode = %mode, "Enrichment already loading, ignoring re-trigger");
            return Ok(None);
        }

        let generation = inner.generation;
        inner.state.mark_loading(mode);
        drop(inner);

        Ok(Some(self.spawn_enrichment(generation, key, mode, None)))
    }

    /// Choose the season a series synopsis is requested for
    ///
    /// Changing the season disarms the gate and drops a synopsis fetched for
    /// the previous choice.
    pub async fn select_season(&self, season: Option<String>) -> LabResult<()> {
        let mut inner = self.shared.inner.write().await;
        let state = &mut inner.state;
        let subject = state
            .subject()
            .ok_or_else(|| LabError::InvalidState("no subject selected".to_string()))?;

        if let Some(title) = &season {
            if subject.kind != SubjectKind::Series {
                return Err(LabError::InvalidInput("seasons only apply to series".to_string()));
            }
            let manifest = subject.season_titles();
            if !manifest.is_empty() && !manifest.iter().any(|s| s == title) {
                let message = format!("'{}' is not in the season manifest", title);
                return Err(LabError::InvalidInput(message));
            }
        }
        if state.synopsis.is_loading() {
            return Err(LabError::InvalidState("synopsis request in flight".to_string()));
        }

        if state.selected_season != season {
            state.selected_season = season;
            state.synopsis = Enrichment::Idle;
            state.synopsis_gate = SynopsisGate::Closed;
        }
        Ok(())
    }

    /// First step of the synopsis gate
    pub async fn request_synopsis(&self) -> LabResult<()> {
        let mut inner = self.shared.inner.write().await;
        let state = &mut inner.state;
        let subject = state
            .subject()
            .ok_or_else(|| LabError::InvalidState("no subject selected".to_string()))?;

        if subject.kind == SubjectKind::Series && state.selected_season.is_none() {
            let message = "select a season before requesting a series synopsis";
            return Err(LabError::InvalidState(message.to_string()));
        }
        if state.synopsis.is_loading() {
            return Err(LabError::InvalidState("synopsis request in flight".to_string()));
        }

        state.synopsis_gate = SynopsisGate::Armed;
        Ok(())
    }

    /// Second step of the synopsis gate: dispatch the request
    pub async fn confirm_synopsis(&self) -> LabResult<JoinHandle<()>> {
        let mut inner = self.shared.inner.write().await;
        if inner.state.synopsis_gate != SynopsisGate::Armed {
            return Err(LabError::InvalidState("synopsis request was not armed".to_string()));
        }
        let key = inner
            .state
            .subject_key()
            .ok_or_else(|| LabError::InvalidState("no subject selected".to_string()))?;

        let season = match key.kind {
            SubjectKind::Series => inner.state.selected_season.clone(),
            SubjectKind::Movie => None,
        };
        let generation = inner.generation;
        inner.state.synopsis_gate = SynopsisGate::Closed;
        inner.state.mark_loading(EnrichmentMode::Synopsis);
        drop(inner);

        Ok(self.spawn_enrichment(generation, key, EnrichmentMode::Synopsis, season))
    }

    pub async fn cancel_synopsis(&self) {
        self.shared.inner.write().await.state.synopsis_gate = SynopsisGate::Closed;
    }

    /// Activate `tab`, saving `current_offset` for the tab being left
    ///
    /// Returns the scroll offset to restore for `tab`.
    pub async fn switch_tab(&self, tab: ViewTab, current_offset: u32) -> u32 {
        let (from, restored) = {
            let mut inner = self.shared.inner.write().await;
            let from = inner.state.view.active();
            (from, inner.state.view.switch(tab, current_offset))
        };

        debug!(from = %from, to = %tab, restored, "Tab switched");
        self.shared.events.emit_lossy(WorkflowEvent::TabChanged {
            session_id: self.shared.session_id,
            from: from.to_string(),
            to: tab.to_string(),
            restored_offset: restored,
            timestamp: Utc::now(),
        });
        restored
    }

    async fn run_resolve(&self, generation: u64, request: ResolveRequest) {
        let result = self.shared.api.resolve(&request).await;

        let mut inner = self.shared.inner.write().await;
        if inner.generation != generation {
            let current_generation = inner.generation;
            drop(inner);
            self.discard_stale(generation, current_generation, "resolve");
            return;
        }

        inner.state.searching = false;
        inner.state.loading_subject = false;

        let session_id = self.shared.session_id;
        match result {
            Ok(ResolveResponse::Ambiguous(page)) if !page.is_empty() => {
                info!(
                    count = page.candidates.len(),
                    page = page.page,
                    total_pages = page.total_pages,
                    "Resolve ambiguous"
                );
                let event = WorkflowEvent::CandidatesReady {
                    session_id,
                    generation,
                    count: page.candidates.len(),
                    page: page.page,
                    total_pages: page.total_pages,
                    timestamp: Utc::now(),
                };
                inner.state.resolution = Resolution::Candidates(page);
                drop(inner);
                self.shared.events.emit_lossy(event);
            }
            Ok(ResolveResponse::Resolved(subject)) => {
                let key = subject.key();
                info!(id = %key.id, kind = %key.kind, title = %subject.title, "Subject resolved");
                let event = WorkflowEvent::SubjectReady {
                    session_id,
                    generation,
                    subject_id: key.id.0,
                    kind: key.kind.as_wire().to_string(),
                    title: subject.title.clone(),
                    timestamp: Utc::now(),
                };
                inner.state.resolution = Resolution::Subject(subject);
                inner.state.mark_loading(EnrichmentMode::Score);
                inner.state.mark_loading(EnrichmentMode::Composition);
                drop(inner);

                self.shared.events.emit_lossy(event);
                self.spawn_enrichment(generation, key, EnrichmentMode::Score, None);
                self.spawn_enrichment(generation, key, EnrichmentMode::Composition, None);
            }
            failed => {
                let reason = match failed {
                    Err(e) => e.to_string(),
                    Ok(_) => "empty candidate list".to_string(),
                };
                inner.state.resolution = Resolution::Empty;
                inner.state.error = Some(NOT_FOUND_MESSAGE.to_string());
                drop(inner);

                warn!(generation, reason = %reason, "Resolve failed");
                self.shared.events.emit_lossy(WorkflowEvent::ResolveFailed {
                    session_id,
                    generation,
                    reason,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn discard_stale(&self, generation: u64, current_generation: u64, origin: &str) {
        debug!(generation, current_generation, origin, "Discarding stale response");
        self.shared.events.emit_lossy(WorkflowEvent::StaleResponseDiscarded {
            session_id: self.shared.session_id,
            generation,
            current_generation,
            origin: origin.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Whether `key` is still the subject of generation `generation`
    async fn is_current(&self, generation: u64, key: SubjectKey) -> Result<(), u64> {
        let inner = self.shared.inner.read().await;
        if inner.generation == generation && inner.state.subject_key() == Some(key) {
            Ok(())
        } else {
            Err(inner.generation)
        }
    }
}
