//! Event types for the MEL event system
//!
//! Provides the shared `WorkflowEvent` definition and the EventBus used by the
//! orchestrator to announce state transitions to presentation collaborators.

mod workflow_types;

pub use workflow_types::{EnrichmentMode, TerminalOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Workflow event types
///
/// Every event carries the orchestrator session id so that several front-ends
/// sharing one bus can filter their own traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// A resolve (title search or id lookup) was dispatched
    ResolveStarted {
        session_id: Uuid,
        /// Dispatch generation (monotonic per session)
        generation: u64,
        /// Title query, or `None` for an id lookup
        query: Option<String>,
        /// Requested candidate page (1 for id lookups)
        page: u32,
        timestamp: DateTime<Utc>,
    },

    /// Resolve returned an ambiguous result
    CandidatesReady {
        session_id: Uuid,
        generation: u64,
        /// Number of candidates on this page
        count: usize,
        page: u32,
        total_pages: u32,
        timestamp: DateTime<Utc>,
    },

    /// Resolve returned a single subject record
    SubjectReady {
        session_id: Uuid,
        generation: u64,
        subject_id: u64,
        /// Wire kind ("movie" or "tv")
        kind: String,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Resolve failed; the user-facing error slot was set
    ResolveFailed {
        session_id: Uuid,
        generation: u64,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// An enrichment request was dispatched
    EnrichmentStarted {
        session_id: Uuid,
        subject_id: u64,
        mode: EnrichmentMode,
        timestamp: DateTime<Utc>,
    },

    /// One enrichment attempt failed and another is scheduled
    EnrichmentRetryScheduled {
        session_id: Uuid,
        subject_id: u64,
        mode: EnrichmentMode,
        /// Attempt number that failed (1-based)
        attempt: u32,
        delay_ms: u64,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// An enrichment request reached a terminal state
    EnrichmentFinished {
        session_id: Uuid,
        subject_id: u64,
        mode: EnrichmentMode,
        outcome: TerminalOutcome,
        /// Attempts used (1-based)
        attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived for a superseded dispatch and was dropped
    StaleResponseDiscarded {
        session_id: Uuid,
        /// Generation the response was dispatched under
        generation: u64,
        /// Generation current when it arrived
        current_generation: u64,
        /// What kind of response ("resolve", "score", ...)
        origin: String,
        timestamp: DateTime<Utc>,
    },

    /// Active display tab changed
    TabChanged {
        session_id: Uuid,
        from: String,
        to: String,
        restored_offset: u32,
        timestamp: DateTime<Utc>,
    },

    /// Workflow state cleared
    WorkflowReset {
        session_id: Uuid,
        generation: u64,
        timestamp: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            WorkflowEvent::ResolveStarted { .. } => "ResolveStarted",
            WorkflowEvent::CandidatesReady { .. } => "CandidatesReady",
            WorkflowEvent::SubjectReady { .. } => "SubjectReady",
            WorkflowEvent::ResolveFailed { .. } => "ResolveFailed",
            WorkflowEvent::EnrichmentStarted { .. } => "EnrichmentStarted",
            WorkflowEvent::EnrichmentRetryScheduled { .. } => "EnrichmentRetryScheduled",
            WorkflowEvent::EnrichmentFinished { .. } => "EnrichmentFinished",
            WorkflowEvent::StaleResponseDiscarded { .. } => "StaleResponseDiscarded",
            WorkflowEvent::TabChanged { .. } => "TabChanged",
            WorkflowEvent::WorkflowReset { .. } => "WorkflowReset",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            WorkflowEvent::ResolveStarted { session_id, .. }
            | WorkflowEvent::CandidatesReady { session_id, .. }
            | WorkflowEvent::SubjectReady { session_id, .. }
            | WorkflowEvent::ResolveFailed { session_id, .. }
            | WorkflowEvent::EnrichmentStarted { session_id, .. }
            | WorkflowEvent::EnrichmentRetryScheduled { session_id, .. }
            | WorkflowEvent::EnrichmentFinished { session_id, .. }
            | WorkflowEvent::StaleResponseDiscarded { session_id, .. }
            | WorkflowEvent::TabChanged { session_id, .. }
            | WorkflowEvent::WorkflowReset { session_id, .. } => *session_id,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking emit
/// - Multiple subscribers, each receiving every event emitted after it subscribed
/// - Slow subscribers lose the oldest events once `capacity` is exceeded
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WorkflowEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use mel_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WorkflowEvent,
    ) -> Result<usize, broadcast::error::SendError<WorkflowEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
