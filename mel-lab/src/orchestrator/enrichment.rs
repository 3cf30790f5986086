//! Enrichment task: one analyze request driven through the retry policy

use super::Orchestrator;
use chrono::Utc;
use crate::api::{Analysis, AnalyzeRequest, ApiError};
use crate::models::SubjectKey;
use crate::retry::RetryStep;
use mel_common::events::{TerminalOutcome, WorkflowEvent};
use mel_common::EnrichmentMode;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

impl Orchestrator {
    /// Spawn the retry loop for one enrichment
    ///
    /// The caller must already have marked `mode` as loading for `key`.
    pub(super) fn spawn_enrichment(
        &self,
        generation: u64,
        key: SubjectKey,
        mode: EnrichmentMode,
        season: Option<String>,
    ) -> JoinHandle<()> {
        self.shared.events.emit_lossy(WorkflowEvent::EnrichmentStarted {
            session_id: self.shared.session_id,
            subject_id: key.id.0,
            mode,
            timestamp: Utc::now(),
        });

        let request = AnalyzeRequest::new(key, mode).with_season(season);
        let this = self.clone();
        self.shared
            .tracker
            .spawn(async move { this.run_enrichment(generation, request).await })
    }

    async fn run_enrichment(&self, generation: u64, request: AnalyzeRequest) {
        let key = request.subject;
        let mode = request.mode;
        let mut retry = self.shared.policy.start::<ApiError>();

        loop {
            if let Err(current) = self.is_current(generation, key).await {
                self.discard_stale(generation, current, mode.as_str());
                return;
            }

            debug!(
                id = %key.id,
                mode = %mode,
                attempt = retry.next_attempt(),
                "Requesting analysis"
            );
            let outcome = self
                .shared
                .api
                .analyze(&request)
                .await
                .and_then(|analysis| expect_mode(mode, analysis));

            match retry.record(outcome) {
                RetryStep::Finished(analysis) => {
                    let mut inner = self.shared.inner.write().await;
                    if inner.generation != generation || inner.state.subject_key() != Some(key) {
                        let current = inner.generation;
                        drop(inner);
                        self.discard_stale(generation, current, mode.as_str());
                        return;
                    }
                    inner.state.store(analysis);
                    drop(inner);

                    info!(
                        id = %key.id,
                        mode = %mode,
                        attempts = retry.attempts(),
                        "Enrichment stored"
                    );
                    self.finish(key, mode, TerminalOutcome::Succeeded, retry.attempts());
                    return;
                }
                RetryStep::RetryAfter(delay) => {
                    let reason = retry
                        .last_error()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    debug!(
                        id = %key.id,
                        mode = %mode,
                        attempt = retry.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "Analysis attempt failed, retrying"
                    );
                    self.shared.events.emit_lossy(WorkflowEvent::EnrichmentRetryScheduled {
                        session_id: self.shared.session_id,
                        subject_id: key.id.0,
                        mode,
                        attempt: retry.attempts(),
                        delay_ms: delay.as_millis() as u64,
                        reason,
                        timestamp: Utc::now(),
                    });
                    tokio::time::sleep(delay).await;
                }
                RetryStep::Exhausted(err) => {
                    let mut inner = self.shared.inner.write().await;
                    if inner.generation != generation || inner.state.subject_key() != Some(key) {
                        let current = inner.generation;
                        drop(inner);
                        self.discard_stale(generation, current, mode.as_str());
                        return;
                    }
                    inner.state.mark_exhausted(mode);
                    drop(inner);

                    warn!(
                        id = %key.id,
                        mode = %mode,
                        attempts = retry.attempts(),
                        error = %err,
                        "Enrichment exhausted"
                    );
                    self.finish(key, mode, TerminalOutcome::Exhausted, retry.attempts());
                    return;
                }
            }
        }
    }

    fn finish(
        &self,
        key: SubjectKey,
        mode: EnrichmentMode,
        outcome: TerminalOutcome,
        attempts: u32,
    ) {
        self.shared.events.emit_lossy(WorkflowEvent::EnrichmentFinished {
            session_id: self.shared.session_id,
            subject_id: key.id.0,
            mode,
            outcome,
            attempts,
            timestamp: Utc::now(),
        });
    }
}

/// A payload for another mode counts as a failed attempt
fn expect_mode(mode: EnrichmentMode, analysis: Analysis) -> Result<Analysis, ApiError> {
    if analysis.mode() == mode {
        Ok(analysis)
    } else {
        Err(ApiError::Contract(format!(
            "expected {} payload, got {}",
            mode,
            analysis.mode()
        )))
    }
}
