//! Enrichment retry, sentinel, gate and tab behavior of the orchestrator

mod helpers;

use helpers::*;
use mel_common::events::TerminalOutcome;
use mel_common::{EnrichmentMode, WorkflowEvent};
use mel_lab::api::{Analysis, ApiError, ResolveResponse};
use mel_lab::models::{PopcornScore, SubjectId, SubjectKind};
use mel_lab::orchestrator::SynopsisGate;
use mel_lab::view::ViewTab;
use mel_lab::{Enrichment, LabError, Orchestrator, RetryPolicy, WorkflowState};
use std::sync::Arc;
use std::time::Duration;

fn failure() -> Result<Analysis, ApiError> {
    Err(ApiError::Status(502, "bad gateway".to_string()))
}

async fn resolve_inception(api: &Arc<ScriptedApi>) -> Orchestrator {
    api.on_title("Inception", 1, Ok(resolved(inception())));
    let orchestrator = orchestrator_with(api);
    orchestrator.resolve("Inception", 1).await.unwrap().await.unwrap();
    orchestrator
}

#[tokio::test(start_paused = true)]
async fn test_fail_twice_then_succeed_keeps_loading_and_waits_one_second() {
    let api = Arc::new(ScriptedApi::new());
    api.on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Score,
        vec![failure(), failure(), Ok(score("91%", "4321"))],
    )
    .on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Composition,
        vec![Ok(Analysis::Composition(composition_value(1)))],
    );
    let orchestrator = resolve_inception(&api).await;
    let start = tokio::time::Instant::now();

    for check_ms in [500, 1500] {
        tokio::time::sleep_until(start + Duration::from_millis(check_ms)).await;
        let state = orchestrator.snapshot().await;
        assert!(state.popularity.is_loading(), "not loading at {}ms", check_ms);
        assert!(state.popularity.ready().is_none());
    }

    orchestrator.wait_idle().await;

    let times = api.attempt_times(EnrichmentMode::Score);
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_millis(1000));
    assert_eq!(times[2] - times[1], Duration::from_millis(1000));

    let state = orchestrator.snapshot().await;
    let stored = state.popularity.ready().expect("score stored");
    assert_eq!(stored.score, PopcornScore::Value("91%".to_string()));
    assert_eq!(stored.votes.as_deref(), Some("4321"));

    // Composition ran independently and finished on its first attempt
    assert_eq!(api.attempt_times(EnrichmentMode::Composition).len(), 1);
    assert_eq!(state.composition.ready(), Some(&composition_value(1)));
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_exhausts_silently() {
    let api = Arc::new(ScriptedApi::new());
    api.on_analyze(INCEPTION_ID, EnrichmentMode::Score, vec![failure()])
        .on_analyze(INCEPTION_ID, EnrichmentMode::Composition, vec![failure()]);
    let orchestrator = resolve_inception(&api).await;
    let mut events = orchestrator.subscribe();
    let error_before = orchestrator.snapshot().await.error;

    orchestrator.wait_idle().await;

    let state = orchestrator.snapshot().await;
    assert_eq!(api.attempt_times(EnrichmentMode::Score).len(), 3);
    assert_eq!(api.attempt_times(EnrichmentMode::Composition).len(), 3);
    assert_eq!(state.popularity, Enrichment::Exhausted);
    assert_eq!(state.composition, Enrichment::Exhausted);
    assert!(!state.is_busy());
    assert_eq!(state.error, error_before);
    assert!(state.subject().is_some());

    let mut exhausted = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let WorkflowEvent::EnrichmentFinished { mode, outcome, attempts, .. } = event {
            assert_eq!(outcome, TerminalOutcome::Exhausted);
            assert_eq!(attempts, 3);
            exhausted.push(mode);
        }
    }
    assert_eq!(exhausted.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_retry_delay_stops_before_next_attempt() {
    let api = Arc::new(ScriptedApi::new());
    api.on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Score,
        vec![failure(), Ok(score("95%", "1200"))],
    )
    .on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Composition,
        vec![Ok(Analysis::Composition(composition_value(5)))],
    );
    let orchestrator = resolve_inception(&api).await;
    let mut events = orchestrator.subscribe();

    // First score attempt fails at t=0, the next one is due at t=1000ms
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(orchestrator.snapshot().await.popularity.is_loading());
    orchestrator.reset().await;

    orchestrator.wait_idle().await;
    assert_eq!(api.attempt_times(EnrichmentMode::Score).len(), 1);
    assert_eq!(orchestrator.snapshot().await, WorkflowState::default());

    let mut stale = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let WorkflowEvent::StaleResponseDiscarded { origin, .. } = event {
            stale.push(origin);
        }
    }
    assert_eq!(stale, vec!["score".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_configured_policy_is_used() {
    let api = Arc::new(ScriptedApi::new());
    api.on_title("Inception", 1, Ok(resolved(inception())))
        .on_analyze(INCEPTION_ID, EnrichmentMode::Score, vec![failure()])
        .on_analyze(INCEPTION_ID, EnrichmentMode::Composition, vec![failure()]);
    let policy = RetryPolicy::new(2, Duration::from_millis(250));
    let orchestrator = Orchestrator::new(api.clone(), policy);

    orchestrator.resolve("Inception", 1).await.unwrap().await.unwrap();
    orchestrator.wait_idle().await;

    let times = api.attempt_times(EnrichmentMode::Score);
    assert_eq!(times.len(), 2);
    assert_eq!(times[1] - times[0], Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_composition_boundaries_stored_exactly() {
    let mut payload = composition_value(0);
    payload.emotional.glee = 100;
    payload.narrative.twist = 100;
    payload.content.substance = 100;
    payload.technical.immersion = 100;

    let api = Arc::new(ScriptedApi::new());
    api.on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Composition,
        vec![Ok(Analysis::Composition(payload))],
    );
    let orchestrator = resolve_inception(&api).await;
    orchestrator.wait_idle().await;

    assert_eq!(orchestrator.snapshot().await.composition.ready(), Some(&payload));
}

#[tokio::test(start_paused = true)]
async fn test_contract_violation_counts_as_failed_attempt() {
    let api = Arc::new(ScriptedApi::new());
    api.on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Composition,
        vec![
            Err(ApiError::Contract("metrics out of range".to_string())),
            Ok(Analysis::Composition(composition_value(100))),
        ],
    )
    .on_analyze(
        INCEPTION_ID,
        EnrichmentMode::Score,
        // Wrong payload shape for the mode, every time
        vec![Ok(synopsis("not a score"))],
    );
    let orchestrator = resolve_inception(&api).await;
    orchestrator.wait_idle().await;

    let state = orchestrator.snapshot().await;
    assert_eq!(api.attempt_times(EnrichmentMode::Composition).len(), 2);
    assert_eq!(state.composition.ready(), Some(&composition_value(100)));
    assert_eq!(api.attempt_times(EnrichmentMode::Score).len(), 3);
    assert_eq!(state.popularity, Enrichment::Exhausted);
}

#[tokio::test(start_paused = true)]
async fn test_not_available_score_is_success_and_refreshable() {
    let api = Arc::new(ScriptedApi::new());
    api.on_analyze(INCEPTION_ID, EnrichmentMode::Score, vec![Ok(score("N/A", "0"))]);
    let orchestrator = resolve_inception(&api).await;
    orchestrator.wait_idle().await;

    let state = orchestrator.snapshot().await;
    let stored = state.popularity.ready().expect("sentinel is a success");
    assert_eq!(stored.score, PopcornScore::NotAvailable);
    assert_eq!(
        serde_json::to_value(stored).unwrap(),
        serde_json::json!({"popcorn_score": "N/A", "popcorn_votes": "0"})
    );
    assert!(state.error.is_none());
    assert_eq!(api.attempt_times(EnrichmentMode::Score).len(), 1);

    let handle = orchestrator.refresh_popularity().await.unwrap().expect("dispatched");
    assert!(orchestrator.snapshot().await.popularity.is_loading());
    handle.await.unwrap();
    assert_eq!(api.attempt_times(EnrichmentMode::Score).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_while_loading_is_noop() {
    let api = Arc::new(ScriptedApi::new());
    api.on_analyze_delayed(
        INCEPTION_ID,
        EnrichmentMode::Composition,
        Duration::from_secs(2),
        vec![Ok(Analysis::Composition(composition_value(3)))],
    );
    let orchestrator = resolve_inception(&api).await;

    assert!(orchestrator.refresh_composition().await.unwrap().is_none());
    orchestrator.wait_idle().await;
    assert_eq!(api.attempt_times(EnrichmentMode::Composition).len(), 1);

    let fresh = orchestrator_with(&api);
    assert!(matches!(
        fresh.refresh_popularity().await,
        Err(LabError::InvalidState(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_series_synopsis_requires_season_and_confirmation() {
    let api = Arc::new(ScriptedApi::new());
    api.on_id(GOT_ID, Ok(resolved(game_of_thrones())))
        .on_analyze(GOT_ID, EnrichmentMode::Synopsis, vec![Ok(synopsis("Winter **is** coming."))]);
    let orchestrator = orchestrator_with(&api);
    orchestrator
        .select_subject(SubjectId(GOT_ID), SubjectKind::Series)
        .await
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(orchestrator.request_synopsis().await, Err(LabError::InvalidState(_))));
    assert!(matches!(orchestrator.confirm_synopsis().await, Err(LabError::InvalidState(_))));
    assert!(matches!(
        orchestrator.select_season(Some("Season 9".to_string())).await,
        Err(LabError::InvalidInput(_))
    ));

    orchestrator.select_season(Some("Season 2".to_string())).await.unwrap();
    orchestrator.request_synopsis().await.unwrap();
    assert_eq!(orchestrator.snapshot().await.synopsis_gate, SynopsisGate::Armed);

    orchestrator.cancel_synopsis().await;
    assert_eq!(orchestrator.snapshot().await.synopsis_gate, SynopsisGate::Closed);
    assert!(matches!(orchestrator.confirm_synopsis().await, Err(LabError::InvalidState(_))));

    orchestrator.request_synopsis().await.unwrap();
    orchestrator.confirm_synopsis().await.unwrap().await.unwrap();

    let synopsis_calls: Vec<_> = api
        .analyze_calls()
        .into_iter()
        .filter(|c| c.mode == EnrichmentMode::Synopsis)
        .collect();
    assert_eq!(synopsis_calls.len(), 1);
    assert_eq!(synopsis_calls[0].season.as_deref(), Some("Season 2"));
    assert!(synopsis_calls[0]
        .query_params()
        .contains(&("season", "Season 2".to_string())));

    let state = orchestrator.snapshot().await;
    assert_eq!(
        state.synopsis.ready().map(|s| s.full_plot.as_str()),
        Some("Winter **is** coming.")
    );
    assert_eq!(state.synopsis_gate, SynopsisGate::Closed);

    // A different season drops the previous synopsis
    orchestrator.select_season(Some("Season 1".to_string())).await.unwrap();
    assert_eq!(orchestrator.snapshot().await.synopsis, Enrichment::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_movie_rejects_season() {
    let api = Arc::new(ScriptedApi::new());
    let orchestrator = resolve_inception(&api).await;
    assert!(matches!(
        orchestrator.select_season(Some("Season 1".to_string())).await,
        Err(LabError::InvalidInput(_))
    ));
    orchestrator.select_season(None).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_tab_scroll_memory_and_reset() {
    let api = Arc::new(ScriptedApi::new());
    api.on_title("Batman", 1, Ok(ResolveResponse::Ambiguous(batman_page())));
    let orchestrator = orchestrator_with(&api);
    let mut events = orchestrator.subscribe();

    assert_eq!(orchestrator.switch_tab(ViewTab::CompositionReport, 120).await, 0);
    assert_eq!(orchestrator.switch_tab(ViewTab::PrimaryDetail, 30).await, 120);
    assert_eq!(orchestrator.snapshot().await.view.saved_offset(ViewTab::CompositionReport), 30);

    match events.recv().await.unwrap() {
        WorkflowEvent::TabChanged { from, to, restored_offset, .. } => {
            assert_eq!(from, "primary-detail");
            assert_eq!(to, "composition-report");
            assert_eq!(restored_offset, 0);
        }
        other => panic!("unexpected event {:?}", other),
    }

    orchestrator.resolve("Batman", 1).await.unwrap().await.unwrap();
    orchestrator.reset().await;

    let state = orchestrator.snapshot().await;
    assert_eq!(state.view.active(), ViewTab::PrimaryDetail);
    assert_eq!(state.view.saved_offset(ViewTab::PrimaryDetail), 0);
    assert_eq!(orchestrator.switch_tab(ViewTab::CompositionReport, 0).await, 0);
    assert_eq!(orchestrator.switch_tab(ViewTab::PrimaryDetail, 0).await, 0);
}
