//! Scripted Remote API for orchestrator tests
//!
//! Responses are scripted per request with an optional delay so tests can
//! interleave slow and fast calls under tokio's paused clock. Every call is
//! recorded with its (virtual) start time.

use async_trait::async_trait;
use mel_common::EnrichmentMode;
use mel_lab::api::{Analysis, AnalyzeRequest, ApiError, RemoteApi, ResolveRequest, ResolveResponse};
use mel_lab::models::SubjectId;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One recorded call
#[derive(Debug, Clone)]
pub enum Call {
    Resolve { request: ResolveRequest, at: Instant },
    Analyze { request: AnalyzeRequest, at: Instant },
}

#[derive(Clone)]
struct Scripted<T> {
    delay: Duration,
    result: Result<T, ApiError>,
}

/// Mock backend; unscripted requests fail
#[derive(Default)]
pub struct ScriptedApi {
    resolves: Mutex<HashMap<ResolveKey, Scripted<ResolveResponse>>>,
    /// Queue per (subject, mode); the last entry repeats
    analyses: Mutex<HashMap<(SubjectId, EnrichmentMode), VecDeque<Scripted<Analysis>>>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ResolveKey {
    Title(String, u32),
    Id(SubjectId),
}

impl ResolveKey {
    fn of(request: &ResolveRequest) -> Self {
        match request {
            ResolveRequest::Title { title, page } => ResolveKey::Title(title.clone(), *page),
            ResolveRequest::Id { id, .. } => ResolveKey::Id(*id),
        }
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_title(
        &self,
        title: &str,
        page: u32,
        result: Result<ResolveResponse, ApiError>,
    ) -> &Self {
        self.on_title_delayed(title, page, Duration::ZERO, result)
    }

    pub fn on_title_delayed(
        &self,
        title: &str,
        page: u32,
        delay: Duration,
        result: Result<ResolveResponse, ApiError>,
    ) -> &Self {
        self.resolves
            .lock()
            .unwrap()
            .insert(ResolveKey::Title(title.to_string(), page), Scripted { delay, result });
        self
    }

    pub fn on_id(&self, id: u64, result: Result<ResolveResponse, ApiError>) -> &Self {
        self.on_id_delayed(id, Duration::ZERO, result)
    }

    pub fn on_id_delayed(
        &self,
        id: u64,
        delay: Duration,
        result: Result<ResolveResponse, ApiError>,
    ) -> &Self {
        self.resolves
            .lock()
            .unwrap()
            .insert(ResolveKey::Id(SubjectId(id)), Scripted { delay, result });
        self
    }

    /// Append answers for (id, mode), consumed one per attempt
    pub fn on_analyze(
        &self,
        id: u64,
        mode: EnrichmentMode,
        results: Vec<Result<Analysis, ApiError>>,
    ) -> &Self {
        self.on_analyze_delayed(id, mode, Duration::ZERO, results)
    }

    pub fn on_analyze_delayed(
        &self,
        id: u64,
        mode: EnrichmentMode,
        delay: Duration,
        results: Vec<Result<Analysis, ApiError>>,
    ) -> &Self {
        self.analyses
            .lock()
            .unwrap()
            .entry((SubjectId(id), mode))
            .or_default()
            .extend(results.into_iter().map(|result| Scripted { delay, result }));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn resolve_calls(&self) -> Vec<ResolveRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Resolve { request, .. } => Some(request),
                Call::Analyze { .. } => None,
            })
            .collect()
    }

    pub fn analyze_calls(&self) -> Vec<AnalyzeRequest> {
        self.analyze_calls_with_time().into_iter().map(|(r, _)| r).collect()
    }

    pub fn analyze_calls_with_time(&self) -> Vec<(AnalyzeRequest, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Analyze { request, at } => Some((request, at)),
                Call::Resolve { .. } => None,
            })
            .collect()
    }

    /// Start times of analyze calls for one mode
    pub fn attempt_times(&self, mode: EnrichmentMode) -> Vec<Instant> {
        self.analyze_calls_with_time()
            .into_iter()
            .filter(|(r, _)| r.mode == mode)
            .map(|(_, at)| at)
            .collect()
    }
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn resolve(&self, request: &ResolveRequest) -> Result<ResolveResponse, ApiError> {
        self.calls.lock().unwrap().push(Call::Resolve {
            request: request.clone(),
            at: Instant::now(),
        });

        let scripted = self.resolves.lock().unwrap().get(&ResolveKey::of(request)).cloned();
        match scripted {
            Some(s) => {
                tokio::time::sleep(s.delay).await;
                s.result
            }
            None => Err(ApiError::NotFound("unscripted resolve".to_string())),
        }
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ApiError> {
        self.calls.lock().unwrap().push(Call::Analyze {
            request: request.clone(),
            at: Instant::now(),
        });

        let scripted = {
            let mut analyses = self.analyses.lock().unwrap();
            match analyses.get_mut(&(request.subject.id, request.mode)) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match scripted {
            Some(s) => {
                tokio::time::sleep(s.delay).await;
                s.result
            }
            None => Err(ApiError::Network("unscripted analyze".to_string())),
        }
    }
}
