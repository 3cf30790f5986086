//! Remote API port
//!
//! The orchestrator only talks to the backend through [`RemoteApi`]. The
//! production adapter is [`HttpRemoteApi`]; tests substitute scripted mocks.

mod http;

pub use http::HttpRemoteApi;

use crate::models::{
    CandidatePage, Composition, PopularityScore, Subject, SubjectId, SubjectKey, SubjectKind,
    Synopsis,
};
use async_trait::async_trait;
use mel_common::EnrichmentMode;
use thiserror::Error;

/// Remote API errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Payload parsed but violates the documented contract
    #[error("Contract violation: {0}")]
    Contract(String),
}

/// Resolve request: title search or direct id lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveRequest {
    Title { title: String, page: u32 },
    Id { id: SubjectId, kind: SubjectKind },
}

impl ResolveRequest {
    /// Query parameters for `GET /search`
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            ResolveRequest::Title { title, page } => {
                vec![("title", title.clone()), ("page", page.to_string())]
            }
            ResolveRequest::Id { id, kind } => {
                vec![("id", id.to_string()), ("type", kind.as_wire().to_string())]
            }
        }
    }
}

/// Resolve response as a closed union
///
/// The backend distinguishes the two shapes only by the presence of a
/// `candidates` key; that check happens once here, during decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveResponse {
    Ambiguous(CandidatePage),
    Resolved(Box<Subject>),
}

impl ResolveResponse {
    /// Decode a `/search` response body
    pub fn from_json(value: serde_json::Value) -> Result<Self, ApiError> {
        let has_candidates = value.get("candidates").is_some();
        if has_candidates {
            serde_json::from_value::<CandidatePage>(value)
                .map(ResolveResponse::Ambiguous)
                .map_err(|e| ApiError::Parse(format!("candidate page: {}", e)))
        } else {
            serde_json::from_value::<Subject>(value)
                .map(|s| ResolveResponse::Resolved(Box::new(s)))
                .map_err(|e| ApiError::Parse(format!("subject record: {}", e)))
        }
    }
}

/// Analyze request for one subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub subject: SubjectKey,
    pub mode: EnrichmentMode,
    /// Season title (synopsis of a series only)
    pub season: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(subject: SubjectKey, mode: EnrichmentMode) -> Self {
        Self {
            subject,
            mode,
            season: None,
        }
    }

    pub fn with_season(mut self, season: Option<String>) -> Self {
        self.season = season;
        self
    }

    /// Query parameters for `GET /analyze`
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("id", self.subject.id.to_string()),
            ("type", self.subject.kind.as_wire().to_string()),
            ("mode", self.mode.as_str().to_string()),
        ];
        if let (EnrichmentMode::Synopsis, Some(season)) = (self.mode, &self.season) {
            params.push(("season", season.clone()));
        }
        params
    }
}

/// Decoded analysis payload, one variant per mode
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Score(PopularityScore),
    Composition(Composition),
    Synopsis(Synopsis),
}

impl Analysis {
    pub fn mode(&self) -> EnrichmentMode {
        match self {
            Analysis::Score(_) => EnrichmentMode::Score,
            Analysis::Composition(_) => EnrichmentMode::Composition,
            Analysis::Synopsis(_) => EnrichmentMode::Synopsis,
        }
    }

    /// Decode an `/analyze` response body for the given mode
    ///
    /// Composition payloads are validated; out-of-range metrics are a
    /// contract violation.
    pub fn from_json(mode: EnrichmentMode, value: serde_json::Value) -> Result<Self, ApiError> {
        let parse_err = |e: serde_json::Error| ApiError::Parse(format!("{} payload: {}", mode, e));
        match mode {
            EnrichmentMode::Score => serde_json::from_value(value)
                .map(Analysis::Score)
                .map_err(parse_err),
            EnrichmentMode::Synopsis => serde_json::from_value(value)
                .map(Analysis::Synopsis)
                .map_err(parse_err),
            EnrichmentMode::Composition => {
                let composition: Composition = serde_json::from_value(value).map_err(parse_err)?;
                composition.validate().map_err(ApiError::Contract)?;
                Ok(Analysis::Composition(composition))
            }
        }
    }
}

/// Request/response interface to the backend
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Map a title or id to a candidate page or a subject record
    async fn resolve(&self, request: &ResolveRequest) -> Result<ResolveResponse, ApiError>;

    /// Compute one derived analysis for a subject
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ApiError>;
}
