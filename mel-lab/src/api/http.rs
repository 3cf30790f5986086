//! reqwest adapter for the Remote API
//!
//! `GET {base}/search` resolves titles and ids, `GET {base}/analyze` computes
//! enrichment analyses. No client-side timeout is configured: a resolve waits
//! for the backend to answer or fail.

use super::{Analysis, AnalyzeRequest, ApiError, RemoteApi, ResolveRequest, ResolveResponse};
use async_trait::async_trait;

const USER_AGENT: &str = concat!("mel-lab/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the `/search` and `/analyze` endpoints
pub struct HttpRemoteApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteApi {
    /// Create a client for an already normalized base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(url = %url, params = ?params, "Querying Remote API");

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::NotFound(error_message(&body)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(status.as_u16(), error_message(&body)));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Extract `{"error": "..."}` from an error body, else return it as-is
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn resolve(&self, request: &ResolveRequest) -> Result<ResolveResponse, ApiError> {
        let body = self.get_json("search", &request.query_params()).await?;
        let response = ResolveResponse::from_json(body)?;

        match &response {
            ResolveResponse::Ambiguous(page) => tracing::info!(
                candidates = page.candidates.len(),
                page = page.page,
                total_pages = page.total_pages,
                "Resolve returned candidates"
            ),
            ResolveResponse::Resolved(subject) => tracing::info!(
                id = %subject.id,
                kind = %subject.kind,
                title = %subject.title,
                "Resolve returned subject"
            ),
        }

        Ok(response)
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ApiError> {
        let body = self.get_json("analyze", &request.query_params()).await?;
        Analysis::from_json(request.mode, body)
    }
}
