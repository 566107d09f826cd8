//! reqwest implementation of the SRS backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bondify_core::model::{
    ActivityRequest, ActivityResponse, DueWordsResponse, ForecastResponse, ReviewRequest,
    ReviewResponse, SrsStats, WordlistAddRequest, WordlistEntry, WordlistStats,
};
use bondify_core::{ApiError, ApiResult, SrsBackend};

use crate::auth::Credentials;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The bondify REST API over HTTP with bearer-token auth.
pub struct HttpBackend {
    base_url: String,
    credentials: Option<Credentials>,
    timeout_secs: u64,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> ApiResult<Self> {
        let timeout_secs = if timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            timeout_secs,
            client,
        })
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Exchange email and password for tokens.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Credentials> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { email, password });
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.authorized(self.client.get(self.url(path))))
            .await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(self.authorized(self.client.post(self.url(path)).json(body)))
            .await
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(credentials) => request.bearer_auth(&credentials.access_token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status >= 400 {
            return Err(ApiError::from_status(status, error_message(&body)));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull a human-readable message out of a FastAPI error body.
///
/// Handles `{"detail": "..."}`, `{"detail": {"error", "detail"}}` and
/// validation errors (`{"detail": [{"msg": ...}]}`), falling back to the raw
/// body.
fn error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return body.trim().to_string();
    };
    match parsed.detail {
        serde_json::Value::String(s) => s,
        serde_json::Value::Object(map) => map
            .get("detail")
            .or_else(|| map.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string()),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[async_trait]
impl SrsBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn due_words(&self, limit: u32) -> ApiResult<DueWordsResponse> {
        self.get(&format!("/api/srs/due?limit={limit}")).await
    }

    #[instrument(skip(self), fields(word_id = request.word_id, rating = %request.rating))]
    async fn record_review(&self, request: &ReviewRequest) -> ApiResult<ReviewResponse> {
        self.post("/api/srs/review", request).await
    }

    #[instrument(skip(self))]
    async fn srs_stats(&self) -> ApiResult<SrsStats> {
        self.get("/api/srs/stats").await
    }

    #[instrument(skip(self))]
    async fn review_forecast(&self, days: u32) -> ApiResult<ForecastResponse> {
        self.get(&format!("/api/srs/forecast?days={days}")).await
    }

    #[instrument(skip(self), fields(word = %request.word))]
    async fn add_to_wordlist(&self, request: &WordlistAddRequest) -> ApiResult<WordlistEntry> {
        self.post("/api/wordlist", request).await
    }

    #[instrument(skip(self))]
    async fn wordlist_stats(&self) -> ApiResult<WordlistStats> {
        self.get("/api/wordlist/stats").await
    }

    #[instrument(skip(self, request))]
    async fn record_activity(&self, request: &ActivityRequest) -> ApiResult<ActivityResponse> {
        self.post("/api/progress/activity", request).await
    }
}
