//! The backend trait the review session and game bridges are written against.
//!
//! `bondify-client` implements it over HTTP; [`crate::mock::MockBackend`]
//! implements it in memory for tests.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::{
    ActivityRequest, ActivityResponse, DueWordsResponse, ForecastResponse, ReviewRequest,
    ReviewResponse, SrsStats, WordlistAddRequest, WordlistEntry, WordlistStats,
};

/// The remote scheduler and the endpoints around it.
///
/// Implementations perform exactly one request per call: no retries, no
/// caching. Caching is layered on top by [`crate::queries::SrsQueries`].
#[async_trait]
pub trait SrsBackend: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Words due for review now, new cards first.
    async fn due_words(&self, limit: u32) -> ApiResult<DueWordsResponse>;

    /// Forward a rating to the scheduler.
    async fn record_review(&self, request: &ReviewRequest) -> ApiResult<ReviewResponse>;

    async fn srs_stats(&self) -> ApiResult<SrsStats>;

    /// Due-card counts for each of the next `days` days.
    async fn review_forecast(&self, days: u32) -> ApiResult<ForecastResponse>;

    /// Add a word to the wordlist, which enrolls it in the SRS.
    async fn add_to_wordlist(&self, request: &WordlistAddRequest) -> ApiResult<WordlistEntry>;

    async fn wordlist_stats(&self) -> ApiResult<WordlistStats>;

    /// Report a finished learning activity (XP, words, time).
    async fn record_activity(&self, request: &ActivityRequest) -> ApiResult<ActivityResponse>;
}
