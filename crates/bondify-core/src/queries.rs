//! Cached queries and cache-invalidating mutations over an `SrsBackend`.
//!
//! Reads are served from per-query caches while fresh. Writes never update
//! caches optimistically: a successful write marks the dependent caches
//! stale and the next read refetches; a failed write leaves them untouched.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::QueryCache;
use crate::error::ApiResult;
use crate::model::{
    ActivityRequest, ActivityResponse, DueWordsResponse, ForecastResponse, Rating, ReviewRequest,
    ReviewResponse, SrsStats, WordlistAddRequest, WordlistEntry, WordlistStats,
};
use crate::traits::SrsBackend;

/// Freshness windows, in seconds, for each cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    pub due_words_secs: u64,
    pub srs_stats_secs: u64,
    pub forecast_secs: u64,
    pub wordlist_stats_secs: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            due_words_secs: 30,
            srs_stats_secs: 60,
            forecast_secs: 300,
            wordlist_stats_secs: 60,
        }
    }
}

/// Identifies one cached query, for staleness inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    DueWords { limit: u32 },
    SrsStats,
    Forecast { days: u32 },
    WordlistStats,
}

/// Cached access to the scheduler endpoints.
pub struct SrsQueries {
    backend: Arc<dyn SrsBackend>,
    due_words: QueryCache<u32, DueWordsResponse>,
    srs_stats: QueryCache<(), SrsStats>,
    forecast: QueryCache<u32, ForecastResponse>,
    wordlist_stats: QueryCache<(), WordlistStats>,
}

impl SrsQueries {
    pub fn new(backend: Arc<dyn SrsBackend>, policy: CachePolicy) -> Self {
        Self {
            backend,
            due_words: QueryCache::new(Duration::from_secs(policy.due_words_secs)),
            srs_stats: QueryCache::new(Duration::from_secs(policy.srs_stats_secs)),
            forecast: QueryCache::new(Duration::from_secs(policy.forecast_secs)),
            wordlist_stats: QueryCache::new(Duration::from_secs(policy.wordlist_stats_secs)),
        }
    }

    pub fn backend(&self) -> &Arc<dyn SrsBackend> {
        &self.backend
    }

    /// Words due for review, served from cache while fresh.
    pub async fn due_words(&self, limit: u32) -> ApiResult<DueWordsResponse> {
        cached(&self.due_words, "due_words", limit, || {
            self.backend.due_words(limit)
        })
        .await
    }

    /// Fetch due words from the server regardless of cache freshness.
    pub async fn refetch_due_words(&self, limit: u32) -> ApiResult<DueWordsResponse> {
        let generation = self.due_words.generation();
        let response = self.backend.due_words(limit).await?;
        self.due_words.insert_fetched(limit, response.clone(), generation);
        Ok(response)
    }

    /// Submit a rating; on success the due list and wordlist stats go stale.
    pub async fn record_review(&self, word_id: i64, rating: Rating) -> ApiResult<ReviewResponse> {
        let response = self
            .backend
            .record_review(&ReviewRequest { word_id, rating })
            .await?;
        self.invalidate_after_write("record_review");
        Ok(response)
    }

    pub async fn srs_stats(&self) -> ApiResult<SrsStats> {
        cached(&self.srs_stats, "srs_stats", (), || self.backend.srs_stats()).await
    }

    pub async fn review_forecast(&self, days: u32) -> ApiResult<ForecastResponse> {
        cached(&self.forecast, "review_forecast", days, || {
            self.backend.review_forecast(days)
        })
        .await
    }

    pub async fn wordlist_stats(&self) -> ApiResult<WordlistStats> {
        cached(&self.wordlist_stats, "wordlist_stats", (), || {
            self.backend.wordlist_stats()
        })
        .await
    }

    /// Add a word to the wordlist; a new card is due immediately, so the due
    /// list goes stale along with the wordlist stats.
    pub async fn add_to_wordlist(
        &self,
        word: &str,
        notes: Option<String>,
    ) -> ApiResult<WordlistEntry> {
        let entry = self
            .backend
            .add_to_wordlist(&WordlistAddRequest {
                word: word.to_string(),
                notes,
            })
            .await?;
        self.invalidate_after_write("add_to_wordlist");
        Ok(entry)
    }

    pub async fn record_activity(&self, request: &ActivityRequest) -> ApiResult<ActivityResponse> {
        self.backend.record_activity(request).await
    }

    /// `true` if the next read of `query` will hit the network.
    pub fn is_stale(&self, query: Query) -> bool {
        match query {
            Query::DueWords { limit } => self.due_words.is_stale(&limit),
            Query::SrsStats => self.srs_stats.is_stale(&()),
            Query::Forecast { days } => self.forecast.is_stale(&days),
            Query::WordlistStats => self.wordlist_stats.is_stale(&()),
        }
    }

    fn invalidate_after_write(&self, mutation: &str) {
        let due = self.due_words.invalidate_all();
        let stats = self.wordlist_stats.invalidate_all();
        debug!(mutation, due_entries = due, wordlist_stats_entries = stats, "invalidated caches");
    }
}

async fn cached<K, V, F, Fut>(
    cache: &QueryCache<K, V>,
    query: &'static str,
    key: K,
    fetch: F,
) -> ApiResult<V>
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<V>>,
{
    if let Some(value) = cache.get_fresh(&key) {
        debug!(query, "cache hit");
        return Ok(value);
    }
    debug!(query, "cache miss, fetching");
    let generation = cache.generation();
    let value = fetch().await?;
    if !cache.insert_fetched(key, value.clone(), generation) {
        debug!(query, "invalidated while fetching, result kept stale");
    }
    Ok(value)
}
