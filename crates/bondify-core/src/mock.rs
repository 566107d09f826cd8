//! In-memory backend for exercising sessions and caches without a server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Utc};

use crate::error::{ApiError, ApiResult};
use crate::model::{
    ActivityRequest, ActivityResponse, CardState, DueWord, DueWordsResponse, ForecastDay,
    ForecastResponse, Rating, ReviewRequest, ReviewResponse, SrsStats, WordlistAddRequest,
    WordlistEntry, WordlistStats,
};
use crate::traits::SrsBackend;

/// Build a minimal new card for tests and demos.
pub fn due_word(id: i64, word: &str) -> DueWord {
    DueWord {
        id,
        word: word.to_string(),
        definition: format!("definition of {word}"),
        part_of_speech: "noun".to_string(),
        pronunciation: None,
        examples: vec![],
        state: CardState::New,
        due: None,
    }
}

#[derive(Default)]
struct Calls {
    due_words: AtomicU32,
    record_review: AtomicU32,
    srs_stats: AtomicU32,
    review_forecast: AtomicU32,
    add_to_wordlist: AtomicU32,
    wordlist_stats: AtomicU32,
    record_activity: AtomicU32,
}

/// A mock scheduler that serves a fixed due list and records every write.
///
/// Failures can be queued per endpoint; each queued error is returned by
/// exactly one subsequent call.
#[derive(Default)]
pub struct MockBackend {
    due: Vec<DueWord>,
    stats: SrsStats,
    review_delay: Option<Duration>,
    due_delay: Option<Duration>,
    wordlist: Mutex<Vec<String>>,
    reviews: Mutex<Vec<ReviewRequest>>,
    activities: Mutex<Vec<ActivityRequest>>,
    review_failures: Mutex<VecDeque<ApiError>>,
    add_failures: Mutex<VecDeque<ApiError>>,
    activity_failures: Mutex<VecDeque<ApiError>>,
    calls: Calls,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these words from the due-words endpoint.
    pub fn with_due_words(mut self, words: Vec<DueWord>) -> Self {
        self.due = words;
        self
    }

    pub fn with_stats(mut self, stats: SrsStats) -> Self {
        self.stats = stats;
        self
    }

    /// Words already on the wordlist; adding them again is a conflict.
    pub fn with_existing_words(self, words: &[&str]) -> Self {
        lock(&self.wordlist).extend(words.iter().map(|w| w.to_lowercase()));
        self
    }

    /// Make every review submission take this long.
    pub fn with_review_delay(mut self, delay: Duration) -> Self {
        self.review_delay = Some(delay);
        self
    }

    /// Make every due-words fetch take this long.
    pub fn with_due_delay(mut self, delay: Duration) -> Self {
        self.due_delay = Some(delay);
        self
    }

    pub fn fail_next_review(&self, error: ApiError) {
        lock(&self.review_failures).push_back(error);
    }

    pub fn fail_next_add(&self, error: ApiError) {
        lock(&self.add_failures).push_back(error);
    }

    pub fn fail_next_activity(&self, error: ApiError) {
        lock(&self.activity_failures).push_back(error);
    }

    /// Reviews accepted so far, in submission order.
    pub fn reviews(&self) -> Vec<ReviewRequest> {
        lock(&self.reviews).clone()
    }

    pub fn activities(&self) -> Vec<ActivityRequest> {
        lock(&self.activities).clone()
    }

    pub fn wordlist(&self) -> Vec<String> {
        lock(&self.wordlist).clone()
    }

    pub fn due_calls(&self) -> u32 {
        self.calls.due_words.load(Ordering::Relaxed)
    }

    /// Review submissions attempted, including failed ones.
    pub fn review_calls(&self) -> u32 {
        self.calls.record_review.load(Ordering::Relaxed)
    }

    pub fn stats_calls(&self) -> u32 {
        self.calls.srs_stats.load(Ordering::Relaxed)
    }

    pub fn forecast_calls(&self) -> u32 {
        self.calls.review_forecast.load(Ordering::Relaxed)
    }

    pub fn add_calls(&self) -> u32 {
        self.calls.add_to_wordlist.load(Ordering::Relaxed)
    }

    pub fn wordlist_stats_calls(&self) -> u32 {
        self.calls.wordlist_stats.load(Ordering::Relaxed)
    }

    pub fn activity_calls(&self) -> u32 {
        self.calls.record_activity.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SrsBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn due_words(&self, limit: u32) -> ApiResult<DueWordsResponse> {
        self.calls.due_words.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.due_delay {
            tokio::time::sleep(delay).await;
        }
        let words: Vec<DueWord> = self.due.iter().take(limit as usize).cloned().collect();
        Ok(DueWordsResponse {
            total: words.len(),
            words,
        })
    }

    async fn record_review(&self, request: &ReviewRequest) -> ApiResult<ReviewResponse> {
        self.calls.record_review.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.review_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock(&self.review_failures).pop_front() {
            return Err(error);
        }

        let word = self
            .due
            .iter()
            .find(|w| w.id == request.word_id)
            .ok_or_else(|| ApiError::NotFound(format!("Word entry {} not found", request.word_id)))?;

        let mut reviews = lock(&self.reviews);
        reviews.push(request.clone());
        let review_count = reviews.iter().filter(|r| r.word_id == word.id).count() as u32;

        Ok(ReviewResponse {
            id: word.id,
            word: word.word.clone(),
            state: if request.rating == Rating::Again {
                CardState::Relearning
            } else {
                CardState::Review
            },
            due: None,
            mastery_level: 10 * u8::from(request.rating) as u32,
            review_count,
            current_streak: None,
            new_achievements: vec![],
        })
    }

    async fn srs_stats(&self) -> ApiResult<SrsStats> {
        self.calls.srs_stats.fetch_add(1, Ordering::Relaxed);
        Ok(self.stats.clone())
    }

    async fn review_forecast(&self, days: u32) -> ApiResult<ForecastResponse> {
        self.calls.review_forecast.fetch_add(1, Ordering::Relaxed);
        let today = Utc::now().date_naive();
        let forecast = (0..days)
            .filter_map(|i| today.checked_add_days(Days::new(i as u64)))
            .enumerate()
            .map(|(i, date)| ForecastDay {
                date,
                count: if i == 0 { self.due.len() as u32 } else { 0 },
            })
            .collect();
        Ok(ForecastResponse { forecast })
    }

    async fn add_to_wordlist(&self, request: &WordlistAddRequest) -> ApiResult<WordlistEntry> {
        self.calls.add_to_wordlist.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = lock(&self.add_failures).pop_front() {
            return Err(error);
        }

        let normalized = request.word.trim().to_lowercase();
        let mut wordlist = lock(&self.wordlist);
        if wordlist.contains(&normalized) {
            return Err(ApiError::Conflict(format!(
                "Word '{normalized}' is already in your word list"
            )));
        }
        wordlist.push(normalized.clone());

        Ok(WordlistEntry {
            id: wordlist.len() as i64,
            word: normalized,
            definition: String::new(),
            part_of_speech: String::new(),
            difficulty: None,
            added_at: Some(Utc::now().to_rfc3339()),
            last_reviewed: None,
            review_count: 0,
            mastery_level: 0,
            notes: request.notes.clone(),
        })
    }

    async fn wordlist_stats(&self) -> ApiResult<WordlistStats> {
        self.calls.wordlist_stats.fetch_add(1, Ordering::Relaxed);
        let total = lock(&self.wordlist).len() as u32;
        Ok(WordlistStats {
            total_words: total,
            words_new: total,
            ..Default::default()
        })
    }

    async fn record_activity(&self, request: &ActivityRequest) -> ApiResult<ActivityResponse> {
        self.calls.record_activity.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = lock(&self.activity_failures).pop_front() {
            return Err(error);
        }
        lock(&self.activities).push(request.clone());
        Ok(ActivityResponse {
            success: true,
            xp_earned: request.xp,
            current_streak: 1,
            new_achievements: vec![],
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
