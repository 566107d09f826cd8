//! Due-word review session.
//!
//! Walks a fetched list of due words one card at a time:
//!
//! ```text
//! Loading -> Empty
//!         -> Reviewing { index, revealed: false }
//!              -- reveal -->  Reviewing { index, revealed: true }
//!              -- rate   -->  Reviewing { index + 1, revealed: false } | Finished
//! ```
//!
//! The cursor advances only after the scheduler accepts a rating, so ratings
//! reach the server in display order. A single processing latch rejects a
//! second submission while one is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::SessionError;
use crate::model::{DueWord, Rating, ReviewResponse};
use crate::queries::SrsQueries;
use crate::summary::SessionSummary;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Due words have not been fetched yet.
    Loading,
    /// Nothing is due.
    Empty,
    /// Showing the card at `index`; `revealed` once the answer is visible.
    Reviewing { index: usize, revealed: bool },
    /// Every fetched word was rated. Left only by `restart`.
    Finished,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub total: usize,
    pub reviewed: u32,
    pub processing: bool,
}

impl SessionSnapshot {
    /// Cards left, counting the one on screen.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.reviewed as usize)
    }
}

struct State {
    phase: SessionPhase,
    words: Vec<DueWord>,
    summary: SessionSummary,
}

impl State {
    fn load(&mut self, words: Vec<DueWord>) {
        self.summary = SessionSummary::new();
        self.summary.total_due = words.len();
        self.phase = if words.is_empty() {
            SessionPhase::Empty
        } else {
            SessionPhase::Reviewing {
                index: 0,
                revealed: false,
            }
        };
        self.words = words;
    }
}

/// Holds the processing flag for the lifetime of one submission or restart.
struct ProcessingLatch<'a>(&'a AtomicBool);

impl<'a> ProcessingLatch<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingLatch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One review session over the user's due words.
///
/// All operations take `&self`, so the session can be shared between the
/// input loop and whatever renders it.
pub struct ReviewSession {
    queries: Arc<SrsQueries>,
    limit: u32,
    state: Mutex<State>,
    processing: AtomicBool,
}

impl ReviewSession {
    /// Create a session that fetches at most `limit` due words per run.
    pub fn new(queries: Arc<SrsQueries>, limit: u32) -> Self {
        Self {
            queries,
            limit,
            state: Mutex::new(State {
                phase: SessionPhase::Loading,
                words: vec![],
                summary: SessionSummary::new(),
            }),
            processing: AtomicBool::new(false),
        }
    }

    /// Fetch due words and show the first card.
    ///
    /// Does nothing once the session has loaded. On failure the session
    /// stays in `Loading` and can be started again.
    pub async fn start(&self) -> Result<SessionSnapshot, SessionError> {
        if self.lock().phase != SessionPhase::Loading {
            return Ok(self.snapshot());
        }
        let response = self.queries.due_words(self.limit).await?;
        info!(due = response.words.len(), "review session loaded");
        self.lock().load(response.words);
        Ok(self.snapshot())
    }

    /// Re-fetch due words and reset the cursor and counter.
    ///
    /// Holds the processing latch for the whole refetch, so no rating can be
    /// submitted against the old list while the new one loads.
    pub async fn restart(&self) -> Result<SessionSnapshot, SessionError> {
        let _latch = ProcessingLatch::acquire(&self.processing).ok_or(SessionError::Busy)?;
        let response = self.queries.refetch_due_words(self.limit).await?;
        info!(due = response.words.len(), "review session restarted");
        self.lock().load(response.words);
        Ok(self.snapshot())
    }

    /// Show the answer side of the current card.
    pub fn reveal(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        match state.phase {
            SessionPhase::Reviewing { index, .. } => {
                state.phase = SessionPhase::Reviewing {
                    index,
                    revealed: true,
                };
                Ok(())
            }
            _ => Err(SessionError::NotReviewing),
        }
    }

    /// Forward a rating for the current card to the scheduler.
    ///
    /// Returns `Busy` without touching the network if another submission is
    /// in flight. On failure the cursor stays put and the same card can be
    /// rated again.
    pub async fn submit_rating(&self, rating: Rating) -> Result<ReviewResponse, SessionError> {
        let _latch = ProcessingLatch::acquire(&self.processing).ok_or(SessionError::Busy)?;

        let (index, word_id) = {
            let state = self.lock();
            match state.phase {
                SessionPhase::Reviewing {
                    index,
                    revealed: true,
                } => (index, state.words[index].id),
                SessionPhase::Reviewing { revealed: false, .. } => {
                    return Err(SessionError::NotRevealed)
                }
                _ => return Err(SessionError::NotReviewing),
            }
        };

        match self.queries.record_review(word_id, rating).await {
            Ok(response) => {
                self.advance(index, rating, &response);
                Ok(response)
            }
            Err(e) => {
                error!(word_id, %rating, "failed to submit rating: {e}");
                Err(e.into())
            }
        }
    }

    fn advance(&self, index: usize, rating: Rating, response: &ReviewResponse) {
        let mut state = self.lock();
        if !matches!(state.phase, SessionPhase::Reviewing { index: i, .. } if i == index) {
            debug!(index, "session moved on while the rating was in flight");
            return;
        }

        let State {
            phase,
            words,
            summary,
        } = &mut *state;
        summary.reviewed += 1;
        summary.ratings.record(rating);
        if response.current_streak.is_some() {
            summary.current_streak = response.current_streak;
        }
        summary
            .new_achievements
            .extend(response.new_achievements.iter().cloned());

        let next = index + 1;
        if next < words.len() {
            *phase = SessionPhase::Reviewing {
                index: next,
                revealed: false,
            };
        } else {
            *phase = SessionPhase::Finished;
            summary.finished_at = Some(Utc::now());
            info!(reviewed = summary.reviewed, "review session finished");
        }
    }

    /// The card under the cursor, if a card is being reviewed.
    pub fn current(&self) -> Option<DueWord> {
        let state = self.lock();
        match state.phase {
            SessionPhase::Reviewing { index, .. } => state.words.get(index).cloned(),
            _ => None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// Ratings accepted in this run.
    pub fn reviewed_count(&self) -> u32 {
        self.lock().summary.reviewed
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            phase: state.phase,
            total: state.words.len(),
            reviewed: state.summary.reviewed,
            processing: self.is_processing(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        self.lock().summary.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
