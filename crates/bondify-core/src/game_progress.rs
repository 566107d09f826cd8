//! Score keeping for one game run and its report to the progress endpoint.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::model::{ActivityRequest, ActivityResponse};
use crate::queries::SrsQueries;

/// XP awarded for each correct answer.
pub const XP_PER_CORRECT: u32 = 10;

/// Tracks answers for one run of a game and reports it once at the end.
pub struct GameProgress {
    queries: Arc<SrsQueries>,
    game: String,
    started: Instant,
    correct: AtomicU32,
    incorrect: AtomicU32,
    submitted: AtomicBool,
}

impl GameProgress {
    pub fn new(queries: Arc<SrsQueries>, game: impl Into<String>) -> Self {
        Self {
            queries,
            game: game.into(),
            started: Instant::now(),
            correct: AtomicU32::new(0),
            incorrect: AtomicU32::new(0),
            submitted: AtomicBool::new(false),
        }
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn record_answer(&self, correct: bool) {
        if correct {
            self.correct.fetch_add(1, Ordering::Relaxed);
        } else {
            self.incorrect.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn correct(&self) -> u32 {
        self.correct.load(Ordering::Relaxed)
    }

    pub fn answered(&self) -> u32 {
        self.correct() + self.incorrect.load(Ordering::Relaxed)
    }

    /// Share of correct answers, 0.0 before the first answer.
    pub fn accuracy(&self) -> f64 {
        match self.answered() {
            0 => 0.0,
            n => self.correct() as f64 / n as f64,
        }
    }

    pub fn xp(&self) -> u32 {
        self.correct() * XP_PER_CORRECT
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The activity this run would report right now.
    pub fn activity(&self) -> ActivityRequest {
        ActivityRequest {
            xp: self.xp(),
            words_learned: self.correct(),
            time_spent_minutes: self.elapsed().as_secs().div_ceil(60) as u32,
        }
    }

    /// Report the run to the progress endpoint.
    ///
    /// Returns `Ok(None)` without a request when nothing was answered or the
    /// run was already reported. A failed report can be retried.
    pub async fn finish(&self) -> ApiResult<Option<ActivityResponse>> {
        if self.answered() == 0 {
            return Ok(None);
        }
        if self
            .submitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(None);
        }

        let activity = self.activity();
        match self.queries.record_activity(&activity).await {
            Ok(response) => {
                info!(
                    game = %self.game,
                    xp = response.xp_earned,
                    streak = response.current_streak,
                    "game progress recorded"
                );
                Ok(Some(response))
            }
            Err(e) => {
                warn!(game = %self.game, "failed to record game progress: {e}");
                self.submitted.store(false, Ordering::Release);
                Err(e)
            }
        }
    }
}
