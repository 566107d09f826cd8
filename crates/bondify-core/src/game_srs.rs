//! Enrolls words missed during a game into spaced repetition.
//!
//! Each distinct word (case-insensitive) is sent to the wordlist at most once
//! per game session. Failures are logged and swallowed: the game keeps going
//! and the word is simply not scheduled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::model::MissedWord;
use crate::queries::SrsQueries;

/// What happened to a missed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissedWordOutcome {
    /// Newly added to the wordlist.
    Added,
    /// The server already had the word; treated as added.
    AlreadyInWordlist,
    /// Seen earlier in this session; no request was made.
    AlreadyTracked,
    /// The add failed for another reason.
    Failed,
    /// Blank input.
    Ignored,
}

/// Per-game-session bridge from wrong answers to the wordlist.
pub struct GameSrsBridge {
    queries: Arc<SrsQueries>,
    missed: Mutex<Vec<MissedWord>>,
}

impl GameSrsBridge {
    pub fn new(queries: Arc<SrsQueries>) -> Self {
        Self {
            queries,
            missed: Mutex::new(vec![]),
        }
    }

    /// Record a wrongly answered word and enroll it in the SRS.
    pub async fn record_missed_word(
        &self,
        word: &str,
        definition: Option<&str>,
    ) -> MissedWordOutcome {
        let normalized = normalize(word);
        if normalized.is_empty() {
            return MissedWordOutcome::Ignored;
        }

        {
            // Registered before the request so a concurrent duplicate dedupes.
            let mut missed = self.lock();
            if missed.iter().any(|m| normalize(&m.word) == normalized) {
                debug!(word = %normalized, "missed word already tracked");
                return MissedWordOutcome::AlreadyTracked;
            }
            missed.push(MissedWord {
                word: word.trim().to_string(),
                definition: definition.map(str::to_string),
                added_to_srs: false,
            });
        }

        let outcome = match self.queries.add_to_wordlist(word.trim(), None).await {
            Ok(_) => MissedWordOutcome::Added,
            Err(e) if e.is_already_exists() => {
                debug!(word = %normalized, "word already in wordlist");
                MissedWordOutcome::AlreadyInWordlist
            }
            Err(e) => {
                warn!(word = %normalized, "failed to add missed word to SRS: {e}");
                MissedWordOutcome::Failed
            }
        };

        if outcome != MissedWordOutcome::Failed {
            if let Some(entry) = self
                .lock()
                .iter_mut()
                .find(|m| normalize(&m.word) == normalized)
            {
                entry.added_to_srs = true;
            }
        }
        outcome
    }

    /// Words missed this session, in the order they were first missed.
    pub fn missed_words(&self) -> Vec<MissedWord> {
        self.lock().clone()
    }

    /// Missed words that made it into the SRS.
    pub fn added_count(&self) -> usize {
        self.lock().iter().filter(|m| m.added_to_srs).count()
    }

    pub fn is_tracked(&self, word: &str) -> bool {
        let normalized = normalize(word);
        self.lock().iter().any(|m| normalize(&m.word) == normalized)
    }

    /// Forget everything recorded this session.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MissedWord>> {
        self.missed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}
