//! Review session summaries with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Rating;

/// Count of each rating given during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTally {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl RatingTally {
    pub fn record(&mut self, rating: Rating) {
        match rating {
            Rating::Again => self.again += 1,
            Rating::Hard => self.hard += 1,
            Rating::Good => self.good += 1,
            Rating::Easy => self.easy += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.again + self.hard + self.good + self.easy
    }

    /// Share of reviews not rated "again", or `None` before the first review.
    pub fn recall_rate(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            None
        } else {
            Some((total - self.again) as f64 / total as f64)
        }
    }
}

/// What happened in one run of a review session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique session identifier, renewed on restart.
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Set when the last due word was rated.
    pub finished_at: Option<DateTime<Utc>>,
    /// Due words fetched for this run.
    pub total_due: usize,
    /// Ratings accepted by the scheduler.
    pub reviewed: u32,
    pub ratings: RatingTally,
    /// Latest streak reported by the server, if it reports one.
    pub current_streak: Option<u32>,
    #[serde(default)]
    pub new_achievements: Vec<String>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            total_due: 0,
            reviewed: 0,
            ratings: RatingTally::default(),
            current_streak: None,
            new_achievements: vec![],
        }
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }
}

impl Default for SessionSummary {
    fn default() -> Self {
        Self::new()
    }
}
