//! Request and response shapes exchanged with the bondify API.
//!
//! SRS and progress payloads use the server's camelCase field names; the
//! wordlist endpoints use snake_case.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Scheduling state of a card as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardState::New => write!(f, "New"),
            CardState::Learning => write!(f, "Learning"),
            CardState::Review => write!(f, "Review"),
            CardState::Relearning => write!(f, "Relearning"),
        }
    }
}

/// The user's self-assessed recall, sent to the scheduler as 1–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Position of this rating in [`Rating::ALL`].
    pub fn index(self) -> usize {
        self as usize - 1
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating as u8
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(format!("rating must be between 1 and 4, got {other}")),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Again => write!(f, "again"),
            Rating::Hard => write!(f, "hard"),
            Rating::Good => write!(f, "good"),
            Rating::Easy => write!(f, "easy"),
        }
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "again" => Ok(Rating::Again),
            "2" | "hard" => Ok(Rating::Hard),
            "3" | "good" => Ok(Rating::Good),
            "4" | "easy" => Ok(Rating::Easy),
            other => Err(format!("unknown rating: '{other}' (expected 1-4)")),
        }
    }
}

/// A vocabulary card whose next review time has arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueWord {
    /// Wordlist entry id, used when recording a review.
    pub id: i64,
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub state: CardState,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub due: Option<DateTime<Utc>>,
}

/// Response of the due-words query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DueWordsResponse {
    pub words: Vec<DueWord>,
    #[serde(default)]
    pub total: usize,
}

/// Body of a review submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub word_id: i64,
    pub rating: Rating,
}

/// What the scheduler reports back after a review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewResponse {
    pub id: i64,
    pub word: String,
    pub state: CardState,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub due: Option<DateTime<Utc>>,
    pub mastery_level: u32,
    pub review_count: u32,
    pub current_streak: Option<u32>,
    pub new_achievements: Vec<String>,
}

/// Aggregate SRS counters, computed server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SrsStats {
    pub total_cards: u32,
    pub due_today: u32,
    pub new_cards: u32,
    pub learning_cards: u32,
    pub review_cards: u32,
    pub relearning_cards: u32,
    /// Average retention on a 0–1 scale.
    pub average_retention: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastDay>,
}

impl ForecastResponse {
    /// Total reviews due over the forecast window.
    pub fn total(&self) -> u32 {
        self.forecast.iter().map(|d| d.count).sum()
    }
}

/// Request to add a word to the user's wordlist (and thereby the SRS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordlistAddRequest {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordlistEntry {
    pub id: i64,
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub difficulty: Option<u32>,
    /// Server timestamps are passed through verbatim; they may lack an offset.
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub last_reviewed: Option<String>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub mastery_level: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordlistStats {
    pub total_words: u32,
    /// Mastery level >= 80.
    pub words_mastered: u32,
    /// Mastery level 20–79.
    pub words_learning: u32,
    /// Mastery level < 20.
    pub words_new: u32,
    pub average_mastery: f64,
}

/// A finished learning activity reported to the progress endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub xp: u32,
    pub words_learned: u32,
    pub time_spent_minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityResponse {
    pub success: bool,
    pub xp_earned: u32,
    pub current_streak: u32,
    pub new_achievements: Vec<String>,
}

/// A word answered wrongly during a game, tracked for this game session only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedWord {
    pub word: String,
    pub definition: Option<String>,
    #[serde(rename = "addedToSRS")]
    pub added_to_srs: bool,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones, which the
/// server emits for naive columns and which are UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_wire_format_is_bare_integer() {
        let req = ReviewRequest {
            word_id: 42,
            rating: Rating::Good,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"word_id": 42, "rating": 3}));

        let bad = serde_json::from_str::<ReviewRequest>(r#"{"word_id": 1, "rating": 5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn rating_parses_digits_and_names() {
        assert_eq!("1".parse::<Rating>().unwrap(), Rating::Again);
        assert_eq!(" Easy ".parse::<Rating>().unwrap(), Rating::Easy);
        assert_eq!("hard".parse::<Rating>().unwrap(), Rating::Hard);
        assert!("0".parse::<Rating>().is_err());
        assert!("meh".parse::<Rating>().is_err());
        assert_eq!(Rating::Good.index(), 2);
    }

    #[test]
    fn due_word_from_server_payload() {
        let json = r#"{
            "id": 7,
            "word": "ephemeral",
            "definition": "lasting a very short time",
            "partOfSpeech": "adjective",
            "pronunciation": "",
            "examples": ["Fame is ephemeral."],
            "state": "Relearning",
            "due": "2025-03-01T08:30:00+00:00"
        }"#;
        let word: DueWord = serde_json::from_str(json).unwrap();
        assert_eq!(word.id, 7);
        assert_eq!(word.part_of_speech, "adjective");
        assert_eq!(word.pronunciation, None);
        assert_eq!(word.state, CardState::Relearning);
        assert!(word.due.is_some());
    }

    #[test]
    fn due_timestamp_without_offset_is_utc() {
        let word: DueWord = serde_json::from_str(
            r#"{"id": 7, "word": "ephemeral", "due": "2025-03-01T08:30:00.123456"}"#,
        )
        .unwrap();
        let due = word.due.unwrap();
        assert_eq!(due.to_rfc3339(), "2025-03-01T08:30:00.123456+00:00");

        let shifted: DueWord = serde_json::from_str(
            r#"{"id": 7, "word": "ephemeral", "due": "2025-03-01T10:30:00+02:00"}"#,
        )
        .unwrap();
        assert_eq!(shifted.due.unwrap().to_rfc3339(), "2025-03-01T08:30:00+00:00");

        let response: ReviewResponse =
            serde_json::from_str(r#"{"id": 7, "due": "2025-03-09T08:30:00"}"#).unwrap();
        assert!(response.due.is_some());

        let bad = serde_json::from_str::<DueWord>(r#"{"id": 7, "word": "x", "due": "tomorrow"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn new_card_defaults() {
        let word: DueWord = serde_json::from_str(r#"{"id": 1, "word": "cat"}"#).unwrap();
        assert_eq!(word.state, CardState::New);
        assert!(word.examples.is_empty());
        assert!(word.due.is_none());
    }

    #[test]
    fn review_response_accepts_both_shapes() {
        let scheduled: ReviewResponse = serde_json::from_str(
            r#"{"id": 3, "word": "cat", "state": "Review", "due": null, "masteryLevel": 55, "reviewCount": 4}"#,
        )
        .unwrap();
        assert_eq!(scheduled.mastery_level, 55);
        assert_eq!(scheduled.current_streak, None);

        let progress: ReviewResponse =
            serde_json::from_str(r#"{"currentStreak": 6, "newAchievements": ["Week Warrior"]}"#)
                .unwrap();
        assert_eq!(progress.current_streak, Some(6));
        assert_eq!(progress.new_achievements, vec!["Week Warrior"]);
    }

    #[test]
    fn wordlist_add_omits_missing_notes() {
        let req = WordlistAddRequest {
            word: "cat".into(),
            notes: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"word": "cat"})
        );
    }

    #[test]
    fn forecast_total() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{"forecast": [{"date": "2025-03-01", "count": 4}, {"date": "2025-03-02", "count": 2}]}"#,
        )
        .unwrap();
        assert_eq!(forecast.total(), 6);
        assert_eq!(
            forecast.forecast[1].date,
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
    }

    #[test]
    fn missed_word_uses_web_field_names() {
        let missed = MissedWord {
            word: "cat".into(),
            definition: None,
            added_to_srs: true,
        };
        let json = serde_json::to_value(&missed).unwrap();
        assert_eq!(json["addedToSRS"], serde_json::json!(true));
    }
}
