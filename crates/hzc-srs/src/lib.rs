//! SRS (Spaced Repetition System) library for Hanzi Cards
//!
//! This crate holds the scheduling rules for flashcard reviews. Every function
//! here is pure: callers pass "today" in, nothing reads the clock except [`today`].
//!
//! Each card is reviewed on independent tracks (reading, listening, speaking).
//! A track carries a [`Level`] in `0..=5` and the calendar date on which the
//! card becomes due again for that track.

use std::{fmt, str::FromStr};

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Days added to the review date for each resulting level.
///
/// * Level 0: 0 days (due again the same day)
/// * Level 1: 1 day
/// * Level 2: 3 days
/// * Level 3: 5 days
/// * Level 4: 10 days
/// * Level 5: 24 days (mastered)
pub const INTERVAL_DAYS: [u64; 6] = [0, 1, 3, 5, 10, 24];

/// An independent review modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Read the characters, recall meaning and pinyin.
    Reading,
    /// Hear the word, recall characters and meaning.
    Listening,
    /// Read the meaning, say the word.
    Speaking,
}

impl Track {
    /// All tracks, in display order.
    pub const ALL: [Self; 3] = [Self::Reading, Self::Listening, Self::Speaking];

    /// Lowercase name used in URLs and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A track name that is not `reading`, `listening` or `speaking`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown review track: '{0}'")]
pub struct ParseTrackError(String);

impl FromStr for Track {
    type Err = ParseTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reading" => Ok(Self::Reading),
            "listening" => Ok(Self::Listening),
            "speaking" => Ok(Self::Speaking),
            _ => Err(ParseTrackError(s.to_string())),
        }
    }
}

/// A level outside `0..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("review level {0} is out of range (0..=5)")]
pub struct LevelOutOfRange(pub i64);

/// Mastery stage of a card on one track. 0 is new or failed, 5 is mastered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// New or failed card.
    pub const NEW: Self = Self(0);
    /// Highest level a card can reach.
    pub const MASTERED: Self = Self(5);

    /// Build a level, rejecting values outside `0..=5`.
    pub fn new(value: i64) -> Result<Self, LevelOutOfRange> {
        if (0..=i64::from(Self::MASTERED.0)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(LevelOutOfRange(value))
        }
    }

    /// Build a level, saturating anything outside `0..=5` into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MASTERED.0)) as u8)
    }

    /// Numeric stage, `0..=5`.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this is level 0.
    pub const fn is_new(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the level after a review.
///
/// A failed review always resets to 0. A successful one moves up one stage,
/// capped at [`Level::MASTERED`].
pub fn next_level(current: Level, successful: bool) -> Level {
    if successful {
        Level(current.0.saturating_add(1).min(Level::MASTERED.0))
    } else {
        Level::NEW
    }
}

/// Get the interval in days for a given level.
pub fn interval_days(level: Level) -> u64 {
    INTERVAL_DAYS[usize::from(level.0)]
}

/// Date on which a card at `level` becomes due, counting from `today`.
pub fn next_review_date(level: Level, today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(interval_days(level)))
        .unwrap_or(NaiveDate::MAX)
}

/// Scheduling state of one card on one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Current mastery stage
    pub level: Level,
    /// First day the track is due again
    pub next_review_date: NaiveDate,
}

impl ReviewState {
    /// A freshly created track: level 0, due today.
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            level: Level::NEW,
            next_review_date: today,
        }
    }

    /// Put the track at `level` with the due date recomputed from `today`.
    pub fn at_level(level: Level, today: NaiveDate) -> Self {
        Self {
            level,
            next_review_date: next_review_date(level, today),
        }
    }

    /// Apply a review outcome recorded on `today`.
    ///
    /// The new date is anchored at the day of the review, not at the day the
    /// card was due.
    pub fn apply_outcome(self, successful: bool, today: NaiveDate) -> Self {
        Self::at_level(next_level(self.level, successful), today)
    }

    /// Level 0 is always due; otherwise due once the stored date is reached.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.level.is_new() || self.next_review_date <= date
    }
}

/// The local calendar day, from the system clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
