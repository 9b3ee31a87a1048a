//! Persisted and exported record shapes, and the migration into domain models.
//!
//! The same document layout is used on disk and for export files:
//!
//! ```json
//! {
//!   "flashcards": [ { "id": "...", "chinese": "你好", "readingReviewLevel": 1, ... } ],
//!   "categories": [ { "id": "...", "name": "Greetings", "color": "#FF5733", ... } ],
//!   "exportDate": "2024-05-01T09:30:00.000Z",
//!   "version": "1.0"
//! }
//! ```
//!
//! Every record field is optional so that older files still load. Cards
//! written before per-track review existed carry only `reviewLevel` and
//! `nextReviewDate`; those values seed every track that has no value of its own.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use hzc_srs::{Level, ReviewState, Track};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::{CardId, Category, CategoryId, Example, Flashcard, ReviewTracks};

/// Version tag written into every document
pub const DOCUMENT_VERSION: &str = "1.0";

/// Why a stored record could not be turned into a domain value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Whole-store document: the unit read and written by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub flashcards: Vec<FlashcardRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            flashcards: Vec::new(),
            categories: Vec::new(),
            export_date: None,
            version: default_version(),
        }
    }
}

impl StoreDocument {
    /// Build a document in the current record shape.
    pub fn from_parts(
        flashcards: &[Flashcard],
        categories: &[Category],
        export_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            flashcards: flashcards.iter().map(FlashcardRecord::from).collect(),
            categories: categories.iter().map(CategoryRecord::from).collect(),
            export_date: export_date.map(format_timestamp),
            version: default_version(),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Flashcard as stored on disk or in an export file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chinese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<Option<String>>,

    // Single-track fields from before reading and listening were split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_review_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_next_review_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listening_review_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listening_next_review_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_review_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_next_review_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl FlashcardRecord {
    fn track_fields(&self, track: Track) -> (Option<i64>, Option<&str>) {
        let (level, date) = match track {
            Track::Reading => (self.reading_review_level, &self.reading_next_review_date),
            Track::Listening => (self.listening_review_level, &self.listening_next_review_date),
            Track::Speaking => (self.speaking_review_level, &self.speaking_next_review_date),
        };
        (level, date.as_deref())
    }

    /// Per-track level and date, falling back to the legacy single-track fields.
    fn resolved_track(&self, track: Track) -> (Option<Level>, Option<NaiveDate>) {
        let (level, date) = self.track_fields(track);
        let level = level.or(self.review_level).map(Level::clamped);
        let date = date
            .and_then(parse_date)
            .or_else(|| self.next_review_date.as_deref().and_then(parse_date));
        (level, date)
    }

    /// Convert into the current per-track shape.
    ///
    /// Tracks with no value of their own take the legacy fields, then fall back
    /// to level 0 and `today`.
    pub fn normalize(&self, today: NaiveDate) -> Result<Flashcard, RecordError> {
        let id = required(&self.id, "id")?;
        let chinese = required(&self.chinese, "chinese")?;
        let pinyin = required(&self.pinyin, "pinyin")?;
        let english = required(&self.english, "english")?;

        let mut tracks = ReviewTracks::new(today);
        for track in Track::ALL {
            let (level, date) = self.resolved_track(track);
            *tracks.get_mut(track) = ReviewState {
                level: level.unwrap_or(Level::NEW),
                next_review_date: date.unwrap_or(today),
            };
        }

        Ok(Flashcard {
            id: CardId::from(id),
            chinese,
            pinyin,
            english,
            example: self.example.clone(),
            category_id: self
                .category_id
                .clone()
                .flatten()
                .filter(|id| !id.is_empty())
                .map(CategoryId::from),
            tracks,
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_else(Utc::now),
        })
    }

    /// Overlay this record onto an existing card.
    ///
    /// Fields the record leaves out keep their current values and an explicit
    /// `categoryId: null` clears the category. `createdAt` is never replaced.
    /// Only per-track review fields apply here: the legacy single-track fields
    /// seed new cards but never overwrite a stored schedule.
    pub fn merge_into(&self, existing: &Flashcard) -> Flashcard {
        let mut card = existing.clone();
        if let Some(chinese) = non_empty(&self.chinese) {
            card.chinese = chinese;
        }
        if let Some(pinyin) = non_empty(&self.pinyin) {
            card.pinyin = pinyin;
        }
        if let Some(english) = non_empty(&self.english) {
            card.english = english;
        }
        if let Some(example) = &self.example {
            card.example = Some(example.clone());
        }
        if let Some(category_id) = &self.category_id {
            card.category_id = category_id
                .clone()
                .filter(|id| !id.is_empty())
                .map(CategoryId::from);
        }
        for track in Track::ALL {
            let (level, date) = self.track_fields(track);
            let state = card.tracks.get_mut(track);
            if let Some(level) = level {
                state.level = Level::clamped(level);
            }
            if let Some(date) = date.and_then(parse_date) {
                state.next_review_date = date;
            }
        }
        card
    }

    /// Whether this record is already in the shape [`From<&Flashcard>`] writes.
    pub fn is_canonical(&self, card: &Flashcard) -> bool {
        *self == Self::from(card)
    }
}

impl From<&Flashcard> for FlashcardRecord {
    fn from(card: &Flashcard) -> Self {
        let level = |track| Some(i64::from(card.review(track).level.value()));
        let date = |track| Some(card.review(track).next_review_date.to_string());
        Self {
            id: Some(card.id.to_string()),
            chinese: Some(card.chinese.clone()),
            pinyin: Some(card.pinyin.clone()),
            english: Some(card.english.clone()),
            example: card.example.clone(),
            category_id: card
                .category_id
                .as_ref()
                .map(|id| Some(id.to_string())),
            // Mirrors reading so older readers still see a schedule.
            review_level: level(Track::Reading),
            next_review_date: date(Track::Reading),
            reading_review_level: level(Track::Reading),
            reading_next_review_date: date(Track::Reading),
            listening_review_level: level(Track::Listening),
            listening_next_review_date: date(Track::Listening),
            speaking_review_level: level(Track::Speaking),
            speaking_next_review_date: date(Track::Speaking),
            created_at: Some(format_timestamp(card.created_at)),
        }
    }
}

/// Category as stored on disk or in an export file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CategoryRecord {
    /// Convert into a [`Category`]; `id`, `name` and `color` are required.
    pub fn normalize(&self) -> Result<Category, RecordError> {
        Ok(Category {
            id: CategoryId::from(required(&self.id, "id")?),
            name: required(&self.name, "name")?,
            color: required(&self.color, "color")?,
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_else(Utc::now),
        })
    }
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id.to_string()),
            name: Some(category.name.clone()),
            color: Some(category.color.clone()),
            created_at: Some(format_timestamp(category.created_at)),
        }
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, RecordError> {
    non_empty(value).ok_or(RecordError::MissingField(field))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse `YYYY-MM-DD`, or the date part of an ISO timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    value
        .trim()
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            parse_date(value)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
