use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use hzc_srs::{ReviewState, Track};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Fresh random identifier (UUID v4).
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Opaque flashcard identifier. Imported cards keep whatever id they were
    /// exported with, so this is not restricted to UUIDs.
    CardId
);

string_id!(
    /// Opaque category identifier.
    CategoryId
);

/// Example sentence attached to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
}

/// Per-track scheduling state of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTracks {
    pub reading: ReviewState,
    pub listening: ReviewState,
    pub speaking: ReviewState,
}

impl ReviewTracks {
    /// Every track at level 0, due today.
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            reading: ReviewState::new(today),
            listening: ReviewState::new(today),
            speaking: ReviewState::new(today),
        }
    }

    pub const fn get(&self, track: Track) -> &ReviewState {
        match track {
            Track::Reading => &self.reading,
            Track::Listening => &self.listening,
            Track::Speaking => &self.speaking,
        }
    }

    pub fn get_mut(&mut self, track: Track) -> &mut ReviewState {
        match track {
            Track::Reading => &mut self.reading,
            Track::Listening => &mut self.listening,
            Track::Speaking => &mut self.speaking,
        }
    }
}

/// Flashcard model - one Chinese word or phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Unique card identifier, assigned at creation
    pub id: CardId,
    /// Chinese characters; the key for duplicate detection
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    /// Optional usage example
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
    /// Weak reference to a category; cleared when the category is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(flatten)]
    pub tracks: ReviewTracks,
    /// When the card was created
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Build a new card with a fresh id and every track due today.
    pub fn new(
        chinese: impl Into<String>,
        pinyin: impl Into<String>,
        english: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            id: CardId::generate(),
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            english: english.into(),
            example: None,
            category_id: None,
            tracks: ReviewTracks::new(today),
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category_id: impl Into<Option<CategoryId>>) -> Self {
        self.category_id = category_id.into();
        self
    }

    pub const fn review(&self, track: Track) -> &ReviewState {
        self.tracks.get(track)
    }

    pub fn is_due(&self, track: Track, date: NaiveDate) -> bool {
        self.tracks.get(track).is_due(date)
    }
}

/// Category model - groups flashcards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display color token, e.g. `#FF5733`
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: CategoryId::generate(),
            name: name.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }
}

/// Which cards a listing or review session covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CategoryFilter {
    /// No filtering
    #[default]
    All,
    /// Only cards without a category
    Uncategorized,
    /// Only cards in exactly this category
    Category(CategoryId),
}

impl CategoryFilter {
    pub fn matches(&self, card: &Flashcard) -> bool {
        match self {
            Self::All => true,
            Self::Uncategorized => card.category_id.is_none(),
            Self::Category(id) => card.category_id.as_ref() == Some(id),
        }
    }

    /// Parse the query-string form: `all`, `none` or a category id.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("" | "all") => Self::All,
            Some("none" | "uncategorized") => Self::Uncategorized,
            Some(id) => Self::Category(CategoryId::from(id)),
        }
    }
}

impl From<Option<CategoryId>> for CategoryFilter {
    fn from(value: Option<CategoryId>) -> Self {
        value.map_or(Self::Uncategorized, Self::Category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hzc_srs::Level;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn test_new_card_starts_due_on_every_track() {
        let card = Flashcard::new("你好", "nǐ hǎo", "hello", today());
        for track in Track::ALL {
            assert_eq!(card.review(track).level, Level::NEW);
            assert_eq!(card.review(track).next_review_date, today());
            assert!(card.is_due(track, today()));
        }
    }

    #[test]
    fn test_category_filter_matches() {
        let category = CategoryId::from("greetings");
        let tagged = Flashcard::new("你好", "nǐ hǎo", "hello", today())
            .with_category(category.clone());
        let plain = Flashcard::new("谢谢", "xiè xiè", "thanks", today());

        assert!(CategoryFilter::All.matches(&tagged));
        assert!(CategoryFilter::All.matches(&plain));
        assert!(!CategoryFilter::Uncategorized.matches(&tagged));
        assert!(CategoryFilter::Uncategorized.matches(&plain));
        assert!(CategoryFilter::Category(category.clone()).matches(&tagged));
        assert!(!CategoryFilter::Category(category).matches(&plain));
    }

    #[test]
    fn test_category_filter_from_query() {
        assert_eq!(CategoryFilter::from_query(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_query(Some("all")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_query(Some("none")),
            CategoryFilter::Uncategorized
        );
        assert_eq!(
            CategoryFilter::from_query(Some("abc")),
            CategoryFilter::Category(CategoryId::from("abc"))
        );
    }

    #[test]
    fn test_category_filter_serde_shape() {
        let json = serde_json::to_value(CategoryFilter::Category("c1".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "category", "id": "c1" }));

        let parsed: CategoryFilter = serde_json::from_str(r#"{"kind":"uncategorized"}"#).unwrap();
        assert_eq!(parsed, CategoryFilter::Uncategorized);
    }

    #[test]
    fn test_flashcard_json_shape() {
        let card = Flashcard::new("你好", "nǐ hǎo", "hello", today());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["chinese"], "你好");
        assert_eq!(json["reading"]["level"], 0);
        assert_eq!(json["listening"]["nextReviewDate"], "2024-04-02");
        assert!(json.get("categoryId").is_none());
    }
}
