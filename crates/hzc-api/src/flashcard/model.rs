use hzc_db::{CategoryFilter, CategoryId, Example};
use hzc_srs::{Level, Track};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// Present-and-null deserializes to `Some(None)`, absent to `None`.
pub(crate) fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `?category=all|none|<id>` on listing and review endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

impl CategoryQuery {
    pub fn filter(&self) -> CategoryFilter {
        CategoryFilter::from_query(self.category.as_deref())
    }
}

/// Body of `POST /flashcards`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlashcardRequest {
    pub chinese: String,
    /// Generated locally when omitted
    #[serde(default)]
    pub pinyin: Option<String>,
    pub english: String,
    #[serde(default)]
    pub example: Option<Example>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// Body of `POST /flashcards/translate`
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    pub chinese: String,
}

/// Body of `PUT /flashcards/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlashcardRequest {
    pub chinese: Option<String>,
    pub pinyin: Option<String>,
    pub english: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub example: Option<Option<Example>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub category_id: Option<Option<CategoryId>>,
    /// Manual level overrides; the track's next date is recomputed from today
    pub reading_level: Option<i64>,
    pub listening_level: Option<i64>,
    pub speaking_level: Option<i64>,
}

impl UpdateFlashcardRequest {
    /// Validated level overrides, one per track that has one.
    pub fn level_overrides(&self) -> Result<Vec<(Track, Level)>, ApiError> {
        [
            (Track::Reading, self.reading_level),
            (Track::Listening, self.listening_level),
            (Track::Speaking, self.speaking_level),
        ]
        .into_iter()
        .filter_map(|(track, level)| level.map(|l| (track, l)))
        .map(|(track, level)| {
            Level::new(level)
                .map(|level| (track, level))
                .map_err(|e| ApiError::Validation(format!("{track} level: {e}")))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UpdateFlashcardRequest = serde_json::from_str(r#"{"english":"hi"}"#).unwrap();
        assert_eq!(absent.category_id, None);
        assert_eq!(absent.english.as_deref(), Some("hi"));

        let cleared: UpdateFlashcardRequest =
            serde_json::from_str(r#"{"categoryId":null,"example":null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));
        assert_eq!(cleared.example, Some(None));

        let set: UpdateFlashcardRequest = serde_json::from_str(r#"{"categoryId":"k1"}"#).unwrap();
        assert_eq!(set.category_id, Some(Some(CategoryId::from("k1"))));
    }

    #[test]
    fn test_level_overrides() {
        let request = UpdateFlashcardRequest {
            listening_level: Some(4),
            ..Default::default()
        };
        let overrides = request.level_overrides().unwrap();
        assert_eq!(overrides, vec![(Track::Listening, Level::new(4).unwrap())]);

        let invalid = UpdateFlashcardRequest {
            reading_level: Some(9),
            ..Default::default()
        };
        assert!(matches!(
            invalid.level_overrides(),
            Err(ApiError::Validation(_))
        ));
    }
}
