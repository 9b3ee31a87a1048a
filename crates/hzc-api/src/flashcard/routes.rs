use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use hzc_db::{CardId, Flashcard, FlashcardRepository};
use hzc_srs::{ReviewState, today};

use super::model::{
    CategoryQuery, CreateFlashcardRequest, TranslateRequest, UpdateFlashcardRequest,
};
use crate::{
    ApiState,
    error::ApiError,
    pinyin::to_pinyin,
    translation::{Translation, translate_with_fallback},
    validation::{validate_chinese_text, validate_non_empty},
};

/// Create the flashcard routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/flashcards", get(list_flashcards).post(create_flashcard))
        .route("/flashcards/translate", post(translate))
        .route(
            "/flashcards/{id}",
            get(get_flashcard)
                .put(update_flashcard)
                .delete(delete_flashcard),
        )
}

async fn list_flashcards(
    State(state): State<ApiState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let store = state.store()?;
    Ok(Json(store.flashcards_matching(&query.filter())))
}

async fn get_flashcard(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Flashcard>, ApiError> {
    let store = state.store()?;
    store
        .get_flashcard(&CardId::from(id.as_str()))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("flashcard {id}")))
}

async fn create_flashcard(
    State(state): State<ApiState>,
    Json(payload): Json<CreateFlashcardRequest>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    validate_chinese_text(&payload.chinese)?;
    validate_non_empty("english", &payload.english)?;

    let chinese = payload.chinese.trim().to_string();
    let pinyin = match payload.pinyin.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => to_pinyin(&chinese),
    };

    let mut card = Flashcard::new(chinese, pinyin, payload.english.trim(), today());
    card.example = payload.example;
    card.category_id = payload.category_id;

    let mut store = state.store()?;
    store.add_flashcard(card.clone())?;
    let card = store.get_flashcard(&card.id).unwrap_or(card);
    Ok((StatusCode::CREATED, Json(card)))
}

async fn translate(
    State(state): State<ApiState>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<Translation>, ApiError> {
    validate_chinese_text(&payload.chinese)?;
    let translation = translate_with_fallback(state.translator.as_ref(), payload.chinese.trim())?;
    Ok(Json(translation))
}

async fn update_flashcard(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFlashcardRequest>,
) -> Result<Json<Flashcard>, ApiError> {
    if let Some(chinese) = &payload.chinese {
        validate_chinese_text(chinese)?;
    }
    if let Some(english) = &payload.english {
        validate_non_empty("english", english)?;
    }
    let overrides = payload.level_overrides()?;

    let mut store = state.store()?;
    let mut card = store
        .get_flashcard(&CardId::from(id.as_str()))
        .ok_or_else(|| ApiError::NotFound(format!("flashcard {id}")))?;

    if let Some(chinese) = payload.chinese {
        card.chinese = chinese.trim().to_string();
    }
    if let Some(pinyin) = payload.pinyin {
        card.pinyin = pinyin.trim().to_string();
    }
    if let Some(english) = payload.english {
        card.english = english.trim().to_string();
    }
    if let Some(example) = payload.example {
        card.example = example;
    }
    if let Some(category_id) = payload.category_id {
        card.category_id = category_id;
    }
    let today = today();
    for (track, level) in overrides {
        *card.tracks.get_mut(track) = ReviewState::at_level(level, today);
    }

    if !store.update_flashcard(card.clone())? {
        return Err(ApiError::NotFound(format!("flashcard {id}")));
    }
    // The store may have dropped a category that does not exist.
    let card = store.get_flashcard(&card.id).unwrap_or(card);
    Ok(Json(card))
}

async fn delete_flashcard(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Deleting an unknown card is a no-op.
    state.store()?.delete_flashcard(&CardId::from(id))?;
    Ok(StatusCode::NO_CONTENT)
}
