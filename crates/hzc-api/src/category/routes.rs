use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use hzc_db::{Category, CategoryId, FlashcardRepository};

use super::model::{
    CreateCategoryRequest, DEFAULT_COLOR, UpdateCategoryRequest, validate_color, validate_name,
};
use crate::{ApiState, error::ApiError};

/// Create the category routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
}

async fn list_categories(State(state): State<ApiState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.store()?.list_categories()))
}

async fn create_category(
    State(state): State<ApiState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    validate_name(&payload.name)?;
    let color = payload.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
    validate_color(&color)?;

    let category = Category::new(payload.name.trim(), color);
    state.store()?.add_category(category.clone())?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }
    if let Some(color) = &payload.color {
        validate_color(color)?;
    }

    let mut store = state.store()?;
    let mut category = store
        .get_category(&CategoryId::from(id.as_str()))
        .ok_or_else(|| ApiError::NotFound(format!("category {id}")))?;
    if let Some(name) = payload.name {
        category.name = name.trim().to_string();
    }
    if let Some(color) = payload.color {
        category.color = color;
    }

    if !store.update_category(category.clone())? {
        return Err(ApiError::NotFound(format!("category {id}")));
    }
    Ok(Json(category))
}

/// Delete a category and detach every card that referenced it.
async fn delete_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store()?.delete_category(&CategoryId::from(id))?;
    Ok(StatusCode::NO_CONTENT)
}
