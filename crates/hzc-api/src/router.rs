use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{category, flashcard, review, state::ApiState, transfer};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(flashcard::routes())
        .merge(category::routes())
        .merge(review::routes())
        .merge(transfer::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource was not found" })),
    )
}
