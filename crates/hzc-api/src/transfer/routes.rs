use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use hzc_db::repositories::transfer::{ExportDocument, ImportSummary, export, import};
use hzc_srs::today;

use crate::{ApiState, error::ApiError};

/// Create the export/import routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/export", get(export_all))
        .route("/import", post(import_document))
}

/// Download every card and category as an attachment
async fn export_all(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let document = export(&*state.store()?, now);
    let disposition = format!(
        "attachment; filename=\"flashcards-export-{}.json\"",
        now.format("%Y-%m-%d")
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(document)))
}

async fn import_document(
    State(state): State<ApiState>,
    Json(document): Json<ExportDocument>,
) -> Result<Json<ImportSummary>, ApiError> {
    let summary = import(&mut *state.store()?, &document, today())?;
    Ok(Json(summary))
}
