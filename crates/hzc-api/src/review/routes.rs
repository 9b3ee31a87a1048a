use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use hzc_db::{
    CardId, CategoryFilter, Flashcard,
    repositories::review::{DueCounts, apply_review_outcome, due_counts, due_flashcards},
};
use hzc_srs::{ParseTrackError, Track, today};
use uuid::Uuid;

use super::{
    model::{ChangeFilterRequest, OutcomeRequest, SessionView},
    session::ReviewSession,
};
use crate::{ApiState, error::ApiError, flashcard::model::CategoryQuery, metrics::record_review};

/// Create the review and review-session routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/reviews/due-counts", get(get_due_counts))
        .route("/reviews/{track}/due", get(get_due))
        .route("/reviews/{track}/{card_id}", post(submit_review))
        .route("/reviews/{track}/sessions", post(start_session))
        .route(
            "/reviews/sessions/{id}",
            get(get_session).delete(end_session),
        )
        .route("/reviews/sessions/{id}/reveal", post(reveal_answer))
        .route("/reviews/sessions/{id}/outcome", post(record_outcome))
        .route("/reviews/sessions/{id}/filter", put(change_filter))
}

fn parse_track(track: &str) -> Result<Track, ApiError> {
    track
        .parse()
        .map_err(|e: ParseTrackError| ApiError::Validation(e.to_string()))
}

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("review session {id}"))
}

async fn get_due_counts(
    State(state): State<ApiState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<DueCounts>, ApiError> {
    let store = state.store()?;
    Ok(Json(due_counts(&*store, &query.filter(), today())))
}

async fn get_due(
    State(state): State<ApiState>,
    Path(track): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let track = parse_track(&track)?;
    let store = state.store()?;
    Ok(Json(due_flashcards(&*store, track, &query.filter(), today())))
}

/// Record one outcome outside of a session. A card that no longer exists
/// answers 204 and nothing is written.
async fn submit_review(
    State(state): State<ApiState>,
    Path((track, card_id)): Path<(String, String)>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<Response, ApiError> {
    let track = parse_track(&track)?;
    let mut store = state.store()?;
    let updated = apply_review_outcome(
        &mut *store,
        &CardId::from(card_id),
        track,
        payload.successful,
        today(),
    )?;

    Ok(match updated {
        Some(card) => {
            record_review(track, payload.successful);
            Json(card).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn start_session(
    State(state): State<ApiState>,
    Path(track): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let track = parse_track(&track)?;
    let mut session = ReviewSession::new(track, query.filter());
    {
        let store = state.store()?;
        session.start(&*store, today(), &mut rand::thread_rng());
    }

    let id = Uuid::new_v4();
    let view = SessionView::new(id, &session);
    state.sessions()?.insert(id, session);
    tracing::info!(%id, %track, cards = view.remaining, "review session created");
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let sessions = state.sessions()?;
    let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
    Ok(Json(SessionView::new(id, session)))
}

async fn reveal_answer(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions()?;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    session.show_answer();
    Ok(Json(SessionView::new(id, session)))
}

async fn record_outcome(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions()?;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;

    let recorded = {
        let mut store = state.store()?;
        session.record_outcome(&mut *store, payload.successful, today())?
    };
    if recorded {
        record_review(session.track(), payload.successful);
    }
    Ok(Json(SessionView::new(id, session)))
}

async fn change_filter(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeFilterRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions()?;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;

    let track = payload.track.unwrap_or(session.track());
    let filter = match payload.category.as_deref() {
        Some(category) => CategoryFilter::from_query(Some(category)),
        None => session.filter().clone(),
    };
    {
        let store = state.store()?;
        session.restart(&*store, track, filter, today(), &mut rand::thread_rng());
    }
    Ok(Json(SessionView::new(id, session)))
}

async fn end_session(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions()?.remove(&id).is_some() {
        tracing::info!(%id, "review session ended");
    }
    Ok(StatusCode::NO_CONTENT)
}
