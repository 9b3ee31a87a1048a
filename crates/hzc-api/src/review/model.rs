use hzc_db::{CardId, CategoryFilter, Flashcard};
use hzc_srs::Track;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::{ReviewSession, SessionState};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OutcomeRequest {
    pub successful: bool,
}

/// Body of `PUT /reviews/sessions/{id}/filter`. Absent fields keep their
/// current value; `category` takes the same values as the `?category=` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeFilterRequest {
    pub track: Option<Track>,
    pub category: Option<String>,
}

/// What a client needs to render a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub track: Track,
    pub filter: CategoryFilter,
    pub state: SessionState,
    pub remaining: usize,
    pub answered: Vec<CardId>,
    /// Side of the current card shown before the answer is revealed
    pub prompt: Option<String>,
    /// The full current card, once revealed
    pub card: Option<Flashcard>,
}

impl SessionView {
    pub fn new(id: Uuid, session: &ReviewSession) -> Self {
        let current = session.current_card();
        let revealed = matches!(session.state(), SessionState::Active { revealed: true });
        Self {
            id,
            track: session.track(),
            filter: session.filter().clone(),
            state: session.state(),
            remaining: session.remaining(),
            answered: session.answered().to_vec(),
            prompt: current.map(|card| prompt_for(session.track(), card)),
            card: current.filter(|_| revealed).cloned(),
        }
    }
}

/// Reading and listening start from the Chinese (listening plays it as
/// audio on the client); speaking starts from the English.
fn prompt_for(track: Track, card: &Flashcard) -> String {
    match track {
        Track::Reading | Track::Listening => card.chinese.clone(),
        Track::Speaking => card.english.clone(),
    }
}
