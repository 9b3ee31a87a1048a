use chrono::NaiveDate;
use hzc_srs::Track;
use serde::Serialize;

use crate::{
    models::{CardId, CategoryFilter, Flashcard},
    store::{FlashcardRepository, StoreError},
};

/// Record a review outcome for one track of one card.
///
/// The card's level and due date on `track` are recomputed with `today` as
/// the anchor and the card is written back. Returns `Ok(None)` when the card
/// no longer exists, e.g. it was deleted while a session was running.
pub fn apply_review_outcome<R>(
    repo: &mut R,
    card_id: &CardId,
    track: Track,
    successful: bool,
    today: NaiveDate,
) -> Result<Option<Flashcard>, StoreError>
where
    R: FlashcardRepository + ?Sized,
{
    let Some(mut card) = repo.get_flashcard(card_id) else {
        tracing::debug!(%card_id, %track, "review outcome for missing card ignored");
        return Ok(None);
    };

    let before = *card.review(track);
    let after = before.apply_outcome(successful, today);
    *card.tracks.get_mut(track) = after;

    if !repo.update_flashcard(card.clone())? {
        return Ok(None);
    }

    tracing::debug!(
        %card_id,
        %track,
        successful,
        from = %before.level,
        to = %after.level,
        next_review_date = %after.next_review_date,
        "review outcome recorded"
    );
    Ok(Some(card))
}

/// Cards due on `track` on `date`, restricted by `filter`, in store order.
pub fn due_flashcards<R>(
    repo: &R,
    track: Track,
    filter: &CategoryFilter,
    date: NaiveDate,
) -> Vec<Flashcard>
where
    R: FlashcardRepository + ?Sized,
{
    repo.flashcards_matching(filter)
        .into_iter()
        .filter(|card| card.is_due(track, date))
        .collect()
}

/// Number of due cards per track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCounts {
    pub reading: usize,
    pub listening: usize,
    pub speaking: usize,
    pub total_cards: usize,
}

pub fn due_counts<R>(repo: &R, filter: &CategoryFilter, date: NaiveDate) -> DueCounts
where
    R: FlashcardRepository + ?Sized,
{
    let cards = repo.flashcards_matching(filter);
    let count = |track| cards.iter().filter(|c| c.is_due(track, date)).count();
    DueCounts {
        reading: count(Track::Reading),
        listening: count(Track::Listening),
        speaking: count(Track::Speaking),
        total_cards: cards.len(),
    }
}
