//! One review pass over the due cards of a single track.
//!
//! The session keeps its own queue of card snapshots; the store is handed
//! in on every call that needs it. The card at the front of the queue is
//! the one being shown, so advancing is a pop and re-queueing a failed card
//! is a push to the back.

use std::collections::VecDeque;

use chrono::NaiveDate;
use hzc_db::{
    CardId, CategoryFilter, Flashcard, FlashcardRepository, StoreError,
    repositories::review::{apply_review_outcome, due_flashcards},
};
use hzc_srs::Track;
use rand::{Rng, seq::SliceRandom};
use serde::Serialize;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    /// Due cards not loaded yet
    Loading,
    /// A card is showing; `revealed` once its answer is visible
    Active { revealed: bool },
    /// Nothing left to review
    Finished,
}

/// Queue-driven review of the cards due on one track
#[derive(Debug, Clone)]
pub struct ReviewSession {
    track: Track,
    filter: CategoryFilter,
    state: SessionState,
    queue: VecDeque<Flashcard>,
    answered: Vec<CardId>,
}

impl ReviewSession {
    /// A session in the `Loading` state; call [`start`](Self::start) next.
    pub const fn new(track: Track, filter: CategoryFilter) -> Self {
        Self {
            track,
            filter,
            state: SessionState::Loading,
            queue: VecDeque::new(),
            answered: Vec::new(),
        }
    }

    /// Load and shuffle the due cards, discarding any previous progress.
    pub fn start<R, G>(&mut self, repo: &R, today: NaiveDate, rng: &mut G)
    where
        R: FlashcardRepository + ?Sized,
        G: Rng + ?Sized,
    {
        self.state = SessionState::Loading;
        self.answered.clear();

        let mut due = due_flashcards(repo, self.track, &self.filter, today);
        due.shuffle(rng);
        self.queue = due.into();

        self.state = if self.queue.is_empty() {
            SessionState::Finished
        } else {
            SessionState::Active { revealed: false }
        };
        tracing::debug!(
            track = %self.track,
            filter = ?self.filter,
            cards = self.queue.len(),
            "review session started"
        );
    }

    /// Switch track or filter and start over.
    pub fn restart<R, G>(
        &mut self,
        repo: &R,
        track: Track,
        filter: CategoryFilter,
        today: NaiveDate,
        rng: &mut G,
    ) where
        R: FlashcardRepository + ?Sized,
        G: Rng + ?Sized,
    {
        self.track = track;
        self.filter = filter;
        self.start(repo, today, rng);
    }

    /// Reveal the answer of the current card. Returns whether anything changed.
    pub fn show_answer(&mut self) -> bool {
        match self.state {
            SessionState::Active { revealed: false } => {
                self.state = SessionState::Active { revealed: true };
                true
            }
            _ => false,
        }
    }

    /// Record the learner's verdict on the current, revealed card.
    ///
    /// Successful cards leave the queue; failed ones go to the back so they
    /// come round again in this session. A card that has disappeared from
    /// the store counts as answered. Returns `Ok(false)` when no card is
    /// revealed. On a storage error the session is left as it was.
    pub fn record_outcome<R>(
        &mut self,
        repo: &mut R,
        successful: bool,
        today: NaiveDate,
    ) -> Result<bool, StoreError>
    where
        R: FlashcardRepository + ?Sized,
    {
        if self.state != (SessionState::Active { revealed: true }) {
            return Ok(false);
        }
        let Some(current) = self.queue.front() else {
            self.state = SessionState::Finished;
            return Ok(false);
        };

        let updated = apply_review_outcome(repo, &current.id, self.track, successful, today)?;
        let Some(card) = self.queue.pop_front() else {
            return Ok(false);
        };

        match updated {
            Some(updated) if !successful => self.queue.push_back(updated),
            _ => self.mark_answered(card.id),
        }

        self.state = if self.queue.is_empty() {
            SessionState::Finished
        } else {
            SessionState::Active { revealed: false }
        };
        Ok(true)
    }

    fn mark_answered(&mut self, id: CardId) {
        if !self.answered.contains(&id) {
            self.answered.push(id);
        }
    }

    /// Track under review
    pub const fn track(&self) -> Track {
        self.track
    }

    /// Category filter applied when loading
    pub const fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Current lifecycle state
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether every card has been completed
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Card being shown, while the session is active
    pub fn current_card(&self) -> Option<&Flashcard> {
        match self.state {
            SessionState::Active { .. } => self.queue.front(),
            _ => None,
        }
    }

    /// Cards still queued, the current one included.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Ids of cards completed in this session, in the order they were done.
    pub fn answered(&self) -> &[CardId] {
        &self.answered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hzc_db::{Category, CardStore, DuplicatePolicy};
    use hzc_srs::Level;
    use rand::{SeedableRng, rngs::StdRng};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn store_with(words: &[&str]) -> (CardStore, Vec<Flashcard>) {
        let mut store = CardStore::in_memory(DuplicatePolicy::Reject);
        let cards: Vec<_> = words
            .iter()
            .map(|w| Flashcard::new(*w, "pīn", "meaning", today()))
            .collect();
        for card in &cards {
            store.add_flashcard(card.clone()).unwrap();
        }
        (store, cards)
    }

    fn answer(session: &mut ReviewSession, store: &mut CardStore, successful: bool) -> CardId {
        let id = session.current_card().unwrap().id.clone();
        assert!(session.show_answer());
        assert!(session.record_outcome(store, successful, today()).unwrap());
        id
    }

    #[test]
    fn test_new_session_is_loading() {
        let session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        assert_eq!(session.state(), SessionState::Loading);
        assert!(session.current_card().is_none());
    }

    #[test]
    fn test_empty_due_set_finishes_immediately() {
        let store = CardStore::in_memory(DuplicatePolicy::Reject);
        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());
        assert!(session.is_finished());
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn test_start_shuffles_whole_due_set() {
        let (store, cards) = store_with(&["一", "二", "三", "四", "五"]);
        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());

        assert_eq!(session.state(), SessionState::Active { revealed: false });
        assert_eq!(session.remaining(), cards.len());
        let mut queued: Vec<_> = session.queue.iter().map(|c| c.id.clone()).collect();
        let mut expected: Vec<_> = cards.into_iter().map(|c| c.id).collect();
        queued.sort();
        expected.sort();
        assert_eq!(queued, expected);
    }

    #[test]
    fn test_outcome_requires_reveal() {
        let (mut store, _) = store_with(&["一"]);
        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());

        assert!(!session.record_outcome(&mut store, true, today()).unwrap());
        assert_eq!(session.remaining(), 1);

        assert!(session.show_answer());
        assert!(!session.show_answer());
        assert_eq!(session.state(), SessionState::Active { revealed: true });
    }

    #[test]
    fn test_failed_cards_are_requeued_until_answered() {
        let (mut store, _) = store_with(&["X", "Y", "Z"]);
        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());

        let first = answer(&mut session, &mut store, false);
        let second = answer(&mut session, &mut store, true);
        let third = answer(&mut session, &mut store, false);
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.current_card().unwrap().id, first);

        assert_eq!(answer(&mut session, &mut store, true), first);
        assert_eq!(answer(&mut session, &mut store, true), third);

        assert!(session.is_finished());
        assert_eq!(session.remaining(), 0);
        assert_eq!(session.answered(), &[second, first, third]);
    }

    #[test]
    fn test_outcomes_are_persisted() {
        let (mut store, cards) = store_with(&["你好"]);
        let mut session = ReviewSession::new(Track::Listening, CategoryFilter::All);
        session.start(&store, today(), &mut rng());
        answer(&mut session, &mut store, true);

        let stored = store.get_flashcard(&cards[0].id).unwrap();
        assert_eq!(stored.review(Track::Listening).level, Level::new(1).unwrap());
        assert_eq!(stored.review(Track::Reading).level, Level::NEW);
    }

    #[test]
    fn test_deleted_card_counts_as_answered() {
        let (mut store, _) = store_with(&["一", "二"]);
        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());

        let current = session.current_card().unwrap().id.clone();
        store.delete_flashcard(&current).unwrap();
        assert_eq!(answer(&mut session, &mut store, false), current);

        assert_eq!(session.answered(), &[current]);
        assert_eq!(session.remaining(), 1);
        assert_eq!(store.list_flashcards().len(), 1);
    }

    #[test]
    fn test_restart_with_filter_discards_progress() {
        let (mut store, _) = store_with(&["一", "二"]);
        let category = Category::new("Numbers", "#123456");
        store.add_category(category.clone()).unwrap();
        let tagged = Flashcard::new("三", "sān", "three", today()).with_category(category.id.clone());
        store.add_flashcard(tagged.clone()).unwrap();

        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());
        assert_eq!(session.remaining(), 3);
        answer(&mut session, &mut store, true);

        session.restart(
            &store,
            Track::Speaking,
            CategoryFilter::Category(category.id),
            today(),
            &mut rng(),
        );
        assert_eq!(session.track(), Track::Speaking);
        assert!(session.answered().is_empty());
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.current_card().unwrap().id, tagged.id);
    }

    #[test]
    fn test_finished_session_ignores_input() {
        let (mut store, _) = store_with(&["一"]);
        let mut session = ReviewSession::new(Track::Reading, CategoryFilter::All);
        session.start(&store, today(), &mut rng());
        answer(&mut session, &mut store, true);

        assert!(session.is_finished());
        assert!(!session.show_answer());
        assert!(!session.record_outcome(&mut store, true, today()).unwrap());
    }
}
