pub mod backend;
pub mod models;
pub mod normalization;
pub mod record;
pub mod repositories;
pub mod store;

use std::path::Path;

use chrono::NaiveDate;

pub use backend::{Backend, JsonFileBackend, MemoryBackend, StorageError};
pub use models::{CardId, Category, CategoryFilter, CategoryId, Example, Flashcard, ReviewTracks};
pub use store::{CardStore, DuplicatePolicy, FlashcardRepository, StoreError};

/// Open the JSON file store at `path`, creating it on first write.
pub fn open_json_store(
    path: impl AsRef<Path>,
    duplicate_policy: DuplicatePolicy,
    today: NaiveDate,
) -> Result<CardStore, StorageError> {
    let path = path.as_ref();
    let store = CardStore::open(JsonFileBackend::new(path), duplicate_policy, today)?;
    tracing::info!(path = %path.display(), ?store, "card store opened");
    Ok(store)
}
