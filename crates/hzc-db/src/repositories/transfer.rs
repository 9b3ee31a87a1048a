//! Export and import of the whole collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    models::{Category, Flashcard},
    record::StoreDocument,
    store::{FlashcardRepository, StoreError},
};

/// Export files use the same layout as the on-disk document.
pub type ExportDocument = StoreDocument;

/// Snapshot every card and category into an export document stamped `now`.
pub fn export<R>(repo: &R, now: DateTime<Utc>) -> ExportDocument
where
    R: FlashcardRepository + ?Sized,
{
    StoreDocument::from_parts(&repo.list_flashcards(), &repo.list_categories(), Some(now))
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Flashcards inserted or updated
    pub imported: usize,
    /// Flashcard records missing a required field
    pub skipped: usize,
    /// Categories inserted or updated
    pub categories: usize,
}

/// Merge an export document into the store.
///
/// Categories are merged first, then flashcards, both by id: an existing
/// record is updated, an unknown one inserted. Records missing a required
/// field are skipped. Everything is written in a single step, so a failed
/// write leaves the store as it was.
pub fn import<R>(
    repo: &mut R,
    document: &ExportDocument,
    today: NaiveDate,
) -> Result<ImportSummary, StoreError>
where
    R: FlashcardRepository + ?Sized,
{
    let mut summary = ImportSummary::default();

    let mut categories: Vec<Category> = repo.list_categories();
    for record in &document.categories {
        let mut category = match record.normalize() {
            Ok(category) => category,
            Err(e) => {
                tracing::warn!(?record, "skipping invalid category: {e}");
                continue;
            }
        };
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => {
                if record.created_at.is_none() {
                    category.created_at = existing.created_at;
                }
                *existing = category;
            }
            None => categories.push(category),
        }
        summary.categories += 1;
    }

    let mut flashcards: Vec<Flashcard> = repo.list_flashcards();
    for record in &document.flashcards {
        let card = match record.normalize(today) {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!(?record, "skipping invalid flashcard: {e}");
                summary.skipped += 1;
                continue;
            }
        };
        match flashcards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => *existing = record.merge_into(existing),
            None => flashcards.push(card),
        }
        summary.imported += 1;
    }

    repo.replace_all(flashcards, categories)?;
    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        categories = summary.categories,
        "import complete"
    );
    Ok(summary)
}
