use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    backend::{Backend, MemoryBackend, StorageError},
    models::{CardId, Category, CategoryFilter, CategoryId, Flashcard},
    normalization::normalize_chinese_key,
    record::StoreDocument,
};

/// Errors returned by store mutations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A card with the same normalized Chinese text exists
    #[error("a flashcard for '{chinese}' already exists")]
    Duplicate {
        /// Trimmed text of the rejected card
        chinese: String,
    },

    /// The id of a new card or category is taken
    #[error("id '{0}' is already in use")]
    DuplicateId(String),

    /// The backend refused the write
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Whether adding a card whose Chinese text already exists is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Refuse the new card
    #[default]
    Reject,
    /// Store it alongside the existing one
    Allow,
}

/// Keyed storage for flashcards and categories.
///
/// Reads are infallible; mutations only fail on duplicates or when the
/// persistence layer refuses the write, in which case nothing changes.
/// Updating or deleting an unknown id is a no-op that returns `Ok(false)`.
pub trait FlashcardRepository {
    /// All cards, in insertion order.
    fn list_flashcards(&self) -> Vec<Flashcard>;

    /// The card with `id`, if any.
    fn get_flashcard(&self, id: &CardId) -> Option<Flashcard>;

    /// Insert a new card, subject to the duplicate policy.
    fn add_flashcard(&mut self, card: Flashcard) -> Result<(), StoreError>;

    /// Replace the card with the same id.
    fn update_flashcard(&mut self, card: Flashcard) -> Result<bool, StoreError>;

    /// Remove a card. Returns whether it existed.
    fn delete_flashcard(&mut self, id: &CardId) -> Result<bool, StoreError>;

    /// All categories, in insertion order.
    fn list_categories(&self) -> Vec<Category>;

    /// The category with `id`, if any.
    fn get_category(&self, id: &CategoryId) -> Option<Category> {
        self.list_categories().into_iter().find(|c| &c.id == id)
    }

    /// Insert a new category.
    fn add_category(&mut self, category: Category) -> Result<(), StoreError>;

    /// Replace the category with the same id.
    fn update_category(&mut self, category: Category) -> Result<bool, StoreError>;

    /// Delete a category and clear it from every card that referenced it, as
    /// one write.
    fn delete_category(&mut self, id: &CategoryId) -> Result<bool, StoreError>;

    /// Replace the whole contents in one write. Used by import.
    fn replace_all(
        &mut self,
        flashcards: Vec<Flashcard>,
        categories: Vec<Category>,
    ) -> Result<(), StoreError>;

    /// `None` selects cards without a category.
    fn get_flashcards_by_category(&self, category_id: Option<&CategoryId>) -> Vec<Flashcard> {
        self.list_flashcards()
            .into_iter()
            .filter(|card| card.category_id.as_ref() == category_id)
            .collect()
    }

    /// Cards selected by `filter`, in insertion order.
    fn flashcards_matching(&self, filter: &CategoryFilter) -> Vec<Flashcard> {
        self.list_flashcards()
            .into_iter()
            .filter(|card| filter.matches(card))
            .collect()
    }
}

/// Card store backed by a [`Backend`].
///
/// The full working set is kept in memory. Every mutation builds the new
/// state, writes it through the backend, and only then swaps it in.
pub struct CardStore {
    backend: Box<dyn Backend>,
    flashcards: Vec<Flashcard>,
    categories: Vec<Category>,
    duplicate_policy: DuplicatePolicy,
}

impl std::fmt::Debug for CardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardStore")
            .field("flashcards", &self.flashcards.len())
            .field("categories", &self.categories.len())
            .field("duplicate_policy", &self.duplicate_policy)
            .finish_non_exhaustive()
    }
}

impl CardStore {
    /// Load the store, migrating any legacy-shaped records.
    ///
    /// Invalid records are dropped and dangling category references cleared.
    /// If anything had to change, the normalized document is written back once.
    pub fn open(
        backend: impl Backend + 'static,
        duplicate_policy: DuplicatePolicy,
        today: NaiveDate,
    ) -> Result<Self, StorageError> {
        let mut backend: Box<dyn Backend> = Box::new(backend);
        let document = backend.read_all()?;
        let mut needs_rewrite = false;

        let mut categories: Vec<Category> = Vec::with_capacity(document.categories.len());
        for record in &document.categories {
            match record.normalize() {
                Ok(category) if categories.iter().any(|c| c.id == category.id) => {
                    tracing::warn!(id = %category.id, "dropping category with duplicate id");
                    needs_rewrite = true;
                }
                Ok(category) => categories.push(category),
                Err(e) => {
                    tracing::warn!(?record, "dropping invalid category: {e}");
                    needs_rewrite = true;
                }
            }
        }

        let mut flashcards: Vec<Flashcard> = Vec::with_capacity(document.flashcards.len());
        for record in &document.flashcards {
            let mut card = match record.normalize(today) {
                Ok(card) => card,
                Err(e) => {
                    tracing::warn!(?record, "dropping invalid flashcard: {e}");
                    needs_rewrite = true;
                    continue;
                }
            };
            if flashcards.iter().any(|c| c.id == card.id) {
                tracing::warn!(id = %card.id, "dropping flashcard with duplicate id");
                needs_rewrite = true;
                continue;
            }
            if !record.is_canonical(&card) {
                needs_rewrite = true;
            }
            if clear_dangling_category(&mut card, &categories) {
                needs_rewrite = true;
            }
            flashcards.push(card);
        }

        if needs_rewrite {
            tracing::info!(
                flashcards = flashcards.len(),
                categories = categories.len(),
                "migrated stored records to the current format"
            );
            backend.write_all(&StoreDocument::from_parts(&flashcards, &categories, None))?;
        }

        Ok(Self {
            backend,
            flashcards,
            categories,
            duplicate_policy,
        })
    }

    /// Empty store that lives only in memory.
    pub fn in_memory(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            flashcards: Vec::new(),
            categories: Vec::new(),
            duplicate_policy,
        }
    }

    /// Current duplicate policy
    pub const fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Change the policy for later additions; existing cards are kept.
    pub fn set_duplicate_policy(&mut self, policy: DuplicatePolicy) {
        self.duplicate_policy = policy;
    }

    fn commit(
        &mut self,
        flashcards: Vec<Flashcard>,
        categories: Vec<Category>,
    ) -> Result<(), StorageError> {
        self.backend
            .write_all(&StoreDocument::from_parts(&flashcards, &categories, None))?;
        self.flashcards = flashcards;
        self.categories = categories;
        Ok(())
    }

    fn position(&self, id: &CardId) -> Option<usize> {
        self.flashcards.iter().position(|c| &c.id == id)
    }

    fn find_duplicate(&self, chinese: &str) -> Option<&Flashcard> {
        let key = normalize_chinese_key(chinese);
        self.flashcards
            .iter()
            .find(|c| normalize_chinese_key(&c.chinese) == key)
    }
}

/// Clear a category reference that does not resolve. Returns whether it did.
fn clear_dangling_category(card: &mut Flashcard, categories: &[Category]) -> bool {
    let dangling = card
        .category_id
        .as_ref()
        .is_some_and(|id| !categories.iter().any(|c| &c.id == id));
    if dangling {
        tracing::warn!(card = %card.id, category = ?card.category_id, "clearing unknown category reference");
        card.category_id = None;
    }
    dangling
}

impl FlashcardRepository for CardStore {
    fn list_flashcards(&self) -> Vec<Flashcard> {
        self.flashcards.clone()
    }

    fn get_flashcard(&self, id: &CardId) -> Option<Flashcard> {
        self.flashcards.iter().find(|c| &c.id == id).cloned()
    }

    fn add_flashcard(&mut self, mut card: Flashcard) -> Result<(), StoreError> {
        if self.position(&card.id).is_some() {
            return Err(StoreError::DuplicateId(card.id.to_string()));
        }
        if self.duplicate_policy == DuplicatePolicy::Reject {
            if let Some(existing) = self.find_duplicate(&card.chinese) {
                tracing::debug!(existing = %existing.id, "rejecting duplicate flashcard");
                return Err(StoreError::Duplicate {
                    chinese: card.chinese.trim().to_string(),
                });
            }
        }
        clear_dangling_category(&mut card, &self.categories);

        let (id, chinese) = (card.id.clone(), card.chinese.clone());
        let mut flashcards = self.flashcards.clone();
        flashcards.push(card);
        let categories = self.categories.clone();
        self.commit(flashcards, categories)?;
        tracing::info!(%id, %chinese, "flashcard added");
        Ok(())
    }

    fn update_flashcard(&mut self, mut card: Flashcard) -> Result<bool, StoreError> {
        let Some(index) = self.position(&card.id) else {
            return Ok(false);
        };
        clear_dangling_category(&mut card, &self.categories);

        let mut flashcards = self.flashcards.clone();
        flashcards[index] = card;
        let categories = self.categories.clone();
        self.commit(flashcards, categories)?;
        Ok(true)
    }

    fn delete_flashcard(&mut self, id: &CardId) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let mut flashcards = self.flashcards.clone();
        flashcards.remove(index);
        let categories = self.categories.clone();
        self.commit(flashcards, categories)?;
        tracing::info!(%id, "flashcard deleted");
        Ok(true)
    }

    fn list_categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    fn add_category(&mut self, category: Category) -> Result<(), StoreError> {
        if self.categories.iter().any(|c| c.id == category.id) {
            return Err(StoreError::DuplicateId(category.id.to_string()));
        }

        let (id, name) = (category.id.clone(), category.name.clone());
        let mut categories = self.categories.clone();
        categories.push(category);
        let flashcards = self.flashcards.clone();
        self.commit(flashcards, categories)?;
        tracing::info!(%id, %name, "category added");
        Ok(())
    }

    fn update_category(&mut self, category: Category) -> Result<bool, StoreError> {
        let Some(index) = self.categories.iter().position(|c| c.id == category.id) else {
            return Ok(false);
        };

        let mut categories = self.categories.clone();
        categories[index] = category;
        let flashcards = self.flashcards.clone();
        self.commit(flashcards, categories)?;
        Ok(true)
    }

    fn delete_category(&mut self, id: &CategoryId) -> Result<bool, StoreError> {
        if !self.categories.iter().any(|c| &c.id == id) {
            return Ok(false);
        }

        let categories: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| &c.id != id)
            .cloned()
            .collect();
        let mut cleared = 0usize;
        let flashcards: Vec<Flashcard> = self
            .flashcards
            .iter()
            .cloned()
            .map(|mut card| {
                if card.category_id.as_ref() == Some(id) {
                    card.category_id = None;
                    cleared += 1;
                }
                card
            })
            .collect();

        self.commit(flashcards, categories)?;
        tracing::info!(%id, cleared, "category deleted");
        Ok(true)
    }

    fn replace_all(
        &mut self,
        mut flashcards: Vec<Flashcard>,
        categories: Vec<Category>,
    ) -> Result<(), StoreError> {
        for card in &mut flashcards {
            clear_dangling_category(card, &categories);
        }
        self.commit(flashcards, categories)?;
        Ok(())
    }
}
