//! Persistence substrates for the card store.
//!
//! A backend only knows how to read and write a whole [`StoreDocument`].
//! Scheduling and referential integrity live above it in
//! [`CardStore`](crate::store::CardStore).

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::record::StoreDocument;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-all / write-all persistence contract.
pub trait Backend: Send {
    fn read_all(&self) -> Result<StoreDocument, StorageError>;

    /// Replace the stored document. On error the previous document must still
    /// be readable.
    fn write_all(&mut self, document: &StoreDocument) -> Result<(), StorageError>;
}

/// Keeps the document in memory. Used by tests and throwaway stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    document: StoreDocument,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document, e.g. legacy fixtures.
    pub fn with_document(document: StoreDocument) -> Self {
        Self {
            document,
            writes: 0,
        }
    }

    pub const fn document(&self) -> &StoreDocument {
        &self.document
    }

    /// Number of successful `write_all` calls.
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl Backend for MemoryBackend {
    fn read_all(&self) -> Result<StoreDocument, StorageError> {
        Ok(self.document.clone())
    }

    fn write_all(&mut self, document: &StoreDocument) -> Result<(), StorageError> {
        self.document = document.clone();
        self.writes += 1;
        Ok(())
    }
}

/// Stores the document as pretty-printed JSON in a single file.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the old file intact.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "flashcards.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backend for JsonFileBackend {
    fn read_all(&self) -> Result<StoreDocument, StorageError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&mut self, document: &StoreDocument) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            flashcards = document.flashcards.len(),
            categories = document.categories.len(),
            "store written"
        );
        Ok(())
    }
}
