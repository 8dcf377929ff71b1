//! A live, refreshable view of a content root.

use crate::index::{IndexError, IndexOptions, NoteIndex};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Holds the current [`NoteIndex`] snapshot for concurrent readers.
///
/// Readers take an `Arc` and keep a consistent index for as long as they
/// hold it; [`NoteLibrary::refresh`] only swaps in a fully built index.
pub struct NoteLibrary {
    root: PathBuf,
    options: IndexOptions,
    current: RwLock<Arc<NoteIndex>>,
}

impl NoteLibrary {
    pub fn open(root: impl Into<PathBuf>, options: IndexOptions) -> Result<Self, IndexError> {
        let root = root.into();
        let index = NoteIndex::build(&root, &options)?;
        Ok(Self {
            root,
            options,
            current: RwLock::new(Arc::new(index)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot(&self) -> Arc<NoteIndex> {
        self.current.read().clone()
    }

    /// Rebuild from disk. On failure the previous snapshot stays current.
    pub fn refresh(&self) -> Result<Arc<NoteIndex>, IndexError> {
        let index = Arc::new(NoteIndex::build(&self.root, &self.options)?);
        *self.current.write() = index.clone();
        tracing::info!("Refreshed library: {} notes", index.len());
        Ok(index)
    }
}
