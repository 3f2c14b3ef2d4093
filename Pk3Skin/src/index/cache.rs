//! Process-wide cached index
//!
//! Building an index reads every archive's directory, so the browser keeps the
//! last one around and only rebuilds when the scan root changes or someone
//! asks for a refresh.

use std::path::Path;

use super::AssetIndex;
use super::types::{IndexOptions, IndexProgressCallback};
use crate::error::Result;
use crate::utils::resolve_scan_root;

/// Holds at most one index, tagged with the scan root it was built from.
#[derive(Debug, Default)]
pub struct IndexCache {
    index: Option<AssetIndex>,
    options: IndexOptions,
}

impl IndexCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: IndexOptions) -> Self {
        Self {
            index: None,
            options,
        }
    }

    /// Drop the cached index so the next access rebuilds.
    pub fn invalidate(&mut self) {
        self.index = None;
    }

    /// The cached index, if any.
    #[must_use]
    pub fn current(&self) -> Option<&AssetIndex> {
        self.index.as_ref()
    }

    /// Return the cached index for `game_path`, building it if missing or stale.
    ///
    /// # Errors
    /// Returns [`Error::RootNotFound`](crate::Error::RootNotFound) if the scan root does not exist.
    pub fn get_or_build<P: AsRef<Path>>(&mut self, game_path: P) -> Result<&AssetIndex> {
        self.get_or_build_with_progress(game_path, &|_| {})
    }

    /// Same as [`IndexCache::get_or_build`], reporting build progress.
    ///
    /// # Errors
    /// See [`IndexCache::get_or_build`].
    pub fn get_or_build_with_progress<P: AsRef<Path>>(
        &mut self,
        game_path: P,
        progress: IndexProgressCallback,
    ) -> Result<&AssetIndex> {
        let root = resolve_scan_root(game_path);
        if self.index.as_ref().is_some_and(|index| index.root() != root) {
            self.index = None;
        }

        match self.index {
            Some(ref index) => {
                tracing::debug!("Reusing cached index for {}", root.display());
                Ok(index)
            }
            None => {
                let built = AssetIndex::build_at(&root, &self.options, progress)?;
                Ok(self.index.insert(built))
            }
        }
    }
}
