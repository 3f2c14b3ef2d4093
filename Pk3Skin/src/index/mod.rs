//! Asset index over a game directory
//!
//! One scan of the scan root records, for every player model, which origins
//! (loose folders and PK3 archives) provide its mesh, skins and skeletons, plus
//! every texture reachable by full path or by stem. Everything later stages
//! need is answered from here without reopening archives.
//!
//! ## Usage
//!
//! ```no_run
//! use pk3skin::index::build_index;
//!
//! let index = build_index("~/games/JediAcademy/GameData")?;
//! for model in index.models() {
//!     println!("{} ({} skins, from {})", model.name, model.skins.len(), model.source_label());
//! }
//! # Ok::<(), pk3skin::Error>(())
//! ```

mod builder;
mod cache;
mod types;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub use builder::{build_index, build_index_with_options};
pub use cache::IndexCache;
pub use types::{
    AssetKind, FileSource, IndexOptions, IndexPhase, IndexProgress, IndexProgressCallback,
    ModelEntry, ModelSource, Origin, SkippedArchive, SourcePriority,
};

use crate::utils::normalize_rel;

/// The result of one scan.
///
/// Models are keyed by lower-cased name; texture and skeleton tables are keyed
/// by [`normalize_rel`] paths and list candidates in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    root: PathBuf,
    models: BTreeMap<String, ModelEntry>,
    textures_by_path: HashMap<String, Vec<FileSource>>,
    textures_by_stem: HashMap<String, Vec<FileSource>>,
    skeletons: HashMap<String, Vec<FileSource>>,
    archives: Vec<PathBuf>,
    skipped: Vec<SkippedArchive>,
}

impl AssetIndex {
    /// Effective scan root this index was built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a model by name (case-insensitive).
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelEntry> {
        self.models.get(&name.to_lowercase())
    }

    /// All models, sorted by lower-cased name.
    pub fn models(&self) -> impl Iterator<Item = &ModelEntry> {
        self.models.values()
    }

    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Candidates for an exact texture path.
    #[must_use]
    pub fn textures_at(&self, rel_path: &str) -> &[FileSource] {
        self.textures_by_path
            .get(&normalize_rel(rel_path))
            .map_or(&[], Vec::as_slice)
    }

    /// Candidates sharing a lower-cased file stem.
    #[must_use]
    pub fn textures_with_stem(&self, stem: &str) -> &[FileSource] {
        self.textures_by_stem
            .get(&stem.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct texture paths.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures_by_path.len()
    }

    /// Candidates for a skeleton path.
    #[must_use]
    pub fn skeletons_at(&self, rel_path: &str) -> &[FileSource] {
        self.skeletons
            .get(&normalize_rel(rel_path))
            .map_or(&[], Vec::as_slice)
    }

    /// Archives that were indexed, in scan order.
    #[must_use]
    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Archives that could not be opened.
    #[must_use]
    pub fn skipped_archives(&self) -> &[SkippedArchive] {
        &self.skipped
    }
}
