//! Types for the asset index

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    MODEL_EXTENSION, PREFERRED_ARCHIVE, SKELETON_EXTENSION, SKIN_EXTENSION, TEXTURE_EXTENSIONS,
};
use crate::error::Result;
use crate::pk3::Pk3Archive;
use crate::utils::{extension_lower, normalize_rel, safe_join};

/// Where a file physically lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// Loose file under the scan root.
    Disk,
    /// Member of the PK3 at this path.
    Archive(PathBuf),
}

impl Origin {
    /// The archive path, if this is an archive origin.
    #[must_use]
    pub fn archive(&self) -> Option<&Path> {
        match self {
            Origin::Disk => None,
            Origin::Archive(path) => Some(path),
        }
    }

    /// Short label for listings: `disk` or the archive file name.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Origin::Disk => "disk".to_string(),
            Origin::Archive(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string()),
        }
    }
}

/// A single file: its origin plus its relative path as spelled there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSource {
    /// Disk or archive.
    pub origin: Origin,
    /// Path relative to the scan root (disk) or the archive root, original casing.
    pub rel_path: String,
}

impl FileSource {
    /// A loose file.
    pub fn disk(rel_path: impl Into<String>) -> Self {
        Self {
            origin: Origin::Disk,
            rel_path: rel_path.into(),
        }
    }

    /// An archive member.
    pub fn archive(archive: impl Into<PathBuf>, rel_path: impl Into<String>) -> Self {
        Self {
            origin: Origin::Archive(archive.into()),
            rel_path: rel_path.into(),
        }
    }

    #[must_use]
    pub fn is_disk(&self) -> bool {
        matches!(self.origin, Origin::Disk)
    }

    /// Read the whole file, opening its archive if needed.
    ///
    /// # Errors
    ///
    /// I/O, archive and traversal errors.
    pub fn read_bytes(&self, scan_root: &Path) -> Result<Vec<u8>> {
        match &self.origin {
            Origin::Disk => Ok(fs::read(safe_join(scan_root, &self.rel_path)?)?),
            Origin::Archive(path) => Pk3Archive::open(path)?.read_bytes(&self.rel_path),
        }
    }

    /// Read the file as text, replacing invalid UTF-8.
    ///
    /// # Errors
    ///
    /// See [`FileSource::read_bytes`].
    pub fn read_text(&self, scan_root: &Path) -> Result<String> {
        let bytes = self.read_bytes(scan_root)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Asset classification by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Model,
    Skin,
    Skeleton,
    Texture,
    Other,
}

impl AssetKind {
    /// Classify a path by its (case-insensitive) extension.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match extension_lower(path).as_deref() {
            Some(MODEL_EXTENSION) => AssetKind::Model,
            Some(SKIN_EXTENSION) => AssetKind::Skin,
            Some(SKELETON_EXTENSION) => AssetKind::Skeleton,
            Some(ext) if TEXTURE_EXTENSIONS.contains(&ext) => AssetKind::Texture,
            _ => AssetKind::Other,
        }
    }
}

/// Ranking of model sources; lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourcePriority {
    OnDisk,
    PreferredArchive,
    OtherArchive,
}

impl SourcePriority {
    /// Rank an origin, comparing archive file names case-insensitively.
    #[must_use]
    pub fn of(origin: &Origin, preferred_archive: &str) -> Self {
        match origin.archive() {
            None => SourcePriority::OnDisk,
            Some(path) => {
                let is_preferred = path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(preferred_archive));
                if is_preferred {
                    SourcePriority::PreferredArchive
                } else {
                    SourcePriority::OtherArchive
                }
            }
        }
    }
}

/// Everything one origin contributes to one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    pub origin: Origin,
    pub priority: SourcePriority,
    /// Chosen `.glm` of this origin, if it has one.
    pub model_file: Option<String>,
    pub skins: BTreeSet<String>,
    pub skeletons: BTreeSet<String>,
}

impl ModelSource {
    pub(crate) fn new(origin: Origin, preferred_archive: &str) -> Self {
        Self {
            priority: SourcePriority::of(&origin, preferred_archive),
            origin,
            model_file: None,
            skins: BTreeSet::new(),
            skeletons: BTreeSet::new(),
        }
    }

    /// The model file as a [`FileSource`].
    #[must_use]
    pub fn model_source(&self) -> Option<FileSource> {
        self.model_file.as_ref().map(|rel| FileSource {
            origin: self.origin.clone(),
            rel_path: rel.clone(),
        })
    }

    #[must_use]
    pub fn archive(&self) -> Option<&Path> {
        self.origin.archive()
    }
}

/// An indexed model: all sources, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Display name (directory name as first seen).
    pub name: String,
    /// Sources ordered by priority, scan order within equal priority.
    pub sources: Vec<ModelSource>,
    /// Index into `sources` of the best source that has a model file.
    pub primary: usize,
    /// Union of skin paths over all sources, deduplicated and sorted.
    pub skins: Vec<String>,
}

impl ModelEntry {
    /// The primary source.
    #[must_use]
    pub fn primary_source(&self) -> &ModelSource {
        &self.sources[self.primary]
    }

    /// Label of the primary source (`disk` or the archive file name).
    #[must_use]
    pub fn source_label(&self) -> String {
        self.primary_source().origin.label()
    }

    /// Locate a skin by path across sources in priority order.
    #[must_use]
    pub fn find_skin(&self, skin_path: &str) -> Option<FileSource> {
        let wanted = normalize_rel(skin_path);
        self.sources.iter().find_map(|source| {
            source
                .skins
                .iter()
                .find(|s| normalize_rel(s) == wanted)
                .map(|s| FileSource {
                    origin: source.origin.clone(),
                    rel_path: s.clone(),
                })
        })
    }
}

/// Why an archive was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedArchive {
    pub path: PathBuf,
    pub reason: String,
}

/// Options for building an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Archive file name that outranks all other archives.
    pub preferred_archive: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            preferred_archive: PREFERRED_ARCHIVE.to_string(),
        }
    }
}

/// Progress information during index builds
#[derive(Debug, Clone)]
pub struct IndexProgress {
    /// Current build phase
    pub phase: IndexPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current archive or directory (if applicable)
    pub current_file: Option<String>,
}

impl IndexProgress {
    #[must_use]
    pub fn new(phase: IndexPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    #[must_use]
    pub fn with_file(phase: IndexPhase, current: usize, total: usize, file: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }
}

/// Phase of an index build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    /// Listing PK3 archives
    ScanningArchives,
    /// Walking loose model directories
    ScanningModels,
    /// Walking the loose texture directory
    ScanningTextures,
    /// Picking primaries and merging skins
    Finalizing,
    /// Build complete
    Complete,
}

impl IndexPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScanningArchives => "Scanning archives",
            Self::ScanningModels => "Scanning model folders",
            Self::ScanningTextures => "Scanning textures",
            Self::Finalizing => "Finalizing index",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback for index builds
pub type IndexProgressCallback<'a> = &'a dyn Fn(&IndexProgress);
