//! Working cache
//!
//! A scratch directory (by default `.pk3skin_cache` under the scan root) that
//! holds exactly the files of the last resolved skin, laid out by their
//! game-relative paths so the model importer can find textures the way the
//! engine would.

mod prune;
mod rewrite;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub use prune::prune_cache;
pub use rewrite::{rewrite_skin_paths, rewrite_skin_text};

use crate::constants::CACHE_MARKER;
use crate::error::{Error, Result};
use crate::index::{AssetKind, Origin};
use crate::pk3::Pk3Archive;
use crate::skin::ResolvedAsset;
use crate::utils::{canonicalize_lenient, file_stem_lower, normalize_rel, relative_path, safe_join};

/// One asset that could not be copied.
#[derive(Debug)]
pub struct CopyFailure {
    /// Destination relative to the cache root.
    pub dest: String,
    pub error: Error,
}

/// Outcome of [`materialize`].
#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Lower-cased texture stem to absolute cache path.
    pub texture_map: BTreeMap<String, PathBuf>,
    pub failed: Vec<CopyFailure>,
    pub written: usize,
    pub pruned: usize,
}

impl MaterializeReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copy `assets` into `cache_root`, then prune everything else.
///
/// Per-asset failures are collected in the report and do not stop the copy.
/// Only successfully written destinations survive the prune, so the cache
/// ends up holding exactly this call's files.
///
/// # Errors
///
/// Returns an I/O error if `cache_root` cannot be created, and
/// [`Error::NotACacheDir`] if it cannot be claimed as a cache (see
/// [`claim_cache_root`]).
pub fn materialize(
    scan_root: &Path,
    cache_root: &Path,
    assets: &[ResolvedAsset],
) -> Result<MaterializeReport> {
    let cache_root = claim_cache_root(scan_root, cache_root)?;

    let mut archives: HashMap<PathBuf, Pk3Archive> = HashMap::new();
    let mut keep = HashSet::new();
    let mut report = MaterializeReport::default();

    for asset in assets {
        match copy_asset(scan_root, &cache_root, asset, &mut archives) {
            Ok(dest) => {
                keep.insert(normalize_rel(&asset.dest));
                report.written += 1;
                if AssetKind::from_path(&asset.dest) == AssetKind::Texture {
                    report.texture_map.insert(file_stem_lower(&asset.dest), dest);
                }
            }
            Err(error) => {
                tracing::warn!("Failed to copy {}: {}", asset.dest, error);
                let error = if error.is_path_traversal() {
                    error
                } else {
                    Error::CopyFailed {
                        path: asset.dest.clone(),
                        message: error.to_string(),
                    }
                };
                report.failed.push(CopyFailure {
                    dest: asset.dest.clone(),
                    error,
                });
            }
        }
    }
    drop(archives);

    report.pruned = prune_cache(&cache_root, &keep)?;

    tracing::info!(
        "Cache {}: {} written, {} failed, {} pruned",
        cache_root.display(),
        report.written,
        report.failed.len(),
        report.pruned
    );
    Ok(report)
}

/// Create or adopt `cache_root` as a working cache and return its canonical path.
///
/// A new or empty directory gets the [`CACHE_MARKER`] file. A directory that
/// already holds files without the marker is refused, as is one that is the
/// scan root or contains it.
///
/// # Errors
///
/// Returns [`Error::NotACacheDir`] for a refused directory and I/O errors.
pub fn claim_cache_root(scan_root: &Path, cache_root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(cache_root)?;
    let cache_root = cache_root.canonicalize()?;
    if canonicalize_lenient(scan_root).starts_with(&cache_root) {
        return Err(Error::NotACacheDir { path: cache_root });
    }

    let marker = cache_root.join(CACHE_MARKER);
    if !marker.is_file() {
        if fs::read_dir(&cache_root)?.next().is_some() {
            return Err(Error::NotACacheDir { path: cache_root });
        }
        fs::write(&marker, b"")?;
        tracing::debug!("Claimed {} as working cache", cache_root.display());
    }
    Ok(cache_root)
}

fn copy_asset(
    scan_root: &Path,
    cache_root: &Path,
    asset: &ResolvedAsset,
    archives: &mut HashMap<PathBuf, Pk3Archive>,
) -> Result<PathBuf> {
    let dest = safe_join(cache_root, &asset.dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    match &asset.source.origin {
        Origin::Disk => {
            let source = safe_join(scan_root, &asset.source.rel_path)?;
            fs::copy(&source, &dest)?;
        }
        Origin::Archive(path) => {
            let archive = match archives.entry(path.clone()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => slot.insert(Pk3Archive::open(path)?),
            };
            let mut out = File::create(&dest)?;
            archive.copy_member_to(&asset.source.rel_path, &mut out)?;
        }
    }

    tracing::debug!("Cached {}", asset.dest);
    Ok(dest)
}

/// Copy every cached texture to `out_dir`, keeping relative paths.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the cache does not exist or `out_dir` is
/// the cache or inside it, and I/O errors from copying.
pub fn export_cached_textures(cache_root: &Path, out_dir: &Path) -> Result<usize> {
    if !cache_root.is_dir() {
        return Err(Error::InvalidPath(format!(
            "cache folder does not exist: {}",
            cache_root.display()
        )));
    }
    if canonicalize_lenient(out_dir).starts_with(cache_root.canonicalize()?) {
        return Err(Error::InvalidPath(format!(
            "output folder {} is inside the cache {}",
            out_dir.display(),
            cache_root.display()
        )));
    }

    let mut copied = 0;
    for entry in WalkDir::new(cache_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative_path(entry.path(), cache_root) else {
            continue;
        };
        if AssetKind::from_path(&rel) != AssetKind::Texture {
            continue;
        }
        let target = safe_join(out_dir, &rel)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }

    tracing::info!("Exported {} textures to {}", copied, out_dir.display());
    Ok(copied)
}
