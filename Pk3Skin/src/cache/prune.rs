//! Cache pruning

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use walkdir::WalkDir;

use crate::constants::CACHE_MARKER;
use crate::error::{Error, Result};
use crate::utils::{normalize_rel, relative_path};

/// Delete every file under `cache_root` whose normalized relative path is not
/// in `keep`, then remove directories left empty, deepest first.
///
/// Only directories carrying the [`CACHE_MARKER`] file are pruned; the marker
/// itself always stays. Files that vanish underneath us are ignored; other
/// failures are logged. Returns the number of files removed.
///
/// # Errors
///
/// Returns [`Error::NotACacheDir`] if `cache_root` exists without the marker.
pub fn prune_cache(cache_root: &Path, keep: &HashSet<String>) -> Result<usize> {
    if !cache_root.is_dir() {
        return Ok(0);
    }
    let marker = cache_root.join(CACHE_MARKER);
    if !marker.is_file() {
        return Err(Error::NotACacheDir {
            path: cache_root.to_path_buf(),
        });
    }

    let mut removed = 0;
    let stale: Vec<_> = WalkDir::new(cache_root)
        .min_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| !e.file_type().is_dir() && e.path() != marker)
        .filter(|e| {
            relative_path(e.path(), cache_root).is_some_and(|rel| !keep.contains(&normalize_rel(rel)))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    for path in stale {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to prune {}: {}", path.display(), e),
        }
    }

    let dirs: Vec<_> = WalkDir::new(cache_root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect();

    for dir in dirs {
        let is_empty = fs::read_dir(&dir).is_ok_and(|mut entries| entries.next().is_none());
        if !is_empty {
            continue;
        }
        match fs::remove_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {}", dir.display(), e),
        }
    }

    if removed > 0 {
        tracing::debug!("Pruned {} stale file(s) from {}", removed, cache_root.display());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_file;
    use tempfile::TempDir;

    #[test]
    fn keeps_listed_files_case_insensitively() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path();
        write_file(cache, CACHE_MARKER, b"");
        write_file(cache, "Models/Players/Kyle/Model.glm", b"");
        write_file(cache, "textures/old/stale.jpg", b"");

        let keep: HashSet<String> = ["models/players/kyle/model.glm".to_string()].into();
        assert_eq!(prune_cache(cache, &keep).unwrap(), 1);

        assert!(cache.join("Models/Players/Kyle/Model.glm").is_file());
        assert!(cache.join(CACHE_MARKER).is_file());
        assert!(!cache.join("textures").exists());
    }

    #[test]
    fn missing_cache_prunes_nothing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(prune_cache(&temp.path().join("absent"), &HashSet::new()).unwrap(), 0);
    }

    #[test]
    fn unmarked_directory_is_left_alone() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "assets1.pk3", b"PK");

        let err = prune_cache(temp.path(), &HashSet::new()).unwrap_err();
        assert!(matches!(err, Error::NotACacheDir { .. }));
        assert!(temp.path().join("assets1.pk3").is_file());
    }
}
