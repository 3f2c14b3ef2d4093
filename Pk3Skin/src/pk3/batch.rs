//! Archive discovery
//!
//! Finds the PK3 files under a scan root. Results are sorted so that index
//! builds over the same tree see archives in the same order every time.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::ARCHIVE_EXTENSIONS;

/// Find all .pk3 files in a directory recursively
///
/// # Returns
/// A sorted list of paths to .pk3 files found in the directory tree.
pub fn find_pk3_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    find_archives(dir, ARCHIVE_EXTENSIONS)
}

/// Find files with any of the given extensions (case-insensitive), sorted
pub fn find_archives<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Vec<PathBuf> {
    let mut archives: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path().extension().is_some_and(|ext| {
                    extensions
                        .iter()
                        .any(|wanted| ext.eq_ignore_ascii_case(wanted))
                })
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    archives.sort();
    archives
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn finds_pk3_files_sorted_and_case_insensitive() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        for name in ["zz.pk3", "assets1.PK3", "sub/mod.pk3", "readme.txt"] {
            std::fs::write(temp.path().join(name), b"").unwrap();
        }

        let found: Vec<_> = find_pk3_files(temp.path())
            .into_iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(found, ["assets1.PK3", "sub/mod.pk3", "zz.pk3"]);
    }
}
