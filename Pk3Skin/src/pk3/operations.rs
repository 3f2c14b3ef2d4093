//! High-level PK3 archive operations

use std::path::Path;

use super::archive::Pk3Archive;
use super::filter::member_matches;
use super::types::{Pk3Entry, Pk3Phase, Pk3Progress, ProgressCallback};
use crate::error::Result;

/// High-level PK3 archive operations.
pub struct Pk3Operations;

impl Pk3Operations {
    /// List the file members of a PK3 (directories omitted)
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveNotFound`] or [`Error::ArchiveUnreadable`] if the archive cannot be opened.
    ///
    /// [`Error::ArchiveNotFound`]: crate::Error::ArchiveNotFound
    /// [`Error::ArchiveUnreadable`]: crate::Error::ArchiveUnreadable
    pub fn list<P: AsRef<Path>>(pk3_path: P) -> Result<Vec<String>> {
        Pk3Archive::open(pk3_path)?.file_names()
    }

    /// List members with sizes and timestamps
    ///
    /// # Errors
    ///
    /// Same as [`Pk3Operations::list`].
    pub fn list_detailed<P: AsRef<Path>>(pk3_path: P) -> Result<Vec<Pk3Entry>> {
        Ok(Pk3Archive::open(pk3_path)?
            .list()?
            .into_iter()
            .filter(|e| !e.is_dir)
            .collect())
    }

    /// Read a single member without extracting
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if the member does not exist.
    ///
    /// [`Error::MemberNotFound`]: crate::Error::MemberNotFound
    pub fn read_file_bytes<P: AsRef<Path>>(pk3_path: P, member: &str) -> Result<Vec<u8>> {
        Pk3Archive::open(pk3_path)?.read_bytes(member)
    }

    /// Extract every file member to a directory
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathTraversal`] if any member would escape `output_dir`.
    ///
    /// [`Error::PathTraversal`]: crate::Error::PathTraversal
    pub fn extract<P: AsRef<Path>>(pk3_path: P, output_dir: P) -> Result<usize> {
        Self::extract_with_progress(pk3_path, output_dir, &|_| {})
    }

    /// Extract every file member with a progress callback
    ///
    /// # Errors
    ///
    /// Same as [`Pk3Operations::extract`].
    pub fn extract_with_progress<P: AsRef<Path>>(
        pk3_path: P,
        output_dir: P,
        progress: ProgressCallback,
    ) -> Result<usize> {
        let mut archive = Pk3Archive::open(pk3_path)?;
        progress(&Pk3Progress::new(Pk3Phase::ReadingTable, 1, 1));
        let members = archive.file_names()?;
        let written = archive.extract_selected(output_dir.as_ref(), &members, progress)?;
        Ok(written.len())
    }

    /// Extract only members matching any of the glob patterns
    ///
    /// Patterns are matched against the full member path and its file name.
    ///
    /// # Errors
    ///
    /// Same as [`Pk3Operations::extract`].
    pub fn extract_matching<P: AsRef<Path>, S: AsRef<str>>(
        pk3_path: P,
        output_dir: P,
        patterns: &[S],
        progress: ProgressCallback,
    ) -> Result<usize> {
        let mut archive = Pk3Archive::open(pk3_path)?;
        progress(&Pk3Progress::new(Pk3Phase::ReadingTable, 1, 1));
        let members: Vec<String> = archive
            .file_names()?
            .into_iter()
            .filter(|m| member_matches(patterns, m))
            .collect();

        if members.is_empty() {
            tracing::info!("No members of {} match the given patterns", archive.path().display());
            return Ok(0);
        }

        let written = archive.extract_selected(output_dir.as_ref(), &members, progress)?;
        Ok(written.len())
    }

    /// Extract specific members by path
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] for the first member that does not exist.
    ///
    /// [`Error::MemberNotFound`]: crate::Error::MemberNotFound
    pub fn extract_files<P: AsRef<Path>, S: AsRef<str>>(
        pk3_path: P,
        output_dir: P,
        members: &[S],
    ) -> Result<usize> {
        let mut archive = Pk3Archive::open(pk3_path)?;
        let written = archive.extract_selected(output_dir.as_ref(), members, &|_| {})?;
        Ok(written.len())
    }
}
