//! Read access to a single PK3 (zip) archive

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use zip::ZipArchive;
use zip::result::ZipError;

use super::types::{Pk3Entry, Pk3Phase, Pk3Progress, ProgressCallback};
use crate::error::{Error, Result};
use crate::utils::{normalize_rel, safe_join};

/// An open PK3 archive.
///
/// Member lookups are exact first, then fall back to a case-insensitive match,
/// since the same asset is spelled differently across community archives.
pub struct Pk3Archive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
    /// Normalized member name to stored name, built on the first fallback lookup.
    folded: OnceCell<HashMap<String, String>>,
}

impl std::fmt::Debug for Pk3Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pk3Archive")
            .field("path", &self.path)
            .field("members", &self.zip.len())
            .finish()
    }
}

impl Pk3Archive {
    /// Open an archive for reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveNotFound`] if the path is not a file and
    /// [`Error::ArchiveUnreadable`] if it is not a valid zip.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ArchiveNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(|e| Error::ArchiveUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            zip,
            folded: OnceCell::new(),
        })
    }

    /// Path this archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the archive (`assets1.pk3`).
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Number of central directory records, directories included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    /// Whether the archive has no members at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// List every member in central directory order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveUnreadable`] if a directory record cannot be read.
    pub fn list(&mut self) -> Result<Vec<Pk3Entry>> {
        let mut entries = Vec::with_capacity(self.zip.len());
        for index in 0..self.zip.len() {
            let file = self
                .zip
                .by_index_raw(index)
                .map_err(|e| unreadable(&self.path, &e))?;
            let modified: Option<zip::DateTime> = file.last_modified().into();
            entries.push(Pk3Entry {
                path: file.name().to_string(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                modified: modified.and_then(to_naive),
                is_dir: file.is_dir(),
            });
        }
        Ok(entries)
    }

    /// Names of all non-directory members.
    ///
    /// # Errors
    ///
    /// See [`Pk3Archive::list`].
    pub fn file_names(&mut self) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.path)
            .collect())
    }

    /// Whether a member exists (exact or case-insensitive).
    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.stored_name(member).is_some()
    }

    /// Read a member fully into memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if no member matches and
    /// [`Error::ArchiveUnreadable`] on a corrupt entry.
    pub fn read_bytes(&mut self, member: &str) -> Result<Vec<u8>> {
        let name = self.require_name(member)?;
        let mut file = self
            .zip
            .by_name(&name)
            .map_err(|e| member_error(&self.path, member, e))?;
        let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Stream a member into `writer`, returning the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Same as [`Pk3Archive::read_bytes`], plus I/O errors from `writer`.
    pub fn copy_member_to<W: Write>(&mut self, member: &str, writer: &mut W) -> Result<u64> {
        let name = self.require_name(member)?;
        let mut file = self
            .zip
            .by_name(&name)
            .map_err(|e| member_error(&self.path, member, e))?;
        Ok(io::copy(&mut file, writer)?)
    }

    /// Extract the named members under `dest_root`, keeping their relative paths.
    ///
    /// Every destination is checked with [`safe_join`] before anything is
    /// written; the first member that would escape `dest_root` aborts the call
    /// with [`Error::PathTraversal`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathTraversal`], [`Error::MemberNotFound`] or an I/O error.
    pub fn extract_selected<S: AsRef<str>>(
        &mut self,
        dest_root: &Path,
        members: &[S],
        progress: ProgressCallback,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dest_root)?;
        let root = dest_root.canonicalize()?;

        let total = members.len();
        let mut written = Vec::with_capacity(total);

        for (index, member) in members.iter().enumerate() {
            let member = member.as_ref();
            progress(&Pk3Progress::with_file(
                Pk3Phase::WritingFiles,
                index + 1,
                total,
                member,
            ));

            let target = safe_join(&root, member)?;
            if member.ends_with('/') || member.ends_with('\\') {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
                // Catch symlinked directories inside the destination.
                if !parent.canonicalize()?.starts_with(&root) {
                    return Err(Error::PathTraversal {
                        member: member.to_string(),
                    });
                }
            }

            let mut out = File::create(&target)?;
            self.copy_member_to(member, &mut out)?;
            written.push(target);
        }

        progress(&Pk3Progress::new(Pk3Phase::Complete, total, total));
        tracing::debug!(
            "Extracted {} member(s) from {} to {}",
            written.len(),
            self.path.display(),
            root.display()
        );
        Ok(written)
    }

    /// The name as stored in the archive for a requested member path.
    fn stored_name(&self, member: &str) -> Option<String> {
        if self.zip.index_for_name(member).is_some() {
            return Some(member.to_string());
        }
        self.folded
            .get_or_init(|| {
                let mut folded = HashMap::with_capacity(self.zip.len());
                for name in self.zip.file_names() {
                    // First spelling in directory order wins.
                    folded
                        .entry(normalize_rel(name))
                        .or_insert_with(|| name.to_string());
                }
                folded
            })
            .get(&normalize_rel(member))
            .cloned()
    }

    fn require_name(&self, member: &str) -> Result<String> {
        self.stored_name(member).ok_or_else(|| Error::MemberNotFound {
            archive: self.path.clone(),
            member: member.to_string(),
        })
    }
}

fn member_error(path: &Path, member: &str, err: ZipError) -> Error {
    match err {
        ZipError::FileNotFound => Error::MemberNotFound {
            archive: path.to_path_buf(),
            member: member.to_string(),
        },
        ZipError::Io(e) => Error::Io(e),
        other => unreadable(path, &other),
    }
}

fn unreadable(path: &Path, err: &ZipError) -> Error {
    Error::ArchiveUnreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn to_naive(dt: zip::DateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(i32::from(dt.year()), u32::from(dt.month()), u32::from(dt.day()))?
        .and_hms_opt(
            u32::from(dt.hour()),
            u32::from(dt.minute()),
            u32::from(dt.second()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_pk3;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("sample.pk3");
        write_pk3(
            &path,
            &[
                ("models/players/kyle/model.glm", b"GLM".as_slice()),
                ("Textures/Kyle/Torso.JPG", b"jpeg".as_slice()),
            ],
        );
        path
    }

    #[test]
    fn lists_members_in_directory_order() {
        let temp = TempDir::new().unwrap();
        let mut archive = Pk3Archive::open(sample(&temp)).unwrap();

        let entries = archive.list().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, ["models/players/kyle/model.glm", "Textures/Kyle/Torso.JPG"]);
        assert_eq!(entries[0].size, 3);
        assert!(!entries[0].is_dir);
    }

    #[test]
    fn reads_members_case_insensitively() {
        let temp = TempDir::new().unwrap();
        let mut archive = Pk3Archive::open(sample(&temp)).unwrap();

        assert_eq!(archive.read_bytes("textures/kyle/torso.jpg").unwrap(), b"jpeg");
        assert!(archive.contains("MODELS/players/kyle/model.glm"));

        let err = archive.read_bytes("missing.tga").unwrap_err();
        assert!(matches!(err, Error::MemberNotFound { .. }));
    }

    #[test]
    fn fallback_lookup_prefers_first_spelling() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dupes.pk3");
        write_pk3(
            &path,
            &[
                ("gfx/A.tga", b"first".as_slice()),
                ("gfx/a.TGA", b"second".as_slice()),
                ("gfx/b.tga", b"b".as_slice()),
            ],
        );
        let mut archive = Pk3Archive::open(&path).unwrap();

        // Exact names never go through the folded table.
        assert_eq!(archive.read_bytes("gfx/a.TGA").unwrap(), b"second");
        assert_eq!(archive.read_bytes("GFX/a.tga").unwrap(), b"first");
        assert_eq!(archive.read_bytes("gfx\\B.TGA").unwrap(), b"b");
    }

    #[test]
    fn extract_selected_over_many_members() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.pk3");
        let names: Vec<String> = (0..2000).map(|i| format!("Textures/Set/T{i:04}.JPG")).collect();
        let members: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), b"x".as_slice())).collect();
        write_pk3(&path, &members);
        let requested: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

        let mut archive = Pk3Archive::open(&path).unwrap();
        let written = archive
            .extract_selected(&temp.path().join("out"), &requested, &|_| {})
            .unwrap();

        assert_eq!(written.len(), 2000);
        assert!(temp.path().join("out/textures/set/t1999.jpg").is_file());
    }

    #[test]
    fn open_rejects_missing_and_corrupt_files() {
        let temp = TempDir::new().unwrap();
        let missing = Pk3Archive::open(temp.path().join("nope.pk3")).unwrap_err();
        assert!(matches!(missing, Error::ArchiveNotFound { .. }));

        let bogus = temp.path().join("bogus.pk3");
        fs::write(&bogus, b"not a zip at all").unwrap();
        let corrupt = Pk3Archive::open(&bogus).unwrap_err();
        assert!(matches!(corrupt, Error::ArchiveUnreadable { .. }));
    }

    #[test]
    fn extract_selected_refuses_traversal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evil.pk3");
        write_pk3(&path, &[("../outside.txt", b"gotcha".as_slice())]);
        let dest = temp.path().join("out");

        let mut archive = Pk3Archive::open(&path).unwrap();
        let err = archive
            .extract_selected(&dest, &["../outside.txt"], &|_| {})
            .unwrap_err();

        assert!(err.is_path_traversal());
        assert!(!temp.path().join("outside.txt").exists());
    }

    #[test]
    fn extract_selected_writes_nested_members() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out");
        let mut archive = Pk3Archive::open(sample(&temp)).unwrap();

        let written = archive
            .extract_selected(&dest, &["models/players/kyle/model.glm"], &|_| {})
            .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(
            fs::read(dest.join("models/players/kyle/model.glm")).unwrap(),
            b"GLM"
        );
    }
}
