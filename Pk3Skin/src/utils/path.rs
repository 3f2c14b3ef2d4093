//! Path utilities
//!
//! Every lookup in the asset index goes through [`normalize_rel`], so the same
//! member spelled `Models\Players\Kyle\Model.GLM` in one archive and
//! `models/players/kyle/model.glm` in another lands on one key.

use std::path::{Component, Path, PathBuf};

use crate::constants::BASE_DIR;
use crate::error::{Error, Result};

/// Normalize path separators to forward slashes
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Get relative path and normalize separators
pub fn relative_path<P: AsRef<Path>>(path: P, base: P) -> Option<String> {
    path.as_ref()
        .strip_prefix(base.as_ref())
        .ok()
        .map(normalize_path)
}

/// Canonical lookup key for a relative asset path.
///
/// Lower-cases, converts backslashes to `/`, and drops empty and `.` segments,
/// so leading `./` and `/` disappear. Applying it twice gives the same result.
pub fn normalize_rel<P: AsRef<Path>>(path: P) -> String {
    normalize_path(path)
        .to_lowercase()
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Last segment of a `/` or `\` separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lower-cased file stem (`Textures/Foo.JPG` -> `foo`).
pub fn file_stem_lower(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_lowercase(),
        _ => name.to_lowercase(),
    }
}

/// Lower-cased extension without the dot, if the file name has one.
pub fn extension_lower(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => Some(name[dot + 1..].to_lowercase()),
        _ => None,
    }
}

/// Replace (or append) the extension of the final segment.
pub fn with_extension(path: &str, extension: &str) -> String {
    let name_start = path.len() - file_name(path).len();
    let name = &path[name_start..];
    let stem_end = match name.rfind('.') {
        Some(dot) if dot > 0 => name_start + dot,
        _ => path.len(),
    };
    format!("{}.{extension}", &path[..stem_end])
}

/// Everything before the final `/` (empty for a bare file name).
pub fn parent_dir(path: &str) -> &str {
    path.rfind(['/', '\\']).map_or("", |idx| &path[..idx])
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Turn a configured game path into the directory that actually gets scanned.
///
/// A `base` subdirectory wins over the path itself.
pub fn resolve_scan_root<P: AsRef<Path>>(game_path: P) -> PathBuf {
    let root = expand_tilde(&game_path.as_ref().to_string_lossy());
    let base = root.join(BASE_DIR);
    if base.is_dir() { base } else { root }
}

/// Canonical form of a path that may not exist yet.
///
/// The longest existing prefix is canonicalized and the rest appended, so a
/// destination about to be created still compares against real directories.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return rest.iter().rev().fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

/// Join an archive-relative path onto `root`, refusing anything that escapes it.
///
/// The check is lexical: absolute paths, drive prefixes and `..` segments that
/// climb above `root` are rejected with [`Error::PathTraversal`].
pub fn safe_join(root: &Path, member: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::PathTraversal {
        member: member.to_string(),
    };

    let cleaned = member.replace('\\', "/");
    if cleaned.starts_with('/') {
        return Err(unsafe_path());
    }

    let mut joined = root.to_path_buf();
    let mut depth = 0usize;
    for segment in cleaned.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if depth == 0 {
                    return Err(unsafe_path());
                }
                joined.pop();
                depth -= 1;
            }
            part => {
                let is_plain = Path::new(part)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
                if !is_plain || part.contains(':') {
                    return Err(unsafe_path());
                }
                joined.push(part);
                depth += 1;
            }
        }
    }

    if depth == 0 {
        return Err(Error::InvalidPath(format!("empty member path: {member:?}")));
    }
    Ok(joined)
}
