//! Rewriting texture references in a cached skin

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::Result;
use crate::utils::safe_join;

/// Point the cached copy of a skin at the textures that were actually found.
///
/// Must run after the skin has been copied into the cache. Returns the number
/// of lines changed; the file is only rewritten when that is non-zero.
///
/// # Errors
///
/// Returns [`Error::PathTraversal`](crate::Error::PathTraversal) for an unsafe
/// `skin_rel`, and I/O errors reading or writing the skin.
pub fn rewrite_skin_paths(
    cache_root: &Path,
    skin_rel: &str,
    renames: &IndexMap<String, String>,
) -> Result<usize> {
    if renames.is_empty() {
        return Ok(0);
    }

    let path = safe_join(cache_root, skin_rel)?;
    let original = String::from_utf8_lossy(&fs::read(&path)?).into_owned();
    let (rewritten, changed) = rewrite_skin_text(&original, renames);

    if changed > 0 {
        fs::write(&path, rewritten)?;
        tracing::debug!("Rewrote {} texture reference(s) in {}", changed, skin_rel);
    }
    Ok(changed)
}

/// Replace the texture field of `surface,texture` lines whose trimmed value
/// is a key of `renames`. Comments, spacing and line endings are preserved.
#[must_use]
pub fn rewrite_skin_text(text: &str, renames: &IndexMap<String, String>) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut changed = 0;

    for line in text.split_inclusive('\n') {
        let body_len = line.trim_end_matches(['\r', '\n']).len();
        let (body, ending) = line.split_at(body_len);

        let replaced = if body.trim_start().starts_with("//") {
            None
        } else {
            body.split_once(',').and_then(|(part, field)| {
                let texture = field.trim();
                renames.get(texture).map(|new| {
                    let lead = &field[..field.len() - field.trim_start().len()];
                    let trail = &field[field.trim_end().len()..];
                    format!("{part},{lead}{new}{trail}")
                })
            })
        };

        match replaced {
            Some(body) => {
                out.push_str(&body);
                changed += 1;
            }
            None => out.push_str(body),
        }
        out.push_str(ending);
    }

    (out, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_file;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn renames() -> IndexMap<String, String> {
        IndexMap::from([("textures/x".to_string(), "anything/x.png".to_string())])
    }

    #[test]
    fn replaces_only_matching_texture_fields() {
        let text = "// textures/x stays\r\nhead, textures/x \r\nbody,textures/xy\ntextures/x,textures/other\n";
        let (out, changed) = rewrite_skin_text(text, &renames());

        assert_eq!(changed, 1);
        assert_eq!(
            out,
            "// textures/x stays\r\nhead, anything/x.png \r\nbody,textures/xy\ntextures/x,textures/other\n"
        );
    }

    #[test]
    fn no_renames_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "m.skin", b"head,textures/y\n");

        assert_eq!(rewrite_skin_paths(temp.path(), "m.skin", &renames()).unwrap(), 0);
        assert_eq!(rewrite_skin_paths(temp.path(), "m.skin", &IndexMap::new()).unwrap(), 0);
        assert_eq!(fs::read_to_string(temp.path().join("m.skin")).unwrap(), "head,textures/y\n");
    }

    #[test]
    fn rewrites_cached_skin_on_disk() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "models/players/k/model_default.skin", b"head,textures/x");

        let changed =
            rewrite_skin_paths(temp.path(), "models/players/k/model_default.skin", &renames()).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("models/players/k/model_default.skin")).unwrap(),
            "head,anything/x.png"
        );
    }
}
