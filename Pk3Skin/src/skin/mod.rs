//! Ghoul2 `.skin` files
//!
//! A skin is a small text file binding mesh surfaces to textures, one
//! `surface,texture` pair per line:
//!
//! ```text
//! // comments are skipped
//! torso,models/players/kyle/torso.jpg
//! hips_cap_torso_off,*off
//! ```
//!
//! `*off` (or `off`) hides a surface and carries no texture. [`resolve_skin`]
//! turns a skin of an indexed model into the full list of files needed to load
//! the model with that skin.

mod resolver;

use indexmap::IndexMap;

use crate::constants::SKIN_STEM_PREFIX;
use crate::utils::{file_name, file_stem_lower};

pub use resolver::{
    ResolvedAsset, SkinResolution, TextureMatch, find_skeleton, pick_source, resolve_skin,
    resolve_texture,
};

/// Surface name to texture reference, in first-appearance order.
pub type SkinBindings = IndexMap<String, String>;

/// Whether a texture field disables its surface.
#[must_use]
pub fn is_off(texture: &str) -> bool {
    texture.eq_ignore_ascii_case("*off") || texture.eq_ignore_ascii_case("off")
}

/// Parse skin text into surface bindings.
///
/// Lines without a comma, blank lines, `//` comments, empty surface names and
/// `*off` bindings are skipped. A later line for the same surface replaces
/// the earlier texture but keeps the surface's original position.
#[must_use]
pub fn parse_skin_text(text: &str) -> SkinBindings {
    let mut bindings = SkinBindings::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let Some((part, texture)) = line.split_once(',') else {
            continue;
        };
        let (part, texture) = (part.trim(), texture.trim());
        if part.is_empty() || is_off(texture) {
            continue;
        }
        bindings.insert(part.to_string(), texture.to_string());
    }
    bindings
}

/// Skin name the importer expects: file stem without the `model_` prefix.
///
/// `models/players/kyle/model_default.skin` gives `default`;
/// `head_a1.skin` stays `head_a1`.
#[must_use]
pub fn skin_suffix(skin_path: &str) -> String {
    let name = file_name(skin_path);
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    stem.strip_prefix(SKIN_STEM_PREFIX).unwrap_or(stem).to_string()
}

/// Display label for a skin in listings.
#[must_use]
pub fn format_skin_label(skin_path: &str) -> String {
    skin_suffix(skin_path)
}

/// Whether the skin's file stem is the default one (`model_default`).
#[must_use]
pub fn is_default_skin(skin_path: &str) -> bool {
    file_stem_lower(skin_path) == format!("{SKIN_STEM_PREFIX}default")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_bindings_and_skips_noise() {
        let text = "\
// header comment
torso,models/players/x/t.jpg
 head , models/players/x/h.tga \r
caps,*off
noComma
,textures/orphan.jpg
";
        let bindings = parse_skin_text(text);
        let pairs: Vec<(&str, &str)> = bindings.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            [("torso", "models/players/x/t.jpg"), ("head", "models/players/x/h.tga")]
        );
    }

    #[test]
    fn later_binding_overwrites_earlier() {
        let bindings = parse_skin_text("a,one.jpg\nb,two.jpg\na,three.jpg\nb,OFF\n");
        assert_eq!(bindings.get("a").map(String::as_str), Some("three.jpg"));
        assert_eq!(bindings.get("b").map(String::as_str), Some("two.jpg"));
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn suffix_strips_model_prefix_only() {
        assert_eq!(skin_suffix("models/players/kyle/model_default.skin"), "default");
        assert_eq!(skin_suffix("models/players/kyle/head_a1.skin"), "head_a1");
        assert_eq!(format_skin_label("Model_Blue.skin"), "Model_Blue");
        assert!(is_default_skin("models/players/kyle/Model_Default.skin"));
    }
}
