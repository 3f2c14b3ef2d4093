//! From (model, skin) to the ordered list of files to extract

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{parse_skin_text, skin_suffix};
use crate::constants::{
    CANONICAL_MODEL_STEM, FALLBACK_SKELETON, MODEL_PREFIX, SKELETON_EXTENSION, TEXTURE_EXTENSIONS,
};
use crate::error::{Error, Result};
use crate::index::{AssetIndex, AssetKind, FileSource, ModelEntry};
use crate::utils::{
    extension_lower, file_stem_lower, normalize_path, normalize_rel, parent_dir, with_extension,
};

/// One file to place in the working cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    pub source: FileSource,
    /// Destination relative to the cache root (the source path, `/`-separated).
    pub dest: String,
    pub kind: AssetKind,
}

impl ResolvedAsset {
    #[must_use]
    pub fn new(source: FileSource, kind: AssetKind) -> Self {
        Self {
            dest: normalize_path(&source.rel_path),
            source,
            kind,
        }
    }
}

/// Everything needed to load one model with one skin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinResolution {
    /// Model display name.
    pub model: String,
    /// Skin path as requested.
    pub skin: String,
    /// Model file, skin file, skeleton (if found), then textures.
    pub assets: Vec<ResolvedAsset>,
    /// Texture references nothing in the index satisfies.
    pub missing: Vec<String>,
    /// Original reference to the path it actually resolved to, where they differ.
    pub renames: IndexMap<String, String>,
}

impl SkinResolution {
    #[must_use]
    pub fn model_asset(&self) -> Option<&ResolvedAsset> {
        self.first_of(AssetKind::Model)
    }

    #[must_use]
    pub fn skin_asset(&self) -> Option<&ResolvedAsset> {
        self.first_of(AssetKind::Skin)
    }

    #[must_use]
    pub fn skeleton_asset(&self) -> Option<&ResolvedAsset> {
        self.first_of(AssetKind::Skeleton)
    }

    pub fn textures(&self) -> impl Iterator<Item = &ResolvedAsset> {
        self.assets.iter().filter(|a| a.kind == AssetKind::Texture)
    }

    /// Skin name for the importer (`default` for `model_default.skin`).
    #[must_use]
    pub fn skin_suffix(&self) -> String {
        skin_suffix(&self.skin)
    }

    fn first_of(&self, kind: AssetKind) -> Option<&ResolvedAsset> {
        self.assets.iter().find(|a| a.kind == kind)
    }
}

/// A resolved texture reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureMatch {
    pub source: FileSource,
    /// The resolved path differs from what the reference literally names.
    pub renamed: bool,
}

/// Choose among duplicate candidates: the primary model's archive, then
/// disk, then the first one indexed.
#[must_use]
pub fn pick_source<'a>(
    candidates: &'a [FileSource],
    preferred_archive: Option<&Path>,
) -> Option<&'a FileSource> {
    preferred_archive
        .and_then(|archive| {
            candidates
                .iter()
                .find(|c| c.origin.archive() == Some(archive))
        })
        .or_else(|| candidates.iter().find(|c| c.is_disk()))
        .or_else(|| candidates.first())
}

/// Resolve one texture reference from a skin.
///
/// A bare file name is tried next to the skin first, then as given. Each base
/// is tried with its own extension (when it is a texture extension) and then
/// `jpg`, `png`, `tga`. If no exact path matches, any texture with the same
/// stem is accepted.
#[must_use]
pub fn resolve_texture(
    index: &AssetIndex,
    reference: &str,
    skin_dir: &str,
    preferred_archive: Option<&Path>,
) -> Option<TextureMatch> {
    let reference = normalize_path(reference);

    let mut bases = Vec::with_capacity(2);
    if !reference.contains('/') && !skin_dir.is_empty() {
        bases.push(format!("{}/{reference}", normalize_path(skin_dir)));
    }
    bases.push(reference.clone());

    for base in &bases {
        let own = extension_lower(base).filter(|ext| TEXTURE_EXTENSIONS.contains(&ext.as_str()));
        let extensions = own.iter().map(String::as_str).chain(
            TEXTURE_EXTENSIONS
                .iter()
                .copied()
                .filter(|ext| own.as_deref() != Some(*ext)),
        );

        for ext in extensions {
            let candidate = with_extension(base, ext);
            if let Some(source) = pick_source(index.textures_at(&candidate), preferred_archive) {
                return Some(TextureMatch {
                    renamed: normalize_path(&source.rel_path) != *base,
                    source: source.clone(),
                });
            }
        }
    }

    let stem = file_stem_lower(&reference);
    pick_source(index.textures_with_stem(&stem), preferred_archive).map(|source| {
        tracing::debug!("Texture {} resolved by stem to {}", reference, source.rel_path);
        TextureMatch {
            renamed: normalize_path(&source.rel_path) != reference,
            source: source.clone(),
        }
    })
}

/// Find the skeleton for a model.
///
/// Skeletons shipped by the model's own sources win; otherwise
/// `<name>/<name>.gla`, `<name>/model.gla`, then the shared humanoid skeleton.
#[must_use]
pub fn find_skeleton(
    index: &AssetIndex,
    entry: &ModelEntry,
    preferred_archive: Option<&Path>,
) -> Option<FileSource> {
    let shipped = entry
        .sources
        .iter()
        .flat_map(|source| source.skeletons.iter())
        .find_map(|rel| pick_source(index.skeletons_at(rel), preferred_archive));
    if let Some(found) = shipped {
        return Some(found.clone());
    }

    let [models, players] = MODEL_PREFIX;
    let name = &entry.name;
    let fallbacks = [
        format!("{models}/{players}/{name}/{name}.{SKELETON_EXTENSION}"),
        format!("{models}/{players}/{name}/{CANONICAL_MODEL_STEM}.{SKELETON_EXTENSION}"),
        FALLBACK_SKELETON.to_string(),
    ];
    fallbacks
        .iter()
        .find_map(|rel| pick_source(index.skeletons_at(rel), preferred_archive))
        .cloned()
}

/// Resolve a skin of an indexed model into its asset list.
///
/// # Errors
///
/// Returns [`Error::ModelNotFound`] or [`Error::SkinNotFound`] if the pair is
/// not in the index, and I/O or archive errors if the skin text cannot be read.
/// Unresolvable texture references are reported in
/// [`SkinResolution::missing`], not as errors.
pub fn resolve_skin(index: &AssetIndex, model_name: &str, skin_path: &str) -> Result<SkinResolution> {
    let entry = index
        .model(model_name)
        .ok_or_else(|| Error::ModelNotFound(model_name.to_string()))?;
    let skin_source = entry
        .find_skin(skin_path)
        .ok_or_else(|| Error::SkinNotFound {
            model: model_name.to_string(),
            skin: skin_path.to_string(),
        })?;

    let primary = entry.primary_source();
    let model_source = primary
        .model_source()
        .ok_or_else(|| Error::ModelNotFound(model_name.to_string()))?;
    let preferred = primary.archive();

    let bindings = parse_skin_text(&skin_source.read_text(index.root())?);
    let skin_dir = parent_dir(&skin_source.rel_path).to_string();

    let mut assets = vec![
        ResolvedAsset::new(model_source, AssetKind::Model),
        ResolvedAsset::new(skin_source, AssetKind::Skin),
    ];
    if let Some(skeleton) = find_skeleton(index, entry, preferred) {
        assets.push(ResolvedAsset::new(skeleton, AssetKind::Skeleton));
    } else {
        tracing::debug!("No skeleton found for {}", entry.name);
    }

    let mut destinations: HashSet<String> = assets.iter().map(|a| normalize_rel(&a.dest)).collect();
    let mut seen = HashSet::new();
    let mut missing = Vec::new();
    let mut renames = IndexMap::new();

    for reference in bindings.values() {
        if !seen.insert(reference.as_str()) {
            continue;
        }
        let Some(found) = resolve_texture(index, reference, &skin_dir, preferred) else {
            missing.push(reference.clone());
            continue;
        };
        if found.renamed {
            renames.insert(reference.clone(), normalize_path(&found.source.rel_path));
        }
        let asset = ResolvedAsset::new(found.source, AssetKind::Texture);
        if destinations.insert(normalize_rel(&asset.dest)) {
            assets.push(asset);
        }
    }

    tracing::debug!(
        "Resolved {} / {}: {} assets, {} missing, {} renamed",
        entry.name,
        skin_path,
        assets.len(),
        missing.len(),
        renames.len()
    );

    Ok(SkinResolution {
        model: entry.name.clone(),
        skin: skin_path.to_string(),
        assets,
        missing,
        renames,
    })
}
