//! Model browser
//!
//! The operations a host (the CLI, or an editor plugin) drives: pick a game
//! folder, list models, pick a skin, then import it into the working cache.
//! [`ModelBrowser`] owns the settings and the cached index so the host only
//! keeps one value around.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::cache::{CopyFailure, export_cached_textures, materialize, rewrite_skin_paths};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{AssetIndex, IndexCache, IndexProgressCallback, ModelEntry};
use crate::skin::{format_skin_label, is_default_skin, resolve_skin, skin_suffix};
use crate::utils::{expand_tilde, normalize_rel};

/// One row of the model list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelListing {
    pub name: String,
    /// `disk` or the archive file name of the primary source.
    pub source: String,
    pub skin_count: usize,
}

/// A selectable skin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinChoice {
    pub path: String,
    pub label: String,
}

/// What an import or skin switch produced.
#[derive(Debug)]
pub struct ImportReport {
    pub model: String,
    pub skin: String,
    /// Skin name the model importer expects.
    pub skin_suffix: String,
    pub cache_root: PathBuf,
    /// Absolute path of the cached model file.
    pub model_path: PathBuf,
    /// Lower-cased texture stem to cached file, for rebinding loaded images.
    pub texture_map: BTreeMap<String, PathBuf>,
    pub missing: Vec<String>,
    pub failed: Vec<CopyFailure>,
    pub renames: IndexMap<String, String>,
    /// The cached skin could not be rewritten; it still names the original paths.
    pub rewrite_error: Option<Error>,
}

impl ImportReport {
    /// Human-readable warnings for everything non-fatal that went wrong.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.missing.is_empty() {
            warnings.push(format!("Missing textures: {}", self.missing.len()));
        }
        if !self.failed.is_empty() {
            let names: Vec<&str> = self.failed.iter().map(|f| f.dest.as_str()).collect();
            warnings.push(format!("Failed to extract: {}", names.join(", ")));
        }
        if let Some(e) = &self.rewrite_error {
            warnings.push(format!("Skin paths not rewritten: {e}"));
        }
        warnings
    }
}

/// Settings plus the cached index for one game folder.
#[derive(Debug)]
pub struct ModelBrowser {
    config: Config,
    cache: IndexCache,
}

impl ModelBrowser {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let cache = IndexCache::with_options(config.index_options());
        Self { config, cache }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Point at another game folder; the index is rebuilt on next use.
    pub fn set_game_path(&mut self, path: impl Into<String>) {
        self.config.game_path = Some(path.into());
        self.cache.invalidate();
    }

    /// Set the folder "save textures" writes to.
    pub fn set_texture_save_dir(&mut self, path: impl Into<String>) {
        self.config.texture_save_dir = Some(path.into());
    }

    /// The index for the configured game path, built on first use.
    ///
    /// # Errors
    /// [`Error::GamePathNotSet`] or [`Error::RootNotFound`].
    pub fn index(&mut self) -> Result<&AssetIndex> {
        self.index_with_progress(&|_| {})
    }

    /// Same as [`ModelBrowser::index`], reporting scan progress when a build happens.
    ///
    /// # Errors
    /// See [`ModelBrowser::index`].
    pub fn index_with_progress(&mut self, progress: IndexProgressCallback) -> Result<&AssetIndex> {
        let game_path = self.config.require_game_path()?;
        self.cache.get_or_build_with_progress(game_path, progress)
    }

    /// Drop the cached index and rescan.
    ///
    /// # Errors
    /// See [`ModelBrowser::index`].
    pub fn refresh(&mut self) -> Result<&AssetIndex> {
        self.cache.invalidate();
        self.index()
    }

    /// Models whose name contains `search` (case-insensitive), sorted by name.
    ///
    /// # Errors
    /// See [`ModelBrowser::index`].
    pub fn list_models(&mut self, search: &str) -> Result<Vec<ModelListing>> {
        let filter = search.trim().to_lowercase();
        Ok(self
            .index()?
            .models()
            .filter(|m| filter.is_empty() || m.name.to_lowercase().contains(&filter))
            .map(|m| ModelListing {
                name: m.name.clone(),
                source: m.source_label(),
                skin_count: m.skins.len(),
            })
            .collect())
    }

    /// Skins of a model with display labels.
    ///
    /// # Errors
    /// [`Error::ModelNotFound`] plus the errors of [`ModelBrowser::index`].
    pub fn skins(&mut self, model: &str) -> Result<Vec<SkinChoice>> {
        Ok(self
            .entry(model)?
            .skins
            .iter()
            .map(|path| SkinChoice {
                label: format_skin_label(path),
                path: path.clone(),
            })
            .collect())
    }

    /// `model_default.skin` if the model has one, else its first skin.
    ///
    /// # Errors
    /// See [`ModelBrowser::skins`].
    pub fn default_skin(&mut self, model: &str) -> Result<Option<String>> {
        let skins = &self.entry(model)?.skins;
        Ok(skins
            .iter()
            .find(|s| is_default_skin(s))
            .or_else(|| skins.first())
            .cloned())
    }

    /// Keep `requested` if the model has that skin, otherwise fall back to
    /// [`ModelBrowser::default_skin`]. `None` if the model has no skins.
    ///
    /// # Errors
    /// See [`ModelBrowser::skins`].
    pub fn ensure_skin(&mut self, model: &str, requested: Option<&str>) -> Result<Option<String>> {
        if let Some(requested) = requested {
            let wanted = normalize_rel(requested);
            if let Some(found) = self
                .entry(model)?
                .skins
                .iter()
                .find(|s| normalize_rel(s) == wanted)
            {
                return Ok(Some(found.clone()));
            }
        }
        self.default_skin(model)
    }

    /// Resolve and materialize a model with a skin, remembering the choice.
    ///
    /// # Errors
    /// Resolution errors, an unusable cache folder, or the model file itself
    /// failing to copy. Texture problems are reported in the result.
    pub fn import(&mut self, model: &str, skin: Option<&str>) -> Result<ImportReport> {
        let report = self.prepare(model, skin)?;
        self.config.last_model = Some(report.model.clone());
        self.config.last_skin = Some(report.skin.clone());
        Ok(report)
    }

    /// Re-materialize an already imported model with another skin.
    ///
    /// Same pipeline as [`ModelBrowser::import`]; only the skin choice is remembered.
    ///
    /// # Errors
    /// See [`ModelBrowser::import`].
    pub fn apply_skin(&mut self, model: &str, skin: &str) -> Result<ImportReport> {
        let report = self.prepare(model, Some(skin))?;
        self.config.last_skin = Some(report.skin.clone());
        Ok(report)
    }

    /// Copy cached textures to `out_dir`, or to the configured save folder.
    ///
    /// # Errors
    /// [`Error::InvalidPath`] if neither is set or the cache is empty.
    pub fn save_textures(&mut self, out_dir: Option<&Path>) -> Result<usize> {
        let out_dir = match (out_dir, self.config.texture_save_dir.as_deref()) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) if !dir.trim().is_empty() => expand_tilde(dir),
            _ => return Err(Error::InvalidPath("no texture output folder selected".to_string())),
        };
        let root = self.config.scan_root()?;
        export_cached_textures(&self.config.cache_root(&root)?, &out_dir)
    }

    fn entry(&mut self, model: &str) -> Result<&ModelEntry> {
        self.index()?
            .model(model)
            .ok_or_else(|| Error::ModelNotFound(model.to_string()))
    }

    fn prepare(&mut self, model: &str, skin: Option<&str>) -> Result<ImportReport> {
        let skin = self
            .ensure_skin(model, skin)?
            .ok_or_else(|| Error::SkinNotFound {
                model: model.to_string(),
                skin: skin.unwrap_or_default().to_string(),
            })?;

        let root = self.config.scan_root()?;
        let cache_root = self.config.cache_root(&root)?;
        let index = self.cache.get_or_build(self.config.require_game_path()?)?;
        let resolution = resolve_skin(index, model, &skin)?;

        let model_dest = resolution
            .model_asset()
            .map(|a| a.dest.clone())
            .ok_or_else(|| Error::ModelNotFound(model.to_string()))?;
        let skin_dest = resolution
            .skin_asset()
            .map_or_else(|| skin.clone(), |a| a.dest.clone());

        let mut materialized = materialize(index.root(), &cache_root, &resolution.assets)?;
        if let Some(pos) = materialized.failed.iter().position(|f| f.dest == model_dest) {
            return Err(materialized.failed.swap_remove(pos).error);
        }

        let rewrite_error = rewrite_skin_paths(&cache_root, &skin_dest, &resolution.renames).err();
        if let Some(e) = &rewrite_error {
            tracing::warn!("Could not rewrite {}: {}", skin_dest, e);
        }

        let cache_root = cache_root.canonicalize()?;
        Ok(ImportReport {
            model_path: cache_root.join(&model_dest),
            skin_suffix: skin_suffix(&skin),
            model: resolution.model,
            skin,
            cache_root,
            texture_map: materialized.texture_map,
            missing: resolution.missing,
            failed: materialized.failed,
            renames: resolution.renames,
            rewrite_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_pk3;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn game() -> (TempDir, ModelBrowser) {
        let temp = TempDir::new().unwrap();
        write_pk3(
            &temp.path().join("base/assets1.pk3"),
            &[
                ("models/players/kyle/model.glm", b"GLM".as_slice()),
                ("models/players/kyle/model_blue.skin", b"torso,models/players/kyle/blue.tga\n".as_slice()),
                ("models/players/kyle/model_default.skin", b"torso,models/players/kyle/torso.jpg\nhead,gone.jpg\n".as_slice()),
                ("models/players/kyle/torso.jpg", b"t".as_slice()),
                ("models/players/kyle/blue.jpg", b"b".as_slice()),
                ("models/players/jan/model.glm", b"".as_slice()),
            ],
        );
        let mut browser = ModelBrowser::new(Config::default());
        browser.set_game_path(temp.path().to_string_lossy());
        (temp, browser)
    }

    #[test]
    fn lists_models_with_filter() {
        let (_temp, mut browser) = game();
        let all = browser.list_models("").unwrap();
        assert_eq!(
            all,
            [
                ModelListing { name: "jan".into(), source: "assets1.pk3".into(), skin_count: 0 },
                ModelListing { name: "kyle".into(), source: "assets1.pk3".into(), skin_count: 2 },
            ]
        );
        assert_eq!(browser.list_models(" KY ").unwrap().len(), 1);
    }

    #[test]
    fn skin_selection() {
        let (_temp, mut browser) = game();
        let labels: Vec<_> = browser.skins("kyle").unwrap().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, ["blue", "default"]);

        assert_eq!(
            browser.default_skin("kyle").unwrap().as_deref(),
            Some("models/players/kyle/model_default.skin")
        );
        assert_eq!(
            browser.ensure_skin("kyle", Some("MODELS/players/kyle/model_blue.skin")).unwrap().as_deref(),
            Some("models/players/kyle/model_blue.skin")
        );
        assert_eq!(
            browser.ensure_skin("kyle", Some("bogus.skin")).unwrap().as_deref(),
            Some("models/players/kyle/model_default.skin")
        );
        assert_eq!(browser.ensure_skin("jan", None).unwrap(), None);
        assert!(matches!(browser.skins("nobody"), Err(Error::ModelNotFound(_))));
    }

    #[test]
    fn import_then_apply_skin() {
        let (temp, mut browser) = game();

        let report = browser.import("kyle", None).unwrap();
        assert_eq!(report.skin_suffix, "default");
        assert_eq!(std::fs::read(&report.model_path).unwrap(), b"GLM");
        assert!(report.cache_root.starts_with(temp.path().join("base").canonicalize().unwrap()));
        assert_eq!(report.missing, ["gone.jpg"]);
        assert_eq!(report.warnings(), ["Missing textures: 1"]);
        assert!(report.texture_map.contains_key("torso"));
        assert_eq!(browser.config().last_model.as_deref(), Some("kyle"));

        let report = browser.apply_skin("kyle", "models/players/kyle/model_blue.skin").unwrap();
        assert!(report.texture_map.contains_key("blue"));
        assert!(!report.texture_map.contains_key("torso"));
        assert!(!report.cache_root.join("models/players/kyle/torso.jpg").exists());
        let skin = std::fs::read_to_string(report.cache_root.join("models/players/kyle/model_blue.skin")).unwrap();
        assert_eq!(skin, "torso,models/players/kyle/blue.jpg\n");
        assert_eq!(
            browser.config().last_skin.as_deref(),
            Some("models/players/kyle/model_blue.skin")
        );
    }

    #[test]
    fn import_without_skins_fails() {
        let (_temp, mut browser) = game();
        assert!(matches!(browser.import("jan", None), Err(Error::SkinNotFound { .. })));
    }

    #[test]
    fn save_textures_needs_a_destination() {
        let (temp, mut browser) = game();
        browser.import("kyle", None).unwrap();

        assert!(matches!(browser.save_textures(None), Err(Error::InvalidPath(_))));

        let out = temp.path().join("saved");
        browser.set_texture_save_dir(out.to_string_lossy());
        assert_eq!(browser.save_textures(None).unwrap(), 1);
        assert!(out.join("models/players/kyle/torso.jpg").is_file());
    }

    #[test]
    fn unset_game_path() {
        let mut browser = ModelBrowser::new(Config::default());
        assert!(matches!(browser.list_models(""), Err(Error::GamePathNotSet)));
    }
}
