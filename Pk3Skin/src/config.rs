//! Persisted user settings

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{CACHE_FOLDER, PREFERRED_ARCHIVE};
use crate::error::{Error, Result};
use crate::index::IndexOptions;
use crate::utils::{canonicalize_lenient, expand_tilde, resolve_scan_root};

// Default value functions for serde
fn default_cache_folder() -> String {
    CACHE_FOLDER.to_string()
}
fn default_preferred_archive() -> String {
    PREFERRED_ARCHIVE.to_string()
}

/// Settings stored as JSON in the platform config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Game directory (its `base` subfolder is used when present).
    #[serde(default)]
    pub game_path: Option<String>,
    /// Working cache folder; relative paths are under the scan root.
    #[serde(default = "default_cache_folder")]
    pub cache_folder: String,
    /// Archive that outranks all others when a model ships in several.
    #[serde(default = "default_preferred_archive")]
    pub preferred_archive: String,
    /// Where "save textures" copies the cached textures.
    #[serde(default)]
    pub texture_save_dir: Option<String>,
    #[serde(default)]
    pub last_model: Option<String>,
    #[serde(default)]
    pub last_skin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_path: None,
            cache_folder: default_cache_folder(),
            preferred_archive: default_preferred_archive(),
            texture_save_dir: None,
            last_model: None,
            last_skin: None,
        }
    }
}

impl Config {
    /// `<config dir>/pk3skin/config.json`
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pk3skin").join("config.json"))
    }

    /// Load from the default location, falling back to defaults.
    #[must_use]
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load from `path`; a missing or malformed file yields defaults.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Save to the default location.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if the platform has no config directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::InvalidPath("no config directory on this platform".to_string()))?;
        self.save_to(&path)
    }

    /// Save as pretty JSON to `path`, creating parent directories.
    ///
    /// # Errors
    /// I/O and serialization errors.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The configured game path, trimmed.
    ///
    /// # Errors
    /// Returns [`Error::GamePathNotSet`] if no game path is configured.
    pub fn require_game_path(&self) -> Result<&str> {
        match self.game_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(Error::GamePathNotSet),
        }
    }

    /// The directory that gets indexed.
    ///
    /// # Errors
    /// See [`Config::require_game_path`].
    pub fn scan_root(&self) -> Result<PathBuf> {
        self.require_game_path().map(resolve_scan_root)
    }

    /// Absolute cache folder for a scan root.
    ///
    /// A relative folder must be a plain descent (no `.`, `..` or prefixes).
    /// An absolute folder must be disjoint from the scan root: not equal to
    /// it, not an ancestor of it and not inside it.
    ///
    /// # Errors
    /// Returns [`Error::UnsafeCacheFolder`] if the folder breaks those rules.
    pub fn cache_root(&self, scan_root: &Path) -> Result<PathBuf> {
        let folder = self.checked_cache_folder()?;
        if !folder.is_absolute() {
            return Ok(scan_root.join(folder));
        }
        let cache = canonicalize_lenient(&folder);
        let root = canonicalize_lenient(scan_root);
        if cache.starts_with(&root) || root.starts_with(&cache) {
            return Err(self.unsafe_cache_folder(format!(
                "overlaps the game folder {}",
                root.display()
            )));
        }
        Ok(folder)
    }

    /// Check the cache folder without resolving it; the scan-root overlap
    /// check also runs when a game path is set.
    ///
    /// # Errors
    /// See [`Config::cache_root`].
    pub fn validate_cache_folder(&self) -> Result<()> {
        self.checked_cache_folder()?;
        if let Ok(root) = self.scan_root() {
            self.cache_root(&root)?;
        }
        Ok(())
    }

    fn checked_cache_folder(&self) -> Result<PathBuf> {
        let trimmed = self.cache_folder.trim();
        if trimmed.is_empty() {
            return Err(self.unsafe_cache_folder("empty".to_string()));
        }
        let folder = expand_tilde(trimmed);
        if !folder.is_absolute()
            && !folder.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(self.unsafe_cache_folder(
                "relative folders may only name subdirectories".to_string(),
            ));
        }
        Ok(folder)
    }

    fn unsafe_cache_folder(&self, reason: String) -> Error {
        Error::UnsafeCacheFolder {
            folder: self.cache_folder.clone(),
            reason,
        }
    }

    #[must_use]
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            preferred_archive: self.preferred_archive.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"game_path": "/games/ja"}"#).unwrap();
        assert_eq!(config.game_path.as_deref(), Some("/games/ja"));
        assert_eq!(config.cache_folder, ".pk3skin_cache");
        assert_eq!(config.preferred_archive, "assets1.pk3");
        assert_eq!(config.last_skin, None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.json");
        let config = Config {
            game_path: Some("/games/ja".to_string()),
            last_model: Some("kyle".to_string()),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn malformed_or_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        assert_eq!(Config::load_from(&path), Config::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn scan_root_and_cache_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("base")).unwrap();

        let mut config = Config::default();
        assert!(matches!(config.scan_root(), Err(Error::GamePathNotSet)));

        config.game_path = Some(temp.path().to_string_lossy().to_string());
        let root = config.scan_root().unwrap();
        assert_eq!(root, temp.path().join("base"));
        assert_eq!(config.cache_root(&root).unwrap(), root.join(".pk3skin_cache"));

        config.cache_folder = "work/cache".to_string();
        assert_eq!(config.cache_root(&root).unwrap(), root.join("work/cache"));

        config.cache_folder = temp.path().join("elsewhere").to_string_lossy().to_string();
        assert_eq!(config.cache_root(&root).unwrap(), temp.path().join("elsewhere"));
    }

    #[test]
    fn cache_folder_must_not_overlap_game_data() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("base");
        fs::create_dir(&root).unwrap();
        let absolute = |p: &Path| p.to_string_lossy().to_string();

        for folder in [
            String::new(),
            "  ".to_string(),
            ".".to_string(),
            "./cache".to_string(),
            "..".to_string(),
            "cache/../..".to_string(),
            absolute(&root),
            absolute(temp.path()),
            absolute(&root.join("models")),
            absolute(&root.join("not/yet/there")),
        ] {
            let config = Config {
                cache_folder: folder.clone(),
                ..Config::default()
            };
            let err = config.cache_root(&root).unwrap_err();
            assert!(
                matches!(err, Error::UnsafeCacheFolder { .. }),
                "{folder:?} gave {err}"
            );
        }
    }

    #[test]
    fn validate_checks_overlap_only_with_a_game_path() {
        let temp = TempDir::new().unwrap();
        let mut config = Config {
            cache_folder: temp.path().to_string_lossy().to_string(),
            ..Config::default()
        };
        config.validate_cache_folder().unwrap();

        config.game_path = Some(temp.path().to_string_lossy().to_string());
        assert!(matches!(
            config.validate_cache_folder(),
            Err(Error::UnsafeCacheFolder { .. })
        ));

        config.cache_folder = "..".to_string();
        config.game_path = None;
        assert!(config.validate_cache_folder().is_err());
    }
}
