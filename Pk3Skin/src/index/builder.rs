//! Index building functionality for `AssetIndex`

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use super::AssetIndex;
use super::types::{
    AssetKind, FileSource, IndexOptions, IndexPhase, IndexProgress, IndexProgressCallback,
    ModelEntry, ModelSource, Origin, SkippedArchive,
};
use crate::constants::{CANONICAL_MODEL_STEM, MODEL_PREFIX, TEXTURES_DIR};
use crate::error::{Error, Result};
use crate::pk3::{Pk3Archive, find_pk3_files};
use crate::utils::{file_stem_lower, normalize_rel, relative_path, resolve_scan_root};

/// Build an index of a game directory with default options
///
/// # Errors
/// Returns [`Error::RootNotFound`] if the resolved scan root is not a directory.
/// Unreadable archives are skipped, not fatal.
pub fn build_index<P: AsRef<Path>>(game_path: P) -> Result<AssetIndex> {
    build_index_with_options(game_path, &IndexOptions::default(), &|_| {})
}

/// Build an index with explicit options and a progress callback
///
/// # Errors
/// Returns [`Error::RootNotFound`] if the resolved scan root is not a directory.
pub fn build_index_with_options<P: AsRef<Path>>(
    game_path: P,
    options: &IndexOptions,
    progress: IndexProgressCallback,
) -> Result<AssetIndex> {
    let root = resolve_scan_root(game_path);
    AssetIndex::build_at(&root, options, progress)
}

impl AssetIndex {
    /// Build from an already-resolved scan root.
    pub(crate) fn build_at(
        root: &Path,
        options: &IndexOptions,
        progress: IndexProgressCallback,
    ) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let start = std::time::Instant::now();
        let mut scan = Scan::new(root, &options.preferred_archive);

        let archives = find_pk3_files(root);
        let total = archives.len();
        for (i, archive) in archives.iter().enumerate() {
            progress(&IndexProgress::with_file(
                IndexPhase::ScanningArchives,
                i + 1,
                total,
                Origin::Archive(archive.clone()).label(),
            ));

            if let Err(e) = scan.add_archive(archive) {
                tracing::warn!("Skipping {}: {}", archive.display(), e);
                scan.skipped.push(SkippedArchive {
                    path: archive.clone(),
                    reason: e.to_string(),
                });
            }
        }

        progress(&IndexProgress::new(IndexPhase::ScanningModels, 1, 1));
        scan.add_disk_models();

        progress(&IndexProgress::new(IndexPhase::ScanningTextures, 1, 1));
        scan.add_loose_textures();

        progress(&IndexProgress::new(IndexPhase::Finalizing, 1, 1));
        let index = scan.finish();

        progress(&IndexProgress::new(IndexPhase::Complete, 1, 1));

        tracing::info!(
            "Indexed {} models, {} textures from {} PK3s in {:.2}s",
            index.model_count(),
            index.texture_count(),
            index.archives.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(index)
    }
}

/// A model while sources are still being collected, keyed per origin.
struct PendingModel {
    name: String,
    sources: IndexMap<PathBuf, ModelSource>,
}

struct Scan<'a> {
    root: &'a Path,
    preferred: &'a str,
    models: IndexMap<String, PendingModel>,
    textures_by_path: HashMap<String, Vec<FileSource>>,
    textures_by_stem: HashMap<String, Vec<FileSource>>,
    skeletons: HashMap<String, Vec<FileSource>>,
    archives: Vec<PathBuf>,
    skipped: Vec<SkippedArchive>,
}

impl<'a> Scan<'a> {
    fn new(root: &'a Path, preferred: &'a str) -> Self {
        Self {
            root,
            preferred,
            models: IndexMap::new(),
            textures_by_path: HashMap::new(),
            textures_by_stem: HashMap::new(),
            skeletons: HashMap::new(),
            archives: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn add_archive(&mut self, path: &Path) -> Result<()> {
        let entries = Pk3Archive::open(path)?.list()?;

        for entry in entries.into_iter().filter(|e| !e.is_dir) {
            let rel = entry.path;
            let kind = AssetKind::from_path(&rel);
            if kind == AssetKind::Texture {
                self.add_texture(FileSource::archive(path, rel));
                continue;
            }
            if !matches!(kind, AssetKind::Model | AssetKind::Skin | AssetKind::Skeleton) {
                continue;
            }
            let Some(model) = model_dir_name(&rel).map(str::to_string) else {
                continue;
            };

            if kind == AssetKind::Skeleton {
                self.add_skeleton(FileSource::archive(path, rel.clone()));
            }

            let source = self.source_for(&model, path.to_path_buf(), Origin::Archive(path.to_path_buf()));
            match kind {
                AssetKind::Model => offer_model_file(source, &rel),
                AssetKind::Skin => {
                    source.skins.insert(rel);
                }
                AssetKind::Skeleton => {
                    source.skeletons.insert(rel);
                }
                AssetKind::Texture | AssetKind::Other => {}
            }
        }

        self.archives.push(path.to_path_buf());
        Ok(())
    }

    fn add_disk_models(&mut self) {
        let Some(players) = child_dir_ci(self.root, MODEL_PREFIX[0])
            .and_then(|models| child_dir_ci(&models, MODEL_PREFIX[1]))
        else {
            return;
        };

        for dir in sorted_children(&players).into_iter().filter(|p| p.is_dir()) {
            self.add_disk_model(&dir);
        }
    }

    fn add_disk_model(&mut self, dir: &Path) {
        let Some(name) = dir.file_name().map(|n| n.to_string_lossy().to_string()) else {
            return;
        };

        let mut model_files = Vec::new();
        let mut skins = Vec::new();
        let mut skeletons = Vec::new();
        for file in sorted_children(dir).into_iter().filter(|p| p.is_file()) {
            let Some(rel) = relative_path(file.as_path(), self.root) else {
                continue;
            };
            match AssetKind::from_path(&rel) {
                AssetKind::Model => model_files.push(rel),
                AssetKind::Skin => skins.push(rel),
                AssetKind::Skeleton => skeletons.push(rel),
                _ => {}
            }
        }

        let chosen = model_files
            .iter()
            .find(|rel| file_stem_lower(rel) == CANONICAL_MODEL_STEM)
            .or_else(|| model_files.first())
            .cloned();
        let Some(model_file) = chosen else {
            tracing::debug!("No model file in {}", dir.display());
            return;
        };

        for rel in &skeletons {
            self.add_skeleton(FileSource::disk(rel.clone()));
        }
        for rel in walk_files(dir) {
            if let Some(rel) = relative_path(rel.as_path(), self.root)
                && AssetKind::from_path(&rel) == AssetKind::Texture
            {
                self.add_texture(FileSource::disk(rel));
            }
        }

        let source = self.source_for(&name, dir.to_path_buf(), Origin::Disk);
        source.model_file = Some(model_file);
        source.skins.extend(skins);
        source.skeletons.extend(skeletons);
    }

    fn add_loose_textures(&mut self) {
        let Some(textures) = child_dir_ci(self.root, TEXTURES_DIR) else {
            return;
        };
        for file in walk_files(&textures) {
            if let Some(rel) = relative_path(file.as_path(), self.root)
                && AssetKind::from_path(&rel) == AssetKind::Texture
            {
                self.add_texture(FileSource::disk(rel));
            }
        }
    }

    fn source_for(&mut self, name: &str, key: PathBuf, origin: Origin) -> &mut ModelSource {
        let preferred = self.preferred;
        self.models
            .entry(name.to_lowercase())
            .or_insert_with(|| PendingModel {
                name: name.to_string(),
                sources: IndexMap::new(),
            })
            .sources
            .entry(key)
            .or_insert_with(|| ModelSource::new(origin, preferred))
    }

    fn add_texture(&mut self, source: FileSource) {
        self.textures_by_stem
            .entry(file_stem_lower(&source.rel_path))
            .or_default()
            .push(source.clone());
        self.textures_by_path
            .entry(normalize_rel(&source.rel_path))
            .or_default()
            .push(source);
    }

    fn add_skeleton(&mut self, source: FileSource) {
        self.skeletons
            .entry(normalize_rel(&source.rel_path))
            .or_default()
            .push(source);
    }

    fn finish(self) -> AssetIndex {
        let mut models = BTreeMap::new();

        for (key, pending) in self.models {
            let mut sources: Vec<ModelSource> = pending.sources.into_values().collect();
            // Stable: equal priorities keep scan order.
            sources.sort_by_key(|s| s.priority);

            let Some(primary) = sources.iter().position(|s| s.model_file.is_some()) else {
                tracing::debug!("Dropping model {} (no model file in any source)", pending.name);
                continue;
            };

            let mut seen = HashSet::new();
            let mut skins: Vec<String> = sources
                .iter()
                .flat_map(|s| s.skins.iter())
                .filter(|s| seen.insert(normalize_rel(s)))
                .cloned()
                .collect();
            skins.sort_by_cached_key(|s| normalize_rel(s));

            models.insert(
                key,
                ModelEntry {
                    name: pending.name,
                    sources,
                    primary,
                    skins,
                },
            );
        }

        AssetIndex {
            root: self.root.to_path_buf(),
            models,
            textures_by_path: self.textures_by_path,
            textures_by_stem: self.textures_by_stem,
            skeletons: self.skeletons,
            archives: self.archives,
            skipped: self.skipped,
        }
    }
}

/// A `model` stem always takes over; otherwise the first model file seen stays.
fn offer_model_file(source: &mut ModelSource, rel: &str) {
    if source.model_file.is_none() || file_stem_lower(rel) == CANONICAL_MODEL_STEM {
        source.model_file = Some(rel.to_string());
    }
}

/// `models/players/<name>[/...]`; the third segment names the model even
/// when it is the member's own file name.
fn model_dir_name(rel: &str) -> Option<&str> {
    let parts: Vec<&str> = rel.split(['/', '\\']).filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return None;
    }
    (parts[0].eq_ignore_ascii_case(MODEL_PREFIX[0]) && parts[1].eq_ignore_ascii_case(MODEL_PREFIX[1]))
        .then_some(parts[2])
}

/// Child directory by name, exact match first then case-insensitive.
fn child_dir_ci(parent: &Path, name: &str) -> Option<PathBuf> {
    let exact = parent.join(name);
    if exact.is_dir() {
        return Some(exact);
    }
    sorted_children(parent).into_iter().find(|p| {
        p.is_dir()
            && p.file_name()
                .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(name))
    })
}

fn sorted_children(dir: &Path) -> Vec<PathBuf> {
    let mut children: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    children.sort();
    children
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SourcePriority;
    use crate::testing::{write_file, write_pk3};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn glm(model: &str) -> (String, &'static [u8]) {
        (format!("models/players/{model}/model.glm"), b"GLM".as_slice())
    }

    fn pk3(root: &Path, name: &str, members: &[(String, &[u8])]) {
        let members: Vec<(&str, &[u8])> = members.iter().map(|(n, d)| (n.as_str(), *d)).collect();
        write_pk3(&root.join(name), &members);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = build_index(temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::RootNotFound { .. }));
    }

    #[test]
    fn disk_beats_preferred_beats_other() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        // "aaa.pk3" sorts (and scans) before "assets1.pk3".
        pk3(root, "aaa.pk3", &[glm("kyle")]);
        pk3(root, "assets1.pk3", &[glm("kyle")]);
        let index = build_index(root).unwrap();
        let kyle = index.model("kyle").unwrap();
        assert_eq!(kyle.primary_source().priority, SourcePriority::PreferredArchive);
        assert_eq!(kyle.source_label(), "assets1.pk3");

        write_file(root, "models/players/kyle/model.glm", b"GLM");
        let index = build_index(root).unwrap();
        let kyle = index.model("KYLE").unwrap();
        assert_eq!(kyle.primary_source().priority, SourcePriority::OnDisk);
        assert_eq!(kyle.source_label(), "disk");
        let priorities: Vec<_> = kyle.sources.iter().map(|s| s.priority).collect();
        assert_eq!(
            priorities,
            [
                SourcePriority::OnDisk,
                SourcePriority::PreferredArchive,
                SourcePriority::OtherArchive
            ]
        );
    }

    #[test]
    fn canonical_model_file_overrides_earlier_one() {
        let temp = TempDir::new().unwrap();
        write_pk3(
            &temp.path().join("a.pk3"),
            &[
                ("models/players/jan/jan_lod.glm", b"".as_slice()),
                ("models/players/jan/model.glm", b"".as_slice()),
                ("models/players/jan/zzz.glm", b"".as_slice()),
            ],
        );
        let index = build_index(temp.path()).unwrap();
        assert_eq!(
            index.model("jan").unwrap().primary_source().model_file.as_deref(),
            Some("models/players/jan/model.glm")
        );
    }

    #[test]
    fn skins_union_across_sources_and_skin_only_archives() {
        let temp = TempDir::new().unwrap();
        write_pk3(
            &temp.path().join("assets1.pk3"),
            &[
                ("models/players/kyle/model.glm", b"".as_slice()),
                ("models/players/kyle/model_default.skin", b"".as_slice()),
            ],
        );
        write_pk3(
            &temp.path().join("kyle_skins.pk3"),
            &[
                ("models/players/kyle/model_blue.skin", b"".as_slice()),
                ("Models/Players/Kyle/Model_Default.skin", b"".as_slice()),
            ],
        );
        // No model file anywhere: dropped.
        write_pk3(
            &temp.path().join("orphan.pk3"),
            &[("models/players/ghost/model_default.skin", b"".as_slice())],
        );

        let index = build_index(temp.path()).unwrap();
        let kyle = index.model("kyle").unwrap();
        assert_eq!(
            kyle.skins,
            [
                "models/players/kyle/model_blue.skin",
                "models/players/kyle/model_default.skin"
            ]
        );
        assert!(index.model("ghost").is_none());
        assert_eq!(index.model_count(), 1);
    }

    #[test]
    fn third_segment_names_the_model_and_textures_anywhere_count() {
        let temp = TempDir::new().unwrap();
        write_pk3(
            &temp.path().join("a.pk3"),
            &[
                ("models/players/odd.glm", b"".as_slice()),
                ("models/stray.glm", b"".as_slice()),
                ("gfx/hud/Icon.TGA", b"".as_slice()),
            ],
        );
        let index = build_index(temp.path()).unwrap();
        assert_eq!(index.model_count(), 1);
        let entry = index.model("odd.glm").unwrap();
        assert_eq!(
            entry.primary_source().model_file.as_deref(),
            Some("models/players/odd.glm")
        );
        assert_eq!(index.textures_at("gfx/hud/icon.tga").len(), 1);
        assert_eq!(index.textures_with_stem("ICON").len(), 1);
    }

    #[test]
    fn corrupt_archive_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("broken.pk3"), b"garbage").unwrap();
        pk3(temp.path(), "good.pk3", &[glm("kyle")]);

        let index = build_index(temp.path()).unwrap();
        assert_eq!(index.model_count(), 1);
        assert_eq!(index.skipped_archives().len(), 1);
        assert_eq!(index.archives().len(), 1);
    }

    #[test]
    fn disk_models_and_loose_textures_under_base() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base");
        write_file(&base, "models/players/tavion/tavion_body.glm", b"");
        write_file(&base, "models/players/tavion/model_default.skin", b"");
        write_file(&base, "models/players/tavion/tavion.gla", b"");
        write_file(&base, "models/players/tavion/maps/body.tga", b"");
        write_file(&base, "models/players/empty/readme.txt", b"");
        write_file(&base, "textures/common/white.jpg", b"");

        let index = build_index(temp.path()).unwrap();
        assert_eq!(index.root(), base);

        let tavion = index.model("tavion").unwrap();
        assert_eq!(
            tavion.primary_source().model_file.as_deref(),
            Some("models/players/tavion/tavion_body.glm")
        );
        assert_eq!(tavion.skins, ["models/players/tavion/model_default.skin"]);
        assert_eq!(index.skeletons_at("models/players/tavion/tavion.gla").len(), 1);
        assert_eq!(index.textures_at("models/players/tavion/maps/body.tga").len(), 1);
        assert_eq!(index.textures_at("textures/common/white.jpg").len(), 1);
        assert!(index.model("empty").is_none());
    }

    #[test]
    fn rebuilding_unchanged_tree_gives_equal_index() {
        let temp = TempDir::new().unwrap();
        pk3(temp.path(), "assets1.pk3", &[glm("kyle"), glm("jan")]);
        write_file(temp.path(), "models/players/kyle/model.glm", b"");
        write_file(temp.path(), "textures/x.png", b"");

        let first = build_index(temp.path()).unwrap();
        let second = build_index(temp.path()).unwrap();
        assert_eq!(first, second);
    }
}
