//! Fixed names of the game data layout

/// Canonical data subdirectory; when present under the game path it becomes the scan root.
pub const BASE_DIR: &str = "base";

/// Two-level prefix under which character models live (archives and disk alike).
pub const MODEL_PREFIX: [&str; 2] = ["models", "players"];

/// Loose texture directory scanned on disk.
pub const TEXTURES_DIR: &str = "textures";

/// Archive extensions picked up by the index builder.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["pk3"];

/// Recognized texture extensions, in fallback preference order.
pub const TEXTURE_EXTENSIONS: &[&str] = &["jpg", "png", "tga"];

/// Model mesh extension.
pub const MODEL_EXTENSION: &str = "glm";

/// Skin descriptor extension.
pub const SKIN_EXTENSION: &str = "skin";

/// Skeleton (animation) extension.
pub const SKELETON_EXTENSION: &str = "gla";

/// Stem of the canonical model file; always wins over other `.glm` files of a source.
pub const CANONICAL_MODEL_STEM: &str = "model";

/// Archive whose copies outrank every other archive.
pub const PREFERRED_ARCHIVE: &str = "assets1.pk3";

/// Shared humanoid skeleton used when a model ships none.
pub const FALLBACK_SKELETON: &str = "models/players/_humanoid/_humanoid.gla";

/// Working cache folder, relative to the scan root.
pub const CACHE_FOLDER: &str = ".pk3skin_cache";

/// Marker file identifying a directory as a working cache; only marked directories are pruned.
pub const CACHE_MARKER: &str = ".pk3skin-cache";

/// Skin file stem prefix stripped for display and for the importer's skin name.
pub const SKIN_STEM_PREFIX: &str = "model_";
