//! # pk3skin
//!
//! Asset index and skin resolver for Ghoul2 player models shipped in PK3
//! archives.
//!
//! ## What it does
//!
//! - **PK3 archives** - list, read and extract members of zip-based PK3s
//! - **Asset index** - one scan of a game folder records which archive or
//!   loose folder provides each model, skin, skeleton and texture
//! - **Skin resolution** - turn a `.skin` file into the exact set of files a
//!   model importer needs, finding textures under other extensions or paths
//! - **Working cache** - copy that set into a scratch folder, prune stale
//!   files and rewrite the cached skin to point at what was found
//!
//! ## Quick Start
//!
//! ```no_run
//! use pk3skin::browser::ModelBrowser;
//! use pk3skin::config::Config;
//!
//! let mut browser = ModelBrowser::new(Config::load());
//! browser.set_game_path("~/games/JediAcademy/GameData");
//!
//! for model in browser.list_models("kyle")? {
//!     println!("{} ({} skins)", model.name, model.skin_count);
//! }
//!
//! let report = browser.import("kyle", None)?;
//! println!("Model ready at {}", report.model_path.display());
//! for warning in report.warnings() {
//!     eprintln!("{warning}");
//! }
//! # Ok::<(), pk3skin::Error>(())
//! ```
//!
//! ### Working with PK3 Archives
//!
//! ```no_run
//! use pk3skin::pk3::Pk3Operations;
//!
//! let files = Pk3Operations::list("assets1.pk3")?;
//! println!("Found {} files", files.len());
//!
//! let skin = Pk3Operations::read_file_bytes("assets1.pk3", "models/players/kyle/model_default.skin")?;
//! # Ok::<(), pk3skin::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `pk3skin` command-line binary

pub mod browser;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod index;
pub mod pk3;
pub mod skin;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::browser::{ImportReport, ModelBrowser, ModelListing, SkinChoice};
    pub use crate::config::Config;

    pub use crate::pk3::{Pk3Archive, Pk3Entry, Pk3Operations, find_pk3_files};

    pub use crate::index::{
        AssetIndex, AssetKind, FileSource, IndexCache, ModelEntry, Origin, build_index,
    };

    pub use crate::skin::{SkinResolution, parse_skin_text, resolve_skin};

    pub use crate::cache::{MaterializeReport, materialize, rewrite_skin_paths};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
