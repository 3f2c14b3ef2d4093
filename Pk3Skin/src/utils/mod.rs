//! Utility functions

pub mod path;

pub use path::{
    canonicalize_lenient, expand_tilde, extension_lower, file_name, file_stem_lower,
    normalize_path, normalize_rel, parent_dir, relative_path, resolve_scan_root, safe_join,
    with_extension,
};
