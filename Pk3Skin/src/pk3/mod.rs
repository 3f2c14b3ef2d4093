//! PK3 archive operations module
//!
//! PK3 files are plain zip archives. This module lists and reads their
//! members, extracts them without ever writing outside the destination, and
//! discovers archives under a game directory.

mod archive;
mod batch;
mod filter;
mod operations;
mod types;

// Primary public API
pub use archive::Pk3Archive;
pub use operations::Pk3Operations;
pub use types::{Pk3Entry, Pk3Phase, Pk3Progress, ProgressCallback};

pub use batch::{find_archives, find_pk3_files};
pub use filter::{matches_glob, member_matches};

// Traversal guard shared with the working cache
pub use crate::utils::safe_join;
