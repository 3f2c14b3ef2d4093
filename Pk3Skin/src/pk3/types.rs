//! Shared PK3 types

use chrono::NaiveDateTime;

/// One member of a PK3 archive as listed from its central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pk3Entry {
    /// Member path exactly as stored in the archive.
    pub path: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Stored (compressed) size in bytes.
    pub compressed_size: u64,
    /// Last modification time, when the archive records a valid one.
    pub modified: Option<NaiveDateTime>,
    /// Directory entries carry a trailing `/` and no data.
    pub is_dir: bool,
}

impl Pk3Entry {
    /// Compression ratio as a percentage saved (0 for stored members).
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            (1.0 - self.compressed_size as f64 / self.size as f64) * 100.0
        }
    }
}

/// Progress information during PK3 operations
#[derive(Debug, Clone)]
pub struct Pk3Progress {
    /// Current operation phase
    pub phase: Pk3Phase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current member being processed (if applicable)
    pub current_file: Option<String>,
}

impl Pk3Progress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: Pk3Phase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a member name
    #[must_use]
    pub fn with_file(phase: Pk3Phase, current: usize, total: usize, file: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a PK3 operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pk3Phase {
    /// Reading the central directory
    ReadingTable,
    /// Writing members to disk
    WritingFiles,
    /// Operation complete
    Complete,
}

impl Pk3Phase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingTable => "Reading file table",
            Self::WritingFiles => "Writing files",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback type for PK3 operations
pub type ProgressCallback<'a> = &'a dyn Fn(&Pk3Progress);
