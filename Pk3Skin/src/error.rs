//! Error types for `pk3skin`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `pk3skin` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Scan Errors ====================
    /// The scan root (game path) does not exist or is not a directory.
    #[error("scan root not found: {path}")]
    RootNotFound {
        /// The root that was requested.
        path: PathBuf,
    },

    /// No game path has been configured.
    #[error("game path is not set")]
    GamePathNotSet,

    // ==================== PK3 Archive Errors ====================
    /// The archive file does not exist.
    #[error("archive not found: {path}")]
    ArchiveNotFound {
        /// The missing archive path.
        path: PathBuf,
    },

    /// The file exists but is not a readable PK3/zip archive.
    #[error("not a valid PK3/ZIP archive: {path} ({message})")]
    ArchiveUnreadable {
        /// The archive path.
        path: PathBuf,
        /// The underlying zip error.
        message: String,
    },

    /// The requested member is not in the archive.
    #[error("file not found in {archive}: {member}")]
    MemberNotFound {
        /// The archive that was searched.
        archive: PathBuf,
        /// The member path as requested.
        member: String,
    },

    /// An archive member (or cache destination) would land outside its destination root.
    #[error("unsafe path detected in archive entry: {member}")]
    PathTraversal {
        /// The offending relative path.
        member: String,
    },

    // ==================== Resolution Errors ====================
    /// The model name is not in the index.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The skin file is not provided by any source of the model.
    #[error("skin file not found for model {model}: {skin}")]
    SkinNotFound {
        /// The model name.
        model: String,
        /// The requested skin path.
        skin: String,
    },

    // ==================== Cache Errors ====================
    /// Copying one asset into the working cache failed.
    #[error("failed to copy {path}: {message}")]
    CopyFailed {
        /// Destination path relative to the cache root.
        path: String,
        /// The underlying failure.
        message: String,
    },

    /// The cache folder setting would put the cache on top of game data.
    #[error("unsafe cache folder {folder:?}: {reason}")]
    UnsafeCacheFolder {
        /// The configured value.
        folder: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A non-empty directory without the cache marker; it is never pruned.
    #[error("not a pk3skin cache directory: {path}")]
    NotACacheDir {
        /// The directory that was refused.
        path: PathBuf,
    },

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Whether this error is the traversal guard firing (as opposed to plain I/O).
    #[must_use]
    pub fn is_path_traversal(&self) -> bool {
        matches!(self, Error::PathTraversal { .. })
    }
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `pk3skin` operations.
pub type Result<T> = std::result::Result<T, Error>;
