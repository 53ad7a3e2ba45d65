//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Malformed glob pattern.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Unreadable path while expanding a glob pattern.
    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// File that cannot be handled as a multi-page image.
    #[error("unsupported format in {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// Malformed HDF5 destination.
    #[error("invalid HDF5 location: {0}")]
    InvalidLocation(String),

    /// Input patterns matched no file.
    #[error("no input files matched {0:?}")]
    NoInputFiles(Vec<String>),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] stackpix_core::Error),
}

impl Error {
    pub(crate) fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
