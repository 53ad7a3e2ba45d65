//! Error types for stackpix-core.

use crate::dtype::Dtype;
use thiserror::Error;

/// Result type alias for stackpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for stackpix operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An index tuple does not have one coordinate per dimension.
    #[error("index {index:?} has {found} coordinates, expected {expected}")]
    IndexDimensionMismatch {
        index: Vec<usize>,
        expected: usize,
        found: usize,
    },

    /// A coordinate lies outside its axis.
    #[error("index {index} is out of bounds for axis {axis} with size {size}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        size: usize,
    },

    /// Axis order string is not a permutation of `zyxtc`.
    #[error("invalid axis order {0:?}: expected a permutation of \"zyxtc\"")]
    InvalidAxisOrder(String),

    /// Channel folding factor is zero or does not divide the page count.
    #[error("invalid pages-to-channel factor {factor} for {pages} pages")]
    InvalidChannelFold { factor: usize, pages: usize },

    /// Concatenation axis outside the three output axes.
    #[error("invalid concatenation axis {0}: expected 0, 1 or 2")]
    InvalidAxis(usize),

    /// Shape with a dimensionality that cannot be normalized to 5-D.
    #[error("invalid dimensionality for TIFF: found shape {0:?}")]
    Dimensionality(Vec<usize>),

    /// No lossless common dtype exists.
    #[error("cannot find safe conversion between {current} and {incoming}")]
    IncompatibleDtypes { current: Dtype, incoming: Dtype },

    /// Element type has no supported read precision.
    #[error("unsupported dtype {0}")]
    UnsupportedDtype(Dtype),

    /// Channel or z selection outside the array.
    #[error("{axis} index {index} is out of range for extent {extent}")]
    SelectionOutOfRange {
        axis: char,
        index: usize,
        extent: usize,
    },
}
