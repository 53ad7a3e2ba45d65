//! stackpix-io: TIFF stack reading and HDF5 concatenation.
//!
//! Multi-page TIFF files are memory-mapped with memmap2 and decoded into
//! dense 5-D arrays in a caller-chosen axis order. With the `hdf5` feature,
//! many stacks can be concatenated into one 3-D dataset.
//!

mod array;
mod concat;
mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod reader;

pub use array::TiffArray;
pub use concat::{expand_paths, plan_concatenation, ConcatOptions, Hdf5Location};
pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use crate::hdf5::concatenate_tiffs;
pub use reader::{inspect_tiff, inspect_tiff_transformed, read_tiff, TiffReader};
