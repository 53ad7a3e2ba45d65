//! stackpix-core: Index bookkeeping and layout rules for image stacks.
//!
//! This crate provides the pure, I/O-free pieces of the ingestion pipeline:
//! N-dimensional index enumeration and masks, semantic axis orders, the
//! lossless dtype lattice, and the transforms that bring a decoded TIFF into
//! the canonical 5-D layout.
//!

pub mod axis;
pub mod dtype;
pub mod error;
pub mod index;
pub mod layout;
pub mod shape;

pub use axis::{Axis, AxisOrder, NDIM};
pub use dtype::{Dtype, ReadPrecision};
pub use error::{Error, Result};
pub use index::{
    bool_mask_to_indices, index_generator, indices_to_bool_mask, indices_to_index_array,
    IndexGenerator,
};
pub use layout::{standardize_array, transform_shape};
pub use shape::{DatasetPlan, ShapeDtype};
