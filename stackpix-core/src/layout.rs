//! Normalizing image stacks to the canonical 5-D `zyxtc` layout.
//!
//! The shape functions and the array functions apply the same three steps,
//! so metadata can be sized up front and agree with what a later read
//! returns:
//!
//! 1. a missing `z` axis becomes a leading singleton,
//! 2. every `k` consecutive pages are folded into `k` channels,
//! 3. axes are permuted from `zyxtc` into the requested order.

use crate::axis::{AxisOrder, NDIM};
use crate::{Error, Result};
use ndarray::{Array5, ArrayD, Axis as ArrayAxis, Ix5};

/// Pads a 4-D `(y, x, t, c)` shape with a leading `z`; passes 5-D through.
///
/// # Errors
/// Returns [`Error::Dimensionality`] for any other number of dimensions.
pub fn normalize_shape(shape: &[usize]) -> Result<[usize; NDIM]> {
    match *shape {
        [z, y, x, t, c] => Ok([z, y, x, t, c]),
        [y, x, t, c] => Ok([1, y, x, t, c]),
        _ => Err(Error::Dimensionality(shape.to_vec())),
    }
}

/// Reinterprets every `factor` pages as `factor` channels of one time step.
///
/// # Errors
/// Returns [`Error::InvalidChannelFold`] if `factor` is zero or does not
/// divide the number of pages.
pub fn fold_pages_shape(shape: [usize; NDIM], factor: usize) -> Result<[usize; NDIM]> {
    let [z, y, x, t, c] = shape;
    check_fold(t, factor)?;
    Ok([z, y, x, t / factor, c * factor])
}

/// Applies all three normalization steps to a raw inspected shape.
///
/// # Errors
/// Propagates the errors of [`normalize_shape`] and [`fold_pages_shape`].
pub fn transform_shape(raw: &[usize], order: &AxisOrder, factor: usize) -> Result<[usize; NDIM]> {
    let canonical = fold_pages_shape(normalize_shape(raw)?, factor)?;
    Ok(order.permute_shape(canonical))
}

/// Converts a 4-D `(y, x, t, c)` or 5-D canonical array to [`Array5`].
///
/// # Errors
/// Returns [`Error::Dimensionality`] for any other number of dimensions.
pub fn normalize_array<T>(array: ArrayD<T>) -> Result<Array5<T>> {
    let shape = array.shape().to_vec();
    let array = match array.ndim() {
        5 => array,
        4 => array.insert_axis(ArrayAxis(0)),
        _ => return Err(Error::Dimensionality(shape)),
    };
    array
        .into_dimensionality::<Ix5>()
        .map_err(|_| Error::Dimensionality(shape))
}

/// Folds pages into channels, matching [`fold_pages_shape`].
///
/// Works in row-major order: page `j * factor + i`, channel `ch` ends up at
/// time `j`, channel `i * channels + ch`.
///
/// # Errors
/// Returns [`Error::InvalidChannelFold`] if `factor` is zero or does not
/// divide the number of pages.
pub fn fold_pages_into_channels<T: Clone>(array: Array5<T>, factor: usize) -> Result<Array5<T>> {
    let (z, y, x, t, c) = array.dim();
    check_fold(t, factor)?;
    if factor == 1 {
        return Ok(array);
    }

    let [z, y, x, t, c] = fold_pages_shape([z, y, x, t, c], factor)?;
    let array = into_standard_layout(array);
    array
        .into_shape_with_order((z, y, x, t, c))
        .map_err(|_| Error::Dimensionality(vec![z, y, x, t, c]))
}

/// Permutes a canonical array into `order` and copies it into a fresh
/// row-major buffer.
#[must_use]
pub fn reorder_axes<T: Clone>(array: Array5<T>, order: &AxisOrder) -> Array5<T> {
    let permuted = array.permuted_axes(order.permutation_from_canonical());
    into_standard_layout(permuted)
}

/// Runs the full normalization on a decoded 4-D or 5-D canonical array.
///
/// # Errors
/// Propagates the errors of [`normalize_array`] and
/// [`fold_pages_into_channels`].
pub fn standardize_array<T: Clone>(
    array: ArrayD<T>,
    order: &AxisOrder,
    factor: usize,
) -> Result<Array5<T>> {
    let array = fold_pages_into_channels(normalize_array(array)?, factor)?;
    Ok(reorder_axes(array, order))
}

fn into_standard_layout<T: Clone>(array: Array5<T>) -> Array5<T> {
    if array.is_standard_layout() {
        array
    } else {
        array.as_standard_layout().into_owned()
    }
}

fn check_fold(pages: usize, factor: usize) -> Result<()> {
    if factor == 0 || pages % factor != 0 {
        return Err(Error::InvalidChannelFold { factor, pages });
    }
    Ok(())
}
