//! N-dimensional index enumeration and boolean masks.
//!
//! These helpers map between three views of the same set of positions in a
//! shape: a list of index tuples, one coordinate array per axis, and a dense
//! boolean mask.

use crate::{Error, Result};
use ndarray::{ArrayD, Dimension, IxDyn};
use std::iter::FusedIterator;

/// Lazy row-major enumeration of every index tuple inside a shape.
///
/// Works as an odometer: the last axis advances fastest and carries into the
/// previous one when it wraps. Only the current counter is stored, so memory
/// use does not depend on the number of positions. Exhaustion is tracked by
/// the counter itself, so shapes whose element count overflows `usize` still
/// enumerate correctly; only the `size_hint` loses its upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGenerator {
    sizes: Vec<usize>,
    counter: Option<Vec<usize>>,
    remaining: Option<usize>,
}

/// Number of positions in `sizes`, or `None` if it overflows `usize`.
fn checked_count(sizes: &[usize]) -> Option<usize> {
    sizes
        .iter()
        .try_fold(1_usize, |count, &size| count.checked_mul(size))
}

impl IndexGenerator {
    /// Creates a generator over `[0, sizes[0]) × … × [0, sizes[n-1])`.
    #[must_use]
    pub fn new(sizes: &[usize]) -> Self {
        let mut generator = Self {
            sizes: sizes.to_vec(),
            counter: None,
            remaining: None,
        };
        generator.reset();
        generator
    }

    /// Returns the sizes this generator enumerates.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Total number of index tuples, or `None` if it overflows `usize`.
    #[must_use]
    pub fn total(&self) -> Option<usize> {
        checked_count(&self.sizes)
    }

    /// Rewinds to the first index tuple.
    pub fn reset(&mut self) {
        self.counter = if self.sizes.contains(&0) {
            None
        } else {
            Some(vec![0; self.sizes.len()])
        };
        self.remaining = self.total();
    }
}

/// Moves `counter` to the next tuple; returns false once it wraps past the end.
fn advance(counter: &mut [usize], sizes: &[usize]) -> bool {
    for (coord, &size) in counter.iter_mut().zip(sizes).rev() {
        *coord += 1;
        if *coord < size {
            return true;
        }
        *coord = 0;
    }
    false
}

impl Iterator for IndexGenerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.counter.take()?;
        let mut following = current.clone();
        if advance(&mut following, &self.sizes) {
            self.counter = Some(following);
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) => (remaining, Some(remaining)),
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for IndexGenerator {}

/// Iterates over every index tuple of a shape in row-major order.
///
/// An empty `sizes` yields a single empty tuple; any zero size yields nothing.
///
/// ```
/// use stackpix_core::index_generator;
///
/// let indices: Vec<_> = index_generator(&[2, 1]).collect();
/// assert_eq!(indices, vec![vec![0, 0], vec![1, 0]]);
/// ```
#[must_use]
pub fn index_generator(sizes: &[usize]) -> IndexGenerator {
    IndexGenerator::new(sizes)
}

/// Converts index tuples into one coordinate array per axis.
///
/// `arrays[axis][i]` is the `axis` coordinate of the `i`-th tuple. An empty
/// list produces no arrays at all.
///
/// # Errors
/// Returns [`Error::IndexDimensionMismatch`] if the tuples do not all have the
/// same length.
pub fn indices_to_index_array<I>(indices: &[I]) -> Result<Vec<Vec<usize>>>
where
    I: AsRef<[usize]>,
{
    let Some(first) = indices.first() else {
        return Ok(Vec::new());
    };
    let ndim = first.as_ref().len();

    let mut arrays = vec![Vec::with_capacity(indices.len()); ndim];
    for index in indices {
        let index = index.as_ref();
        if index.len() != ndim {
            return Err(Error::IndexDimensionMismatch {
                index: index.to_vec(),
                expected: ndim,
                found: index.len(),
            });
        }
        for (axis, &coord) in index.iter().enumerate() {
            arrays[axis].push(coord);
        }
    }

    Ok(arrays)
}

/// Builds a boolean mask of `shape` that is `true` exactly at `indices`.
///
/// Repeated indices are harmless. A 0-d `shape` gives a scalar mask.
///
/// # Errors
/// Returns [`Error::IndexDimensionMismatch`] if a tuple's length differs from
/// the number of dimensions, or [`Error::IndexOutOfBounds`] if a coordinate
/// does not fit its axis.
pub fn indices_to_bool_mask<I>(indices: &[I], shape: &[usize]) -> Result<ArrayD<bool>>
where
    I: AsRef<[usize]>,
{
    let mut mask = ArrayD::from_elem(IxDyn(shape), false);

    for index in indices {
        let index = index.as_ref();
        check_index(index, shape)?;
        mask[index] = true;
    }

    Ok(mask)
}

/// Lists the `true` positions of a mask in row-major order.
#[must_use]
pub fn bool_mask_to_indices(mask: &ArrayD<bool>) -> Vec<Vec<usize>> {
    mask.indexed_iter()
        .filter(|(_, set)| **set)
        .map(|(index, _)| index.slice().to_vec())
        .collect()
}

fn check_index(index: &[usize], shape: &[usize]) -> Result<()> {
    if index.len() != shape.len() {
        return Err(Error::IndexDimensionMismatch {
            index: index.to_vec(),
            expected: shape.len(),
            found: index.len(),
        });
    }
    for (axis, (&coord, &size)) in index.iter().zip(shape).enumerate() {
        if coord >= size {
            return Err(Error::IndexOutOfBounds {
                axis,
                index: coord,
                size,
            });
        }
    }
    Ok(())
}
