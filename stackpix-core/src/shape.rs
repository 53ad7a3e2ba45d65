//! Shape/dtype records and the sizing of a concatenated dataset.

use crate::axis::AxisOrder;
use crate::dtype::Dtype;
use crate::layout::transform_shape;
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of axes kept in a concatenated dataset (`t, y, x`).
pub const PLAN_NDIM: usize = 3;

/// Shape and element type of one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeDtype {
    pub shape: Vec<usize>,
    pub dtype: Dtype,
}

impl ShapeDtype {
    /// Creates a new record.
    #[must_use]
    pub fn new(shape: Vec<usize>, dtype: Dtype) -> Self {
        Self { shape, dtype }
    }

    /// Shape after normalizing to 5-D, folding pages and reordering axes.
    ///
    /// # Errors
    /// See [`transform_shape`].
    pub fn transformed(&self, order: &AxisOrder, pages_to_channel: usize) -> Result<Self> {
        let shape = transform_shape(&self.shape, order, pages_to_channel)?;
        Ok(Self::new(shape.to_vec(), self.dtype))
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns true if any axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final shape and dtype of a dataset built by stacking 3-D blocks.
///
/// Extents add up along the concatenation axis and take the running maximum
/// along the other two. The dtype is the running [`Dtype::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetPlan {
    pub axis: usize,
    pub shape: [usize; PLAN_NDIM],
    pub dtype: Dtype,
    pub blocks: usize,
}

impl DatasetPlan {
    /// Starts an empty plan that concatenates along `axis`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAxis`] if `axis` is not 0, 1 or 2.
    pub fn new(axis: usize) -> Result<Self> {
        if axis >= PLAN_NDIM {
            return Err(Error::InvalidAxis(axis));
        }
        Ok(Self {
            axis,
            shape: [0; PLAN_NDIM],
            dtype: Dtype::Bool,
            blocks: 0,
        })
    }

    /// Accounts for one more block.
    ///
    /// The plan is left unchanged when an error is returned.
    ///
    /// # Errors
    /// Returns [`Error::IncompatibleDtypes`] if `dtype` has no lossless join
    /// with the dtype planned so far.
    pub fn push(&mut self, shape: [usize; PLAN_NDIM], dtype: Dtype) -> Result<()> {
        let current = self.dtype;
        self.dtype = current
            .join(dtype)
            .ok_or(Error::IncompatibleDtypes {
                current,
                incoming: dtype,
            })?;

        for (i, extent) in shape.into_iter().enumerate() {
            if i == self.axis {
                self.shape[i] += extent;
            } else {
                self.shape[i] = self.shape[i].max(extent);
            }
        }
        self.blocks += 1;
        Ok(())
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns true if no element will be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
