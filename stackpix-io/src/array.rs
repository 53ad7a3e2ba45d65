//! Dynamically typed 5-D pixel arrays.

use ndarray::{Array3, Array5, ArrayView5, Axis};
use num_traits::AsPrimitive;
use stackpix_core::{Dtype, Error as CoreError};

use crate::Result;

/// A dense 5-D array holding one of the readable TIFF element types.
#[derive(Debug, Clone, PartialEq)]
pub enum TiffArray {
    U8(Array5<u8>),
    U16(Array5<u16>),
    U32(Array5<u32>),
    I16(Array5<i16>),
    I32(Array5<i32>),
    F32(Array5<f32>),
    F64(Array5<f64>),
}

/// Applies `$body` to the inner array of every [`TiffArray`] variant.
macro_rules! dyn_map {
    ($value:expr, $array:ident => $body:expr) => {
        match $value {
            TiffArray::U8($array) => $body,
            TiffArray::U16($array) => $body,
            TiffArray::U32($array) => $body,
            TiffArray::I16($array) => $body,
            TiffArray::I32($array) => $body,
            TiffArray::F32($array) => $body,
            TiffArray::F64($array) => $body,
        }
    };
}

impl TiffArray {
    /// Element type of the array.
    #[must_use]
    pub fn dtype(&self) -> Dtype {
        match self {
            TiffArray::U8(_) => Dtype::U8,
            TiffArray::U16(_) => Dtype::U16,
            TiffArray::U32(_) => Dtype::U32,
            TiffArray::I16(_) => Dtype::I16,
            TiffArray::I32(_) => Dtype::I32,
            TiffArray::F32(_) => Dtype::F32,
            TiffArray::F64(_) => Dtype::F64,
        }
    }

    /// Extent of each of the five axes.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        dyn_map!(self, a => a.shape())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        dyn_map!(self, a => a.len())
    }

    /// Returns true if any axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the array into element type `T`.
    #[must_use]
    pub fn cast<T>(&self) -> Array5<T>
    where
        T: Copy + 'static,
        u8: AsPrimitive<T>,
        u16: AsPrimitive<T>,
        u32: AsPrimitive<T>,
        i16: AsPrimitive<T>,
        i32: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        dyn_map!(self, a => a.mapv(AsPrimitive::as_))
    }

    /// Fixes the first two axes and converts the remaining 3-D block to `T`.
    ///
    /// With an array read in `cztyx` order this selects one channel and one
    /// z-slice, leaving `(t, y, x)`.
    ///
    /// # Errors
    /// Returns [`CoreError::SelectionOutOfRange`] if either index exceeds its
    /// axis.
    pub fn select_block<T>(&self, first: usize, second: usize) -> Result<Array3<T>>
    where
        T: Copy + 'static,
        u8: AsPrimitive<T>,
        u16: AsPrimitive<T>,
        u32: AsPrimitive<T>,
        i16: AsPrimitive<T>,
        i32: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        dyn_map!(self, a => select_block(a.view(), first, second))
    }
}

fn select_block<S, T>(array: ArrayView5<'_, S>, first: usize, second: usize) -> Result<Array3<T>>
where
    S: AsPrimitive<T>,
    T: Copy + 'static,
{
    let shape = array.shape();
    check_selection('c', first, shape[0])?;
    check_selection('z', second, shape[1])?;

    let block = array
        .index_axis_move(Axis(0), first)
        .index_axis_move(Axis(0), second);
    Ok(block.mapv(AsPrimitive::as_))
}

pub(crate) fn check_selection(axis: char, index: usize, extent: usize) -> Result<()> {
    if index >= extent {
        return Err(CoreError::SelectionOutOfRange {
            axis,
            index,
            extent,
        }
        .into());
    }
    Ok(())
}

macro_rules! impl_from_array5 {
    ($($from:ty, $variant:ident),*) => {
        $(
            impl From<Array5<$from>> for TiffArray {
                fn from(array: Array5<$from>) -> Self {
                    TiffArray::$variant(array)
                }
            }
        )*
    };
}

impl_from_array5!(u8, U8, u16, U16, u32, U32, i16, I16, i32, I32, f32, F32, f64, F64);
