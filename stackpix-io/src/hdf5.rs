//! HDF5 output for concatenated TIFF stacks.

use crate::concat::{expand_paths, plan_concatenation, ConcatOptions, Hdf5Location};
use crate::reader::read_tiff;
use crate::Result;
use hdf5::types::H5Type;
use hdf5::{Dataset, File, Group};
use log::info;
use ndarray::{s, Array3};
use num_traits::AsPrimitive;
use stackpix_core::{AxisOrder, DatasetPlan, Dtype, Error as CoreError};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Concatenates TIFF stacks into one 3-D dataset.
///
/// `inputs` may mix plain paths and glob patterns. Every file is inspected
/// before the destination is opened; the file is then opened in append mode
/// (created if missing), missing groups are created, and each file's
/// selected `(t, y, x)` block is written into the next slab along
/// `options.axis`.
///
/// A failure after the dataset was created leaves it in place, with the
/// slabs not yet written still zero-filled.
///
/// # Errors
/// Returns an error if the inputs cannot be expanded or sized (see
/// [`plan_concatenation`]), if the dataset already exists, or on any HDF5
/// or TIFF failure while writing.
pub fn concatenate_tiffs<S: AsRef<str>>(
    inputs: &[S],
    location: &Hdf5Location,
    options: &ConcatOptions,
) -> Result<DatasetPlan> {
    // axis is checked before globbing touches the filesystem
    DatasetPlan::new(options.axis)?;
    let files = expand_paths(inputs)?;
    let plan = plan_concatenation(&files, options)?;

    let file = File::append(&location.file)?;
    let group = require_group(&file, location)?;

    macro_rules! write_as {
        ($t:ty) => {
            write_stack::<$t>(&group, location, &files, options, &plan)?
        };
    }

    match plan.dtype {
        Dtype::U8 => write_as!(u8),
        Dtype::U16 => write_as!(u16),
        Dtype::U32 => write_as!(u32),
        Dtype::I16 => write_as!(i16),
        Dtype::I32 => write_as!(i32),
        Dtype::F32 => write_as!(f32),
        Dtype::F64 => write_as!(f64),
        other => return Err(CoreError::UnsupportedDtype(other).into()),
    }

    info!(
        "wrote {} blocks to {location} as {:?} {}",
        plan.blocks, plan.shape, plan.dtype
    );
    Ok(plan)
}

/// Opens the group named by `location`, creating missing levels.
fn require_group(file: &File, location: &Hdf5Location) -> Result<Group> {
    let mut group = file.group("/")?;
    for name in location.group_components() {
        group = match group.group(name) {
            Ok(existing) => existing,
            Err(_) => group.create_group(name)?,
        };
    }
    Ok(group)
}

/// Slab covering `extent` elements along `axis`, starting at `offset` on the
/// concatenation axis and at 0 elsewhere.
fn slab_range(axis: usize, concat_axis: usize, offset: usize, extent: usize) -> Range<usize> {
    if axis == concat_axis {
        offset..offset + extent
    } else {
        0..extent
    }
}

fn write_stack<T>(
    group: &Group,
    location: &Hdf5Location,
    files: &[PathBuf],
    options: &ConcatOptions,
    plan: &DatasetPlan,
) -> Result<()>
where
    T: H5Type + Copy + 'static,
    u8: AsPrimitive<T>,
    u16: AsPrimitive<T>,
    u32: AsPrimitive<T>,
    i16: AsPrimitive<T>,
    i32: AsPrimitive<T>,
    f32: AsPrimitive<T>,
    f64: AsPrimitive<T>,
{
    let [d0, d1, d2] = plan.shape;
    let dataset = group
        .new_dataset::<T>()
        .shape((d0, d1, d2))
        .create(location.dataset.as_str())?;

    let mut offset = 0;
    for path in files {
        let block = read_block::<T>(path, options)?;
        offset = write_block(&dataset, &block, plan.axis, offset)?;
        info!("wrote {} up to offset {offset}", path.display());
    }
    Ok(())
}

fn read_block<T>(path: &Path, options: &ConcatOptions) -> Result<Array3<T>>
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
    let array = read_tiff(path, &AxisOrder::CHANNEL_FIRST, options.pages_to_channel)?;
    array.select_block(options.channel, options.z_index)
}

/// Writes `block` at `offset` along `axis` and returns the next offset.
fn write_block<T: H5Type>(
    dataset: &Dataset,
    block: &Array3<T>,
    axis: usize,
    offset: usize,
) -> Result<usize> {
    let (b0, b1, b2) = block.dim();
    let selection = s![
        slab_range(0, axis, offset, b0),
        slab_range(1, axis, offset, b1),
        slab_range(2, axis, offset, b2)
    ];
    dataset.write_slice(block.view(), selection)?;
    Ok(offset + block.len_of(ndarray::Axis(axis)))
}
