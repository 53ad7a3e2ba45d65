//! Input expansion, destination parsing and sizing for stacking many TIFF
//! files into one 3-D dataset.
//!
//! Every input is read in `cztyx` order; one channel and one z-slice are
//! selected, leaving a `(t, y, x)` block. Blocks are laid end to end along
//! the concatenation axis.

use crate::array::check_selection;
use crate::reader::inspect_tiff_transformed;
use crate::{Error, Result};
use log::{info, warn};
use stackpix_core::{AxisOrder, DatasetPlan, ReadPrecision, ShapeDtype};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HDF5_EXTENSIONS: [&str; 3] = ["h5", "hdf5", "he5"];

/// Options for concatenating TIFF stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConcatOptions {
    /// Axis of the `(t, y, x)` block to concatenate along.
    pub axis: usize,
    /// Channel kept from every file.
    pub channel: usize,
    /// Z-slice kept from every file.
    pub z_index: usize,
    /// Consecutive pages folded into channels.
    pub pages_to_channel: usize,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            axis: 0,
            channel: 0,
            z_index: 0,
            pages_to_channel: 1,
        }
    }
}

/// A dataset inside an HDF5 file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hdf5Location {
    /// External path of the HDF5 file.
    pub file: PathBuf,
    /// Internal group path, `/` for the root group.
    pub group: String,
    /// Dataset name inside `group`.
    pub dataset: String,
}

impl Hdf5Location {
    pub fn new(
        file: impl Into<PathBuf>,
        group: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            group: group.into(),
            dataset: dataset.into(),
        }
    }

    /// Non-empty group names from the root down.
    pub fn group_components(&self) -> impl Iterator<Item = &str> {
        self.group.split('/').filter(|name| !name.is_empty())
    }

    /// Internal path of the dataset, e.g. `/images/stack`.
    #[must_use]
    pub fn internal_path(&self) -> String {
        let mut path = String::new();
        for name in self.group_components() {
            path.push('/');
            path.push_str(name);
        }
        path.push('/');
        path.push_str(&self.dataset);
        path
    }
}

fn is_hdf5_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            HDF5_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

impl FromStr for Hdf5Location {
    type Err = Error;

    /// Parses `path/to/file.h5/internal/group/dataset`.
    fn from_str(s: &str) -> Result<Self> {
        let components: Vec<&str> = s.split('/').collect();
        let split = components
            .iter()
            .position(|name| is_hdf5_file_name(name))
            .ok_or_else(|| {
                Error::InvalidLocation(format!("{s}: no .h5, .hdf5 or .he5 file component"))
            })?;

        let file = components[..=split].join("/");
        let internal: Vec<&str> = components[split + 1..]
            .iter()
            .copied()
            .filter(|name| !name.is_empty())
            .collect();
        let (dataset, groups) = internal
            .split_last()
            .ok_or_else(|| Error::InvalidLocation(format!("{s}: missing dataset name")))?;

        Ok(Self::new(file, format!("/{}", groups.join("/")), *dataset))
    }
}

impl fmt::Display for Hdf5Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.display(), self.internal_path())
    }
}

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expands glob patterns into a flat list of files.
///
/// Plain paths pass through untouched; patterns expand in sorted order. A
/// pattern that matches nothing is logged and skipped.
///
/// # Errors
/// Returns [`Error::Pattern`] or [`Error::Glob`] for malformed patterns or
/// unreadable directories, and [`Error::NoInputFiles`] if nothing is left.
pub fn expand_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !is_glob_pattern(pattern) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let mut matched = glob::glob(pattern)?.collect::<std::result::Result<Vec<_>, _>>()?;
        if matched.is_empty() {
            warn!("pattern {pattern:?} matched no files");
        }
        matched.sort();
        paths.extend(matched);
    }

    if paths.is_empty() {
        return Err(Error::NoInputFiles(
            patterns.iter().map(|p| p.as_ref().to_owned()).collect(),
        ));
    }
    Ok(paths)
}

/// Splits a `cztyx` shape into its selected block `(t, y, x)` after
/// validating the channel and z selection.
fn selected_block(info: &ShapeDtype, options: &ConcatOptions) -> Result<[usize; 3]> {
    let [channels, depth, t, y, x] = <[usize; 5]>::try_from(info.shape.as_slice())
        .map_err(|_| stackpix_core::Error::Dimensionality(info.shape.clone()))?;
    check_selection('c', options.channel, channels)?;
    check_selection('z', options.z_index, depth)?;
    Ok([t, y, x])
}

/// Sizes the dataset that concatenating `files` would produce.
///
/// Every file is inspected but none is decoded. Fails before anything is
/// written if a file is unreadable, a selection is out of range, or the
/// dtypes have no lossless common type.
///
/// # Errors
/// Returns the first inspection, selection or dtype error encountered.
pub fn plan_concatenation<P: AsRef<Path>>(
    files: &[P],
    options: &ConcatOptions,
) -> Result<DatasetPlan> {
    let mut plan = DatasetPlan::new(options.axis)?;
    let order = AxisOrder::CHANNEL_FIRST;

    for path in files {
        let path = path.as_ref();
        let info = inspect_tiff_transformed(path, &order, options.pages_to_channel)?;
        ReadPrecision::try_from(info.dtype)?;
        let block = selected_block(&info, options)?;
        plan.push(block, info.dtype)?;
    }

    info!(
        "planned {:?} {} dataset from {} files along axis {}",
        plan.shape, plan.dtype, plan.blocks, plan.axis
    );
    Ok(plan)
}
