//! Semantic axis labels and validated axis orders.

use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of semantic axes in a standard image stack.
pub const NDIM: usize = 5;

/// One semantic axis of an image stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Z,
    Y,
    X,
    T,
    C,
}

impl Axis {
    /// Single-letter label.
    #[must_use]
    pub fn label(self) -> char {
        match self {
            Axis::Z => 'z',
            Axis::Y => 'y',
            Axis::X => 'x',
            Axis::T => 't',
            Axis::C => 'c',
        }
    }

    /// Parses a single-letter label (case-insensitive).
    #[must_use]
    pub fn from_label(label: char) -> Option<Axis> {
        match label.to_ascii_lowercase() {
            'z' => Some(Axis::Z),
            'y' => Some(Axis::Y),
            'x' => Some(Axis::X),
            't' => Some(Axis::T),
            'c' => Some(Axis::C),
            _ => None,
        }
    }

    /// Position of this axis in the canonical `zyxtc` layout.
    #[must_use]
    pub fn canonical_position(self) -> usize {
        match self {
            Axis::Z => 0,
            Axis::Y => 1,
            Axis::X => 2,
            Axis::T => 3,
            Axis::C => 4,
        }
    }
}

/// A permutation of the five semantic axes.
///
/// Position `i` of the order names the semantic axis stored as dimension `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct AxisOrder([Axis; NDIM]);

impl AxisOrder {
    /// The layout images are normalized to before reordering.
    pub const CANONICAL: AxisOrder = AxisOrder([Axis::Z, Axis::Y, Axis::X, Axis::T, Axis::C]);

    /// `cztyx`: channel and depth lead so a `(t, y, x)` block can be selected
    /// by fixing the first two indices.
    pub const CHANNEL_FIRST: AxisOrder = AxisOrder([Axis::C, Axis::Z, Axis::T, Axis::Y, Axis::X]);

    /// Builds an order from explicit axes.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAxisOrder`] if an axis repeats.
    pub fn new(axes: [Axis; NDIM]) -> Result<Self> {
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].contains(axis) {
                let label: String = axes.iter().map(|a| a.label()).collect();
                return Err(Error::InvalidAxisOrder(label));
            }
        }
        Ok(Self(axes))
    }

    /// The axes in storage order.
    #[must_use]
    pub fn axes(&self) -> &[Axis; NDIM] {
        &self.0
    }

    /// Whether this order equals the canonical `zyxtc`.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        *self == Self::CANONICAL
    }

    /// Storage position of `axis` in this order.
    #[must_use]
    pub fn position(&self, axis: Axis) -> usize {
        self.0
            .iter()
            .position(|a| *a == axis)
            .unwrap_or_else(|| unreachable!("axis order is a permutation"))
    }

    /// Canonical positions to read from, one per output dimension.
    ///
    /// Suitable for [`ndarray::ArrayBase::permuted_axes`] on a canonical array.
    #[must_use]
    pub fn permutation_from_canonical(&self) -> [usize; NDIM] {
        self.0.map(Axis::canonical_position)
    }

    /// Reorders a canonical `zyxtc` shape into this order.
    #[must_use]
    pub fn permute_shape(&self, canonical: [usize; NDIM]) -> [usize; NDIM] {
        self.permutation_from_canonical().map(|i| canonical[i])
    }
}

impl Default for AxisOrder {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl FromStr for AxisOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidAxisOrder(s.to_string());

        let labels: Vec<char> = s.chars().collect();
        if labels.len() != NDIM {
            return Err(invalid());
        }

        let mut axes = [Axis::Z; NDIM];
        for (slot, label) in axes.iter_mut().zip(labels) {
            *slot = Axis::from_label(label).ok_or_else(invalid)?;
        }

        Self::new(axes).map_err(|_| invalid())
    }
}

impl TryFrom<String> for AxisOrder {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AxisOrder> for String {
    fn from(order: AxisOrder) -> Self {
        order.to_string()
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in &self.0 {
            write!(f, "{}", axis.label())?;
        }
        Ok(())
    }
}
