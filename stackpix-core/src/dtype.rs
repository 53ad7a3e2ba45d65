//! Element types and the lossless-cast lattice used to unify them.

use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive element type of an image or dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dtype {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Dtype {
    /// Every supported dtype, narrowest first.
    pub const ALL: [Dtype; 11] = [
        Dtype::Bool,
        Dtype::U8,
        Dtype::U16,
        Dtype::U32,
        Dtype::U64,
        Dtype::I8,
        Dtype::I16,
        Dtype::I32,
        Dtype::I64,
        Dtype::F32,
        Dtype::F64,
    ];

    /// Types this one converts into without losing information, itself included.
    ///
    /// Edges of the safe-cast graph; mirrors numpy's `"safe"` casting rule over
    /// the supported types.
    #[must_use]
    pub fn safe_targets(self) -> &'static [Dtype] {
        use Dtype::{Bool, F32, F64, I16, I32, I64, I8, U16, U32, U64, U8};
        match self {
            Bool => &Self::ALL,
            U8 => &[U8, U16, U32, U64, I16, I32, I64, F32, F64],
            U16 => &[U16, U32, U64, I32, I64, F32, F64],
            U32 => &[U32, U64, I64, F64],
            U64 => &[U64, F64],
            I8 => &[I8, I16, I32, I64, F32, F64],
            I16 => &[I16, I32, I64, F32, F64],
            I32 => &[I32, I64, F64],
            I64 => &[I64, F64],
            F32 => &[F32, F64],
            F64 => &[F64],
        }
    }

    /// Whether every value of `self` is representable in `to`.
    #[must_use]
    pub fn can_cast(self, to: Dtype) -> bool {
        self.safe_targets().contains(&to)
    }

    /// Tightest of the two types that the other casts into safely.
    ///
    /// Keeps `self` when `other` fits into it, otherwise widens to `other`.
    /// Returns `None` when neither direction is lossless.
    #[must_use]
    pub fn join(self, other: Dtype) -> Option<Dtype> {
        if other.can_cast(self) {
            Some(self)
        } else if self.can_cast(other) {
            Some(other)
        } else {
            None
        }
    }

    /// Folds [`Dtype::join`] over `dtypes`, starting from `bool`.
    ///
    /// # Errors
    /// Returns [`Error::IncompatibleDtypes`] at the first type that cannot be
    /// joined with the running result.
    pub fn unify<I>(dtypes: I) -> Result<Dtype>
    where
        I: IntoIterator<Item = Dtype>,
    {
        dtypes
            .into_iter()
            .try_fold(Dtype::Bool, |current, incoming| {
                current
                    .join(incoming)
                    .ok_or(Error::IncompatibleDtypes { current, incoming })
            })
    }

    /// Size of one element in bytes.
    #[must_use]
    pub fn size_of(self) -> usize {
        match self {
            Dtype::Bool | Dtype::U8 | Dtype::I8 => 1,
            Dtype::U16 | Dtype::I16 => 2,
            Dtype::U32 | Dtype::I32 | Dtype::F32 => 4,
            Dtype::U64 | Dtype::I64 | Dtype::F64 => 8,
        }
    }

    /// Lower-case numpy style name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::U8 => "uint8",
            Dtype::U16 => "uint16",
            Dtype::U32 => "uint32",
            Dtype::U64 => "uint64",
            Dtype::I8 => "int8",
            Dtype::I16 => "int16",
            Dtype::I32 => "int32",
            Dtype::I64 => "int64",
            Dtype::F32 => "float32",
            Dtype::F64 => "float64",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Dtype::ALL
            .into_iter()
            .find(|dtype| dtype.name() == lowered)
            .ok_or_else(|| format!("unknown dtype: {s}"))
    }
}

/// Precision tag a reader decodes pixel data into.
///
/// Only these element types can be read back as arrays; the rest of
/// [`Dtype`] can be inspected but not loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPrecision {
    Double,
    Float,
    Uint32,
    Int32,
    Uint16,
    Int16,
    Uint8,
}

impl ReadPrecision {
    /// Element type decoded for this precision.
    #[must_use]
    pub fn dtype(self) -> Dtype {
        match self {
            ReadPrecision::Double => Dtype::F64,
            ReadPrecision::Float => Dtype::F32,
            ReadPrecision::Uint32 => Dtype::U32,
            ReadPrecision::Int32 => Dtype::I32,
            ReadPrecision::Uint16 => Dtype::U16,
            ReadPrecision::Int16 => Dtype::I16,
            ReadPrecision::Uint8 => Dtype::U8,
        }
    }
}

impl TryFrom<Dtype> for ReadPrecision {
    type Error = Error;

    fn try_from(dtype: Dtype) -> Result<Self> {
        match dtype {
            Dtype::F64 => Ok(ReadPrecision::Double),
            Dtype::F32 => Ok(ReadPrecision::Float),
            Dtype::U32 => Ok(ReadPrecision::Uint32),
            Dtype::I32 => Ok(ReadPrecision::Int32),
            Dtype::U16 => Ok(ReadPrecision::Uint16),
            Dtype::I16 => Ok(ReadPrecision::Int16),
            Dtype::U8 => Ok(ReadPrecision::Uint8),
            other => Err(Error::UnsupportedDtype(other)),
        }
    }
}
