//! Element types and runtime shape descriptors.
//!
//! The engine reports what a named quantity is made of at query time; the
//! typed accessors compare that report against the caller's expectation
//! before any memory is reinterpreted.

use std::fmt;

use lammkit_sys::codes::dtype;

/// Element type of an engine quantity, as reported across the ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit float.
    Float64,
    /// NUL-terminated string.
    String,
}

impl DataType {
    /// Decode an ABI data-type code, collapsing 1-D and 2-D variants to
    /// their element type. Returns `None` for unknown-name codes.
    pub(crate) fn from_code(code: i32) -> Option<(Self, Rank)> {
        match code {
            dtype::INT => Some((Self::Int32, Rank::OneDim)),
            dtype::INT_2D => Some((Self::Int32, Rank::TwoDim)),
            dtype::DOUBLE => Some((Self::Float64, Rank::OneDim)),
            dtype::DOUBLE_2D => Some((Self::Float64, Rank::TwoDim)),
            dtype::INT64 => Some((Self::Int64, Rank::OneDim)),
            dtype::INT64_2D => Some((Self::Int64, Rank::TwoDim)),
            dtype::STRING => Some((Self::String, Rank::OneDim)),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "32-bit integer"),
            Self::Int64 => write!(f, "64-bit integer"),
            Self::Float64 => write!(f, "64-bit float"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Whether a quantity is laid out as one value per row or a fixed-width row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rank {
    /// Scalar or 1-D array.
    OneDim,
    /// 2-D array with a fixed column count.
    TwoDim,
}

/// Tagged descriptor of a resolved per-atom quantity: element type and row
/// width. Built fresh on every lookup; never cached across calls that could
/// invalidate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct QuantityDesc {
    pub dtype: DataType,
    /// Values per row: 1 for 1-D quantities, the column count for 2-D.
    pub width: usize,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// Rust scalar types that can cross the ABI as array elements.
///
/// Sealed: the set is fixed by the engine's type system, not extensible by
/// callers.
pub trait Element: sealed::Sealed + Copy + Default + PartialEq + fmt::Debug + 'static {
    /// The [`DataType`] this Rust type corresponds to.
    const DATA_TYPE: DataType;
}

impl Element for i32 {
    const DATA_TYPE: DataType = DataType::Int32;
}

impl Element for i64 {
    const DATA_TYPE: DataType = DataType::Int64;
}

impl Element for f64 {
    const DATA_TYPE: DataType = DataType::Float64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_element_types() {
        assert_eq!(
            DataType::from_code(dtype::INT),
            Some((DataType::Int32, Rank::OneDim))
        );
        assert_eq!(
            DataType::from_code(dtype::DOUBLE_2D),
            Some((DataType::Float64, Rank::TwoDim))
        );
        assert_eq!(
            DataType::from_code(dtype::INT64_2D),
            Some((DataType::Int64, Rank::TwoDim))
        );
        assert_eq!(DataType::from_code(dtype::NONE), None);
    }

    #[test]
    fn element_constants_agree() {
        assert_eq!(<i32 as Element>::DATA_TYPE, DataType::Int32);
        assert_eq!(<i64 as Element>::DATA_TYPE, DataType::Int64);
        assert_eq!(<f64 as Element>::DATA_TYPE, DataType::Float64);
    }
}
