//! Element datatypes — the tags template types are keyed by.
//!
//! A `DType` names a scalar element type. Tags arrive from callers in many
//! spellings (`"int32"`, `"i4"`, `"<i4"`, `"i"`), so every lookup first
//! normalizes through [`DTypeTag`] to the canonical enum value.
//!
//! Short codes follow numpy's meaning: `"i8"` is an 8-*byte* integer
//! (`Int64`), not Rust's `i8`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Canonical element datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl DType {
    pub const ALL: [DType; 11] = [
        DType::Bool,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::UInt8,
        DType::UInt16,
        DType::UInt32,
        DType::UInt64,
        DType::Float32,
        DType::Float64,
    ];

    /// Canonical lowercase name, e.g. `"int32"`.
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Size of one element in bytes.
    pub fn itemsize(self) -> usize {
        match self {
            DType::Bool | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 => 8,
        }
    }

    /// numpy kind character: `b` bool, `i` signed, `u` unsigned, `f` float.
    pub fn kind(self) -> char {
        match self {
            DType::Bool => 'b',
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 => 'i',
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64 => 'u',
            DType::Float32 | DType::Float64 => 'f',
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self.kind(), 'i' | 'u')
    }

    pub fn is_float(self) -> bool {
        self.kind() == 'f'
    }

    /// The dtype of a Rust element type.
    pub fn of<T: Element>() -> DType {
        T::DTYPE
    }

    /// Normalize a dtype-like string. Returns `None` for unrecognized input.
    pub fn parse(s: &str) -> Option<DType> {
        let s = s.trim();
        let s = s.strip_prefix(['<', '>', '=', '|']).unwrap_or(s);
        let dtype = match s {
            "bool" | "bool_" | "?" | "b1" => DType::Bool,
            "int8" | "i1" | "b" | "byte" => DType::Int8,
            "int16" | "i2" | "h" | "short" => DType::Int16,
            "int32" | "i4" | "i" | "intc" => DType::Int32,
            "int64" | "i8" | "l" | "q" | "int" | "long" | "longlong" => DType::Int64,
            "uint8" | "u1" | "B" | "ubyte" => DType::UInt8,
            "uint16" | "u2" | "H" | "ushort" => DType::UInt16,
            "uint32" | "u4" | "I" | "uintc" => DType::UInt32,
            "uint64" | "u8" | "L" | "Q" | "uint" | "ulonglong" => DType::UInt64,
            "float32" | "f4" | "f" | "single" => DType::Float32,
            "float64" | "f8" | "d" | "float" | "double" => DType::Float64,
            _ => return None,
        };
        Some(dtype)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DType::parse(s).ok_or_else(|| Error::InvalidArgument(format!("unrecognized dtype '{s}'")))
    }
}

// ============================================================================
// Element: Rust scalar → DType
// ============================================================================

/// A Rust scalar type usable as the element type of a specialized variant.
pub trait Element: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const DTYPE: DType;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_element! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

// ============================================================================
// DTypeTag: anything a caller may pass as a lookup key
// ============================================================================

/// A value that can be normalized to a canonical [`DType`].
///
/// Implemented for `DType` itself and for dtype-like strings. `describe` is
/// what error messages show when normalization or lookup fails.
pub trait DTypeTag {
    fn to_dtype(&self) -> Option<DType>;
    fn describe(&self) -> String;
}

impl DTypeTag for DType {
    fn to_dtype(&self) -> Option<DType> {
        Some(*self)
    }

    fn describe(&self) -> String {
        self.name().to_string()
    }
}

impl DTypeTag for &str {
    fn to_dtype(&self) -> Option<DType> {
        DType::parse(self)
    }

    fn describe(&self) -> String {
        (*self).to_string()
    }
}

impl DTypeTag for String {
    fn to_dtype(&self) -> Option<DType> {
        DType::parse(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl DTypeTag for &String {
    fn to_dtype(&self) -> Option<DType> {
        DType::parse(self)
    }

    fn describe(&self) -> String {
        (*self).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_roundtrip() {
        for dtype in DType::ALL {
            assert_eq!(DType::parse(dtype.name()), Some(dtype));
            assert_eq!(dtype.to_string(), dtype.name());
        }
    }

    #[test]
    fn test_short_codes_follow_numpy() {
        assert_eq!(DType::parse("i4"), Some(DType::Int32));
        assert_eq!(DType::parse("<i4"), Some(DType::Int32));
        assert_eq!(DType::parse("i8"), Some(DType::Int64));
        assert_eq!(DType::parse("u1"), Some(DType::UInt8));
        assert_eq!(DType::parse(">f8"), Some(DType::Float64));
        assert_eq!(DType::parse("?"), Some(DType::Bool));
        assert_eq!(DType::parse("b"), Some(DType::Int8));
        assert_eq!(DType::parse("B"), Some(DType::UInt8));
    }

    #[test]
    fn test_generic_aliases_are_64_bit() {
        assert_eq!(DType::parse("int"), Some(DType::Int64));
        assert_eq!(DType::parse("uint"), Some(DType::UInt64));
        assert_eq!(DType::parse("float"), Some(DType::Float64));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(DType::parse("complex128"), None);
        assert_eq!(DType::parse(""), None);
        assert!("float16".parse::<DType>().is_err());
    }

    #[test]
    fn test_element_mapping() {
        assert_eq!(DType::of::<i32>(), DType::Int32);
        assert_eq!(DType::of::<f64>(), DType::Float64);
        assert_eq!(DType::of::<bool>(), DType::Bool);
        for dtype in DType::ALL {
            assert!(dtype.itemsize() >= 1);
        }
        assert_eq!(DType::of::<u16>().itemsize(), std::mem::size_of::<u16>());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&DType::UInt32).unwrap();
        assert_eq!(json, "\"uint32\"");
        let back: DType = serde_json::from_str("\"float32\"").unwrap();
        assert_eq!(back, DType::Float32);
    }
}
