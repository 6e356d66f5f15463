//! Numeric element types for encoded arrays.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Error, Result};

/// Element type (numeric width) of an encoded array.
///
/// The discriminant is the tag stored in the payload header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum Dtype {
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 8-bit integer
    Uint8 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 16-bit integer
    Uint16 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// Unsigned 32-bit integer
    Uint32 = 6,
    /// Signed 64-bit integer
    Int64 = 7,
    /// Unsigned 64-bit integer
    Uint64 = 8,
    /// 16-bit floating point (IEEE 754 half precision)
    #[default]
    Float16 = 9,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 10,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 11,
}

impl Dtype {
    /// All supported dtypes, narrowest integers first.
    pub const ALL: [Dtype; 11] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Int64,
        Self::Uint64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    /// Floating point dtypes, narrowest first.
    pub const FLOATS: [Dtype; 3] = [Self::Float16, Self::Float32, Self::Float64];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 | Self::Float16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Returns the canonical name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse a dtype from its name. Accepts the canonical names plus the
    /// short forms `f16`/`f32`/`f64`, `i8`..`i64`, `u8`..`u64` and `half`,
    /// `single`, `double`.
    pub fn from_name(name: &str) -> Option<Self> {
        let dtype = match name.trim().to_ascii_lowercase().as_str() {
            "int8" | "i8" => Self::Int8,
            "uint8" | "u8" => Self::Uint8,
            "int16" | "i16" => Self::Int16,
            "uint16" | "u16" => Self::Uint16,
            "int32" | "i32" => Self::Int32,
            "uint32" | "u32" => Self::Uint32,
            "int64" | "i64" => Self::Int64,
            "uint64" | "u64" => Self::Uint64,
            "float16" | "f16" | "half" => Self::Float16,
            "float32" | "f32" | "single" => Self::Float32,
            "float64" | "f64" | "double" => Self::Float64,
            _ => return None,
        };
        Some(dtype)
    }

    /// Convert from the header tag.
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Int8),
            2 => Some(Self::Uint8),
            3 => Some(Self::Int16),
            4 => Some(Self::Uint16),
            5 => Some(Self::Int32),
            6 => Some(Self::Uint32),
            7 => Some(Self::Int64),
            8 => Some(Self::Uint64),
            9 => Some(Self::Float16),
            10 => Some(Self::Float32),
            11 => Some(Self::Float64),
            _ => None,
        }
    }

    /// Header tag of this type.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Inclusive value range of an integer type, `None` for floats.
    pub const fn int_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Uint8 => Some((0, u8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Uint16 => Some((0, u16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Uint32 => Some((0, u32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::Uint64 => Some((0, u64::MAX as i128)),
            Self::Float16 | Self::Float32 | Self::Float64 => None,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::setting("dtype", format!("unknown dtype '{}'", s)))
    }
}

impl TryFrom<String> for Dtype {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Dtype> for String {
    fn from(d: Dtype) -> Self {
        d.name().to_string()
    }
}
