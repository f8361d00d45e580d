//! Pixel type tags and their concrete element representations.
//!
//! Every [`PixelType`] is bound to exactly one Rust element type through the
//! [`Pixel`] trait:
//!
//! | Tag             | Element            | Bytes | Bits |
//! |-----------------|--------------------|-------|------|
//! | `int8`          | `i8`               | 1     | 8    |
//! | `int16`         | `i16`              | 2     | 16   |
//! | `int32`         | `i32`              | 4     | 32   |
//! | `uint8`         | `u8`               | 1     | 8    |
//! | `uint16`        | `u16`              | 2     | 16   |
//! | `uint32`        | `u32`              | 4     | 32   |
//! | `float`         | `f32`              | 4     | 32   |
//! | `double`        | `f64`              | 8     | 64   |
//! | `bit`           | `bool`             | 1     | 1    |
//! | `complex`       | `Complex<f32>`     | 8     | 64   |
//! | `double-complex`| `Complex<f64>`     | 16    | 128  |

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::PixelError;

use super::buffer::PixelBuffer;
use super::variant::VariantPixelBuffer;

// =============================================================================
// PixelType
// =============================================================================

/// Runtime tag selecting a pixel representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PixelType {
    Int8,
    Int16,
    Int32,
    Uint8,
    Uint16,
    Uint32,
    Float,
    Double,
    Bit,
    Complex,
    DoubleComplex,
}

impl PixelType {
    /// Every pixel type, in declaration order.
    pub const ALL: [PixelType; 11] = [
        PixelType::Int8,
        PixelType::Int16,
        PixelType::Int32,
        PixelType::Uint8,
        PixelType::Uint16,
        PixelType::Uint32,
        PixelType::Float,
        PixelType::Double,
        PixelType::Bit,
        PixelType::Complex,
        PixelType::DoubleComplex,
    ];

    /// Size of one element in memory, in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            PixelType::Int8 | PixelType::Uint8 | PixelType::Bit => 1,
            PixelType::Int16 | PixelType::Uint16 => 2,
            PixelType::Int32 | PixelType::Uint32 | PixelType::Float => 4,
            PixelType::Double | PixelType::Complex => 8,
            PixelType::DoubleComplex => 16,
        }
    }

    /// Number of significant bits per element.
    pub const fn bits(self) -> usize {
        match self {
            PixelType::Bit => 1,
            other => other.bytes() * 8,
        }
    }

    /// OME name of the pixel type.
    pub const fn name(self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::Int16 => "int16",
            PixelType::Int32 => "int32",
            PixelType::Uint8 => "uint8",
            PixelType::Uint16 => "uint16",
            PixelType::Uint32 => "uint32",
            PixelType::Float => "float",
            PixelType::Double => "double",
            PixelType::Bit => "bit",
            PixelType::Complex => "complex",
            PixelType::DoubleComplex => "double-complex",
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PixelType::Int8
                | PixelType::Int16
                | PixelType::Int32
                | PixelType::Float
                | PixelType::Double
                | PixelType::Complex
                | PixelType::DoubleComplex
        )
    }

    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, PixelType::Complex | PixelType::DoubleComplex)
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelType {
    type Err = PixelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| PixelError::UnknownPixelType(s.to_string()))
    }
}

// =============================================================================
// EndianType
// =============================================================================

/// Byte order used when pixel values cross a raw byte boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndianType {
    Big,
    Little,
    /// Byte order of the host
    #[default]
    Native,
}

impl EndianType {
    /// Resolve [`EndianType::Native`] to the concrete host byte order.
    #[inline]
    pub const fn resolve(self) -> EndianType {
        match self {
            EndianType::Native => {
                if cfg!(target_endian = "big") {
                    EndianType::Big
                } else {
                    EndianType::Little
                }
            }
            other => other,
        }
    }
}

// =============================================================================
// Pixel Trait
// =============================================================================

/// Location of one sample inside a row of raw tile bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleAddress {
    /// Byte offset of the start of the row
    pub row_start: usize,

    /// Sample position within the row
    pub column: usize,
}

/// A concrete element representation bound to one [`PixelType`].
///
/// Raw conversions operate on exactly [`Pixel::SIZE`] bytes and panic if the
/// slice is shorter; callers check bounds first.
pub trait Pixel: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Tag of this representation
    const PIXEL_TYPE: PixelType;

    /// Size of one raw element in bytes
    const SIZE: usize;

    /// Decode one value from raw bytes.
    fn from_bytes(bytes: &[u8], endian: EndianType) -> Self;

    /// Encode one value into raw bytes.
    fn to_bytes(self, out: &mut [u8], endian: EndianType);

    /// Ordering key. Complex values order by their real component.
    fn sort_key(self) -> f64;

    /// Read one sample from a row of tile bytes.
    fn read_sample(data: &[u8], address: SampleAddress, endian: EndianType) -> Self {
        let offset = address.row_start + address.column * Self::SIZE;
        Self::from_bytes(&data[offset..offset + Self::SIZE], endian)
    }

    /// Write one sample into a row of tile bytes.
    fn write_sample(self, data: &mut [u8], address: SampleAddress, endian: EndianType) {
        let offset = address.row_start + address.column * Self::SIZE;
        self.to_bytes(&mut data[offset..offset + Self::SIZE], endian);
    }

    /// Wrap a typed buffer in the matching type-erased variant.
    fn into_variant(buffer: PixelBuffer<'_, Self>) -> VariantPixelBuffer<'_>;

    /// Borrow the typed buffer if `buffer` holds this representation.
    fn from_variant<'v, 'a>(buffer: &'v VariantPixelBuffer<'a>)
        -> Option<&'v PixelBuffer<'a, Self>>;

    /// Mutably borrow the typed buffer if `buffer` holds this representation.
    fn from_variant_mut<'v, 'a>(
        buffer: &'v mut VariantPixelBuffer<'a>,
    ) -> Option<&'v mut PixelBuffer<'a, Self>>;
}

macro_rules! variant_glue {
    ($variant:ident) => {
        fn into_variant(buffer: PixelBuffer<'_, Self>) -> VariantPixelBuffer<'_> {
            VariantPixelBuffer::$variant(buffer)
        }

        fn from_variant<'v, 'a>(
            buffer: &'v VariantPixelBuffer<'a>,
        ) -> Option<&'v PixelBuffer<'a, Self>> {
            match buffer {
                VariantPixelBuffer::$variant(inner) => Some(inner),
                _ => None,
            }
        }

        fn from_variant_mut<'v, 'a>(
            buffer: &'v mut VariantPixelBuffer<'a>,
        ) -> Option<&'v mut PixelBuffer<'a, Self>> {
            match buffer {
                VariantPixelBuffer::$variant(inner) => Some(inner),
                _ => None,
            }
        }
    };
}

macro_rules! impl_numeric_pixel {
    ($ty:ty, $variant:ident) => {
        impl Pixel for $ty {
            const PIXEL_TYPE: PixelType = PixelType::$variant;
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn from_bytes(bytes: &[u8], endian: EndianType) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                match endian.resolve() {
                    EndianType::Big => <$ty>::from_be_bytes(raw),
                    _ => <$ty>::from_le_bytes(raw),
                }
            }

            fn to_bytes(self, out: &mut [u8], endian: EndianType) {
                let raw = match endian.resolve() {
                    EndianType::Big => self.to_be_bytes(),
                    _ => self.to_le_bytes(),
                };
                out[..Self::SIZE].copy_from_slice(&raw);
            }

            fn sort_key(self) -> f64 {
                self as f64
            }

            variant_glue!($variant);
        }
    };
}

macro_rules! impl_complex_pixel {
    ($component:ty, $variant:ident) => {
        impl Pixel for Complex<$component> {
            const PIXEL_TYPE: PixelType = PixelType::$variant;
            const SIZE: usize = 2 * std::mem::size_of::<$component>();

            fn from_bytes(bytes: &[u8], endian: EndianType) -> Self {
                let half = <$component as Pixel>::SIZE;
                Complex::new(
                    <$component as Pixel>::from_bytes(&bytes[..half], endian),
                    <$component as Pixel>::from_bytes(&bytes[half..Self::SIZE], endian),
                )
            }

            fn to_bytes(self, out: &mut [u8], endian: EndianType) {
                let half = <$component as Pixel>::SIZE;
                self.re.to_bytes(&mut out[..half], endian);
                self.im.to_bytes(&mut out[half..Self::SIZE], endian);
            }

            fn sort_key(self) -> f64 {
                self.re as f64
            }

            variant_glue!($variant);
        }
    };
}

impl_numeric_pixel!(i8, Int8);
impl_numeric_pixel!(i16, Int16);
impl_numeric_pixel!(i32, Int32);
impl_numeric_pixel!(u8, Uint8);
impl_numeric_pixel!(u16, Uint16);
impl_numeric_pixel!(u32, Uint32);
impl_numeric_pixel!(f32, Float);
impl_numeric_pixel!(f64, Double);
impl_complex_pixel!(f32, Complex);
impl_complex_pixel!(f64, DoubleComplex);

/// Bit pixels occupy one byte in memory and one bit in tiles, packed
/// most-significant bit first with each row padded to a whole byte.
impl Pixel for bool {
    const PIXEL_TYPE: PixelType = PixelType::Bit;
    const SIZE: usize = 1;

    fn from_bytes(bytes: &[u8], _endian: EndianType) -> Self {
        bytes[0] != 0
    }

    fn to_bytes(self, out: &mut [u8], _endian: EndianType) {
        out[0] = u8::from(self);
    }

    fn sort_key(self) -> f64 {
        f64::from(u8::from(self))
    }

    fn read_sample(data: &[u8], address: SampleAddress, _endian: EndianType) -> Self {
        let byte = data[address.row_start + address.column / 8];
        (byte >> (7 - address.column % 8)) & 1 == 1
    }

    fn write_sample(self, data: &mut [u8], address: SampleAddress, _endian: EndianType) {
        let mask = 1u8 << (7 - address.column % 8);
        let byte = &mut data[address.row_start + address.column / 8];
        if self {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    variant_glue!(Bit);
}

// =============================================================================
// Tests
// =============================================================================
