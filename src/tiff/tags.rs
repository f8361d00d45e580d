//! TIFF tag vocabulary for plane geometry.
//!
//! This module defines the tag ids and enumerated tag values that describe
//! how a plane is cut into tiles or strips and how its samples are encoded:
//! - Tag ids for image size, tile/strip layout and sample encoding
//! - Planar configuration (chunky vs planar samples)
//! - Sample format, which combined with bits-per-sample selects a
//!   [`PixelType`]

use crate::pixel::PixelType;

// =============================================================================
// TIFF Tags
// =============================================================================

/// TIFF tag IDs consumed when building plane properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    // -------------------------------------------------------------------------
    // Basic Image Structure
    // -------------------------------------------------------------------------
    /// Image width in pixels
    ImageWidth = 256,

    /// Image height (length) in pixels
    ImageLength = 257,

    /// Bits per sample
    BitsPerSample = 258,

    /// Number of samples per pixel (e.g., 3 for RGB)
    SamplesPerPixel = 277,

    /// How samples are organized (chunky vs planar)
    PlanarConfiguration = 284,

    /// Interpretation of each sample (unsigned, signed, float, complex)
    SampleFormat = 339,

    // -------------------------------------------------------------------------
    // Strip Organization
    // -------------------------------------------------------------------------
    /// Row count per strip
    RowsPerStrip = 278,

    // -------------------------------------------------------------------------
    // Tile Organization
    // -------------------------------------------------------------------------
    /// Width of each tile in pixels
    TileWidth = 322,

    /// Height (length) of each tile in pixels
    TileLength = 323,
}

impl TiffTag {
    /// Get the numeric tag ID.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

// =============================================================================
// Planar Configuration
// =============================================================================

/// How the samples of a pixel are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum PlanarConfiguration {
    /// Samples of a pixel are adjacent ("chunky")
    #[default]
    Contig = 1,

    /// Each sample is stored in its own plane
    Separate = 2,
}

impl PlanarConfiguration {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(PlanarConfiguration::Contig),
            2 => Some(PlanarConfiguration::Separate),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    #[inline]
    pub const fn is_planar(self) -> bool {
        matches!(self, PlanarConfiguration::Separate)
    }
}

// =============================================================================
// Sample Format
// =============================================================================

/// TIFF SampleFormat values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum SampleFormat {
    #[default]
    Uint = 1,
    Int = 2,
    Float = 3,
    Void = 4,
    ComplexInt = 5,
    ComplexFloat = 6,
}

impl SampleFormat {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(SampleFormat::Uint),
            2 => Some(SampleFormat::Int),
            3 => Some(SampleFormat::Float),
            4 => Some(SampleFormat::Void),
            5 => Some(SampleFormat::ComplexInt),
            6 => Some(SampleFormat::ComplexFloat),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Get a human-readable name for the sample format.
    pub const fn name(self) -> &'static str {
        match self {
            SampleFormat::Uint => "unsigned integer",
            SampleFormat::Int => "signed integer",
            SampleFormat::Float => "IEEE floating point",
            SampleFormat::Void => "undefined",
            SampleFormat::ComplexInt => "complex integer",
            SampleFormat::ComplexFloat => "complex floating point",
        }
    }
}

/// Select the pixel type for a sample format and bit depth.
///
/// Returns `None` for combinations with no pixel representation (e.g. 12-bit
/// samples or complex integers).
pub fn pixel_type_for(format: SampleFormat, bits_per_sample: u16) -> Option<PixelType> {
    match (format, bits_per_sample) {
        (SampleFormat::Uint, 1) => Some(PixelType::Bit),
        (SampleFormat::Uint, 8) => Some(PixelType::Uint8),
        (SampleFormat::Uint, 16) => Some(PixelType::Uint16),
        (SampleFormat::Uint, 32) => Some(PixelType::Uint32),
        (SampleFormat::Int, 8) => Some(PixelType::Int8),
        (SampleFormat::Int, 16) => Some(PixelType::Int16),
        (SampleFormat::Int, 32) => Some(PixelType::Int32),
        (SampleFormat::Float, 32) => Some(PixelType::Float),
        (SampleFormat::Float, 64) => Some(PixelType::Double),
        (SampleFormat::ComplexFloat, 64) => Some(PixelType::Complex),
        (SampleFormat::ComplexFloat, 128) => Some(PixelType::DoubleComplex),
        _ => None,
    }
}

/// Sample format and bits per sample used to store a pixel type.
pub fn sample_format_for(pixel_type: PixelType) -> (SampleFormat, u16) {
    let format = match pixel_type {
        PixelType::Uint8 | PixelType::Uint16 | PixelType::Uint32 | PixelType::Bit => {
            SampleFormat::Uint
        }
        PixelType::Int8 | PixelType::Int16 | PixelType::Int32 => SampleFormat::Int,
        PixelType::Float | PixelType::Double => SampleFormat::Float,
        PixelType::Complex | PixelType::DoubleComplex => SampleFormat::ComplexFloat,
    };
    (format, pixel_type.bits() as u16)
}

// =============================================================================
// Tile Type
// =============================================================================

/// Whether a plane is cut into tiles or full-width strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    Tile,
    Strip,
}

impl TileType {
    pub const fn name(self) -> &'static str {
        match self {
            TileType::Tile => "tile",
            TileType::Strip => "strip",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
