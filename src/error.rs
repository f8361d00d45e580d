use thiserror::Error;

use crate::pixel::{PixelShape, PixelType};
use crate::tiff::{DirectoryHandle, PlaneRegion};

/// Errors raised while building or querying axes and coordinate spaces
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    /// An axis must contain at least one element
    #[error("Dimension {name} has zero extent")]
    ZeroExtent { name: String },

    /// Active range is inverted or exceeds the axis extent
    #[error("Dimension {name}: range [{begin}, {end}) is invalid for extent {extent}")]
    InvalidRange {
        name: String,
        extent: usize,
        begin: usize,
        end: usize,
    },

    /// Active range escapes the range of the axis it was cropped from
    #[error(
        "Dimension {name}: range [{begin}, {end}) lies outside parent range [{parent_begin}, {parent_end})"
    )]
    OutsideParentRange {
        name: String,
        begin: usize,
        end: usize,
        parent_begin: usize,
        parent_end: usize,
    },

    /// Requested crop is empty, inverted or larger than the current range
    #[error("Dimension {name}: subrange [{begin}, {end}) is invalid for size {size}")]
    InvalidSubrange {
        name: String,
        begin: usize,
        end: usize,
        size: usize,
    },

    /// Two axes share a name
    #[error("Duplicate dimension name: {0}")]
    DuplicateName(String),

    /// No axis carries the requested name
    #[error("Unknown dimension name: {0}")]
    UnknownName(String),

    /// Storage order does not list every axis exactly once
    #[error("Storage order has {actual} entries, expected {expected}")]
    StorageOrderLength { expected: usize, actual: usize },

    /// Axis index beyond the number of axes
    #[error("Dimension index {index} out of range ({count} dimensions)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Axis index listed twice in one request
    #[error("Dimension index {0} is repeated")]
    DuplicateIndex(usize),

    /// Coordinate vector length differs from the number of axes
    #[error("Coordinate has {actual} components, expected {expected}")]
    CoordinateLength { expected: usize, actual: usize },

    /// Coordinate component outside the active range of its axis
    #[error("Coordinate {value} out of range for dimension {name} of size {size}")]
    CoordinateOutOfRange {
        name: String,
        value: usize,
        size: usize,
    },

    /// Linear index beyond the addressable elements
    #[error("Index {index} out of range for {count} elements")]
    ElementOutOfRange { index: usize, count: usize },
}

/// Errors raised by typed and type-erased pixel buffers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelError {
    /// Value or buffer carries a different concrete representation
    #[error("Unsupported pixel type conversion: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: PixelType,
        actual: PixelType,
    },

    /// Buffers of different shapes cannot be assigned
    #[error("Pixel buffer shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: PixelShape,
        actual: PixelShape,
    },

    /// Bulk assignment supplied the wrong number of values
    #[error("Expected {expected} pixel values, got {actual}")]
    ElementCount { expected: usize, actual: usize },

    /// Element index outside the buffer shape
    #[error("Index {index} out of bounds for dimension {dimension} of extent {extent}")]
    IndexOutOfBounds {
        dimension: &'static str,
        index: usize,
        extent: usize,
    },

    /// Raw byte buffer cannot hold the pixel data
    #[error("Byte buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Wrapped storage does not match the element count of the shape
    #[error("Storage holds {actual} elements, shape requires {expected}")]
    StorageSize { expected: usize, actual: usize },

    /// Pixel type name not recognised
    #[error("Unknown pixel type: {0}")]
    UnknownPixelType(String),

    /// Invalid layout of the underlying coordinate space
    #[error("Dimension error: {0}")]
    Dimension(#[from] DimensionError),
}

/// Errors reported by a tile-storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// Tile index beyond the tile count of the directory
    #[error("Tile {index} out of range: directory holds {count} tiles")]
    TileOutOfRange { index: u32, count: u32 },

    /// Tile has never been written
    #[error("Tile {0} has not been written")]
    TileNotWritten(u32),

    /// Tile payload has the wrong length
    #[error("Tile {index} payload is {actual} bytes, expected {expected}")]
    TileSize {
        index: u32,
        expected: usize,
        actual: usize,
    },

    /// Directory does not accept writes
    #[error("Directory is read-only")]
    ReadOnly,

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Errors raised while addressing, reading or writing plane tiles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// The directory behind a handle has been removed from its registry
    #[error("Directory {0} is no longer available")]
    DirectoryGone(DirectoryHandle),

    /// Plane properties cannot describe a tile grid
    #[error("Invalid tile geometry: {0}")]
    InvalidGeometry(String),

    /// Tile data shorter than one decoded tile
    #[error("Tile {index} truncated: need {required} bytes, got {actual}")]
    TruncatedTile {
        index: u32,
        required: usize,
        actual: usize,
    },

    /// Linear tile index beyond the tile count
    #[error("Tile index {index} out of range: plane has {count} tiles")]
    IndexOutOfRange { index: u32, count: u32 },

    /// Sample beyond the samples per pixel of the plane
    #[error("Sample {sample} out of range: plane has {samples} samples per pixel")]
    SampleOutOfRange { sample: u16, samples: u16 },

    /// Region extends past the plane
    #[error("Region {region} outside plane of {width}x{height}")]
    RegionOutOfBounds {
        region: PlaneRegion,
        width: u32,
        height: u32,
    },

    /// Buffer shape does not match the region being transferred
    #[error("Buffer shape {actual:?} does not match region, expected {expected:?}")]
    BufferShape {
        expected: PixelShape,
        actual: PixelShape,
    },

    /// Storage collaborator failure, propagated unchanged
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Pixel buffer failure
    #[error("Pixel error: {0}")]
    Pixel(#[from] PixelError),
}

/// Errors raised while loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Source could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Parsed values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
