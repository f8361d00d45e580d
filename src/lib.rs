//! # OME Tiling
//!
//! Pixel storage and TIFF tile geometry for multi-dimensional microscopy
//! images.
//!
//! This library provides the layer between an image codec and the code that
//! consumes pixel data: strongly typed pixel buffers over the 11 OME pixel
//! types, the coordinate algebra behind their storage orders, and the
//! bookkeeping needed to read and write planes one tile or strip at a time.
//!
//! ## Features
//!
//! - **Coordinate spaces**: named axes with sub-ranges, arbitrary storage
//!   orders and descending axes
//! - **Pixel buffers**: nine-dimensional typed buffers, owned or borrowed,
//!   behind a type-erased enum with per-type visitor dispatch
//! - **Tile geometry**: libtiff-compatible tile and strip addressing for
//!   chunky and planar planes
//! - **Coverage tracking**: grid-indexed or linear region sets that coalesce
//!   adjacent writes
//! - **Region I/O**: cached region reads and coverage-driven tile writes
//!
//! ## Architecture
//!
//! - [`dimension`] - Axes and coordinate spaces
//! - [`pixel`] - Pixel types, typed and type-erased buffers, visitors
//! - [`tiff`] - Tags, regions, directories, tile geometry and coverage
//! - [`tile`] - Tile cache, plane reader and plane writer
//! - [`config`] - Engine tunables (clap, environment, serde)
//!
//! ## Example
//!
//! ```rust
//! use ome_tiling::{
//!     DirectoryRegistry, MemoryDirectory, PixelType, PlaneProperties, PlaneReader,
//!     PlaneRegion, PlaneWriter, TilingConfig, VariantPixelBuffer, region_shape,
//! };
//!
//! let mut registry = DirectoryRegistry::new();
//! let handle = registry.insert(MemoryDirectory::new(PlaneProperties::tiled(64, 64, 32, 32)));
//!
//! let region = PlaneRegion::new(0, 0, 64, 64);
//! let mut pixels =
//!     VariantPixelBuffer::with_default_order(region_shape(&region, 1), PixelType::Uint8).unwrap();
//! pixels.assign((0..64 * 64).map(|i| (i % 251) as u8)).unwrap();
//!
//! let mut writer = PlaneWriter::new(&registry, handle, &TilingConfig::default()).unwrap();
//! writer.write_region(&mut registry, &region, &pixels).unwrap();
//! assert!(writer.is_complete());
//!
//! let mut copy =
//!     VariantPixelBuffer::with_default_order(region_shape(&region, 1), PixelType::Uint8).unwrap();
//! PlaneReader::default().read_region(&registry, handle, &region, &mut copy).unwrap();
//! assert_eq!(copy, pixels);
//! ```

pub mod config;
pub mod dimension;
pub mod error;
pub mod pixel;
pub mod tiff;
pub mod tile;

// Re-export commonly used types
pub use config::{CoverageBackend, TilingConfig};
pub use dimension::{
    Dimension, DimensionSpace, Direction, IndexedDimensionStorage, IndexedDimensionSubrange,
    NamedDimensionStorage, NamedDimensionSubrange,
};
pub use error::{ConfigError, DimensionError, IoError, PixelError, TileError};
pub use pixel::{
    default_storage_order, make_storage_order, DimensionOrder, EndianType, MinMaxVisitor, Pixel,
    PixelBuffer, PixelBufferVisitor, PixelBufferVisitorMut, PixelDimension, PixelIndices,
    PixelShape, PixelType, ToBytesVisitor, ValueRange, VariantPixelBuffer, PIXEL_DIMENSIONS,
};
pub use tiff::{
    CoverageIndex, Directory, DirectoryHandle, DirectoryRegistry, GridIndex, LinearIndex,
    MemoryDirectory, PlanarConfiguration, PlaneProperties, PlaneRegion, SampleFormat, TileCoverage,
    TileInfo, TileType,
};
pub use tile::{region_shape, PlaneReader, PlaneWriter, TileCache, TileCacheKey};
