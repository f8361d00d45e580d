//! TIFF plane geometry.
//!
//! This module maps pixel regions of a TIFF plane onto its tiles or strips
//! and tracks which regions have been transferred.
//!
//! # Components
//!
//! - [`PlaneRegion`]: rectangle algebra (intersection, exact union)
//! - [`Directory`]: storage collaborator for one plane, with the in-memory
//!   [`MemoryDirectory`]
//! - [`DirectoryRegistry`]: arena of directories behind generation-checked
//!   [`DirectoryHandle`]s
//! - [`TileInfo`]: tile counts and index/region conversions
//! - [`TileCoverage`]: covered-region tracker over a [`CoverageIndex`]

mod coverage;
mod directory;
mod region;
mod tags;
mod tile_info;

pub use coverage::{CoverageIndex, GridIndex, LinearIndex, TileCoverage};
pub use directory::{
    Directory, DirectoryHandle, DirectoryRegistry, MemoryDirectory, PlaneProperties,
};
pub use region::PlaneRegion;
pub use tags::{
    pixel_type_for, sample_format_for, PlanarConfiguration, SampleFormat, TiffTag, TileType,
};
pub use tile_info::TileInfo;
