//! Tile transfer layer.
//!
//! This module moves pixels between [`VariantPixelBuffer`]s and the tiles of
//! a plane:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Decoder / Encoder / Caller       │
//! └───────────┬─────────────────┬───────────┘
//!             │ read_region     │ write_region
//!             ▼                 ▼
//! ┌──────────────────┐  ┌──────────────────┐
//! │   PlaneReader    │  │   PlaneWriter    │
//! │  ┌────────────┐  │  │  ┌────────────┐  │
//! │  │ TileCache  │  │  │  │TileCoverage│  │
//! │  └────────────┘  │  │  └────────────┘  │
//! └────────┬─────────┘  └────────┬─────────┘
//!          │ read_tile           │ write_tile
//!          ▼                     ▼
//! ┌─────────────────────────────────────────┐
//! │      DirectoryRegistry / Directory      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`PlaneReader`]: assembles regions from cached tiles
//! - [`PlaneWriter`]: scatters regions into tiles and writes complete ones
//! - [`TileCache`]: LRU cache of decoded tiles with size-based eviction
//! - [`TileCacheKey`]: directory handle plus tile index
//!
//! [`VariantPixelBuffer`]: crate::pixel::VariantPixelBuffer

mod cache;
mod reader;
mod writer;

pub use cache::{TileCache, TileCacheKey};
pub use reader::{region_shape, PlaneReader};
pub use writer::PlaneWriter;
