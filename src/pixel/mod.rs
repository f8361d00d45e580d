//! Pixel types and buffers.
//!
//! # Components
//!
//! - [`PixelType`]: runtime tag for the 11 supported representations
//! - [`Pixel`]: compile-time binding of a tag to its element type
//! - [`PixelBuffer`]: typed nine-dimensional strided array, owned or borrowed
//! - [`VariantPixelBuffer`]: a buffer of any representation chosen at runtime
//! - [`PixelBufferVisitor`]: generic operations instantiated per representation

mod buffer;
mod types;
mod variant;
mod visitors;

pub use buffer::{
    default_storage_order, make_storage_order, DimensionOrder, LogicalIndices, PixelBuffer,
    PixelDimension, PixelIndices, PixelShape, PIXEL_DIMENSIONS,
};
pub use types::{EndianType, Pixel, PixelType, SampleAddress};
pub use variant::{PixelBufferVisitor, PixelBufferVisitorMut, VariantPixelBuffer};
pub use visitors::{MinMaxVisitor, ToBytesVisitor, ValueRange};
