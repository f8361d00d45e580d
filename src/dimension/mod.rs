//! Axes and coordinate spaces.
//!
//! This module provides the stride algebra shared by pixel buffers and tile
//! geometry:
//!
//! - [`Dimension`]: one named axis with an extent and an active range
//! - [`DimensionSpace`]: an ordered set of axes with independent logical and
//!   storage orders, supporting reordering, reversed axes and nested crops

mod axis;
mod space;

pub use axis::{Dimension, Direction};
pub use space::{
    DimensionSpace, IndexedDimensionStorage, IndexedDimensionSubrange, NamedDimensionStorage,
    NamedDimensionSubrange,
};
