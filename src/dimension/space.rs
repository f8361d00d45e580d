//! Coordinate spaces composed of named axes.
//!
//! A [`DimensionSpace`] keeps two independent views of the same axes:
//!
//! - **Logical order**: the order in which coordinates are supplied. Logical
//!   strides only see the active size of each axis, so a cropped space is
//!   addressed densely from zero.
//! - **Storage order**: a permutation of the axes, each tagged with a
//!   [`Direction`], describing the physical layout. Storage strides always
//!   see the raw extent, so the physical address of an element never changes
//!   when the space is cropped.
//!
//! # Example
//!
//! ```
//! use ome_tiling::dimension::{Dimension, DimensionSpace, NamedDimensionSubrange};
//!
//! let space = DimensionSpace::new(vec![
//!     Dimension::new("X", 64).unwrap(),
//!     Dimension::new("Y", 32).unwrap(),
//! ])
//! .unwrap();
//!
//! let crop = space
//!     .named_subrange(&[NamedDimensionSubrange::new("X", 8, 16)])
//!     .unwrap();
//! assert_eq!(crop.storage_index(&[0, 0]).unwrap(), 8);
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::error::DimensionError;

use super::axis::{Dimension, Direction};

// =============================================================================
// Storage Order and Subrange Descriptors
// =============================================================================

/// One entry of a storage order, referring to an axis by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexedDimensionStorage {
    /// Logical index of the axis
    pub index: usize,

    /// Layout direction of the axis
    pub direction: Direction,
}

impl IndexedDimensionStorage {
    pub const fn new(index: usize, direction: Direction) -> Self {
        Self { index, direction }
    }

    pub const fn ascending(index: usize) -> Self {
        Self::new(index, Direction::Ascending)
    }

    pub const fn descending(index: usize) -> Self {
        Self::new(index, Direction::Descending)
    }
}

/// One entry of a storage order, referring to an axis by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedDimensionStorage {
    pub name: String,
    pub direction: Direction,
}

impl NamedDimensionStorage {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }
}

/// A crop request for one axis, with bounds relative to its active range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexedDimensionSubrange {
    pub index: usize,
    pub begin: usize,
    pub end: usize,
}

impl IndexedDimensionSubrange {
    pub const fn new(index: usize, begin: usize, end: usize) -> Self {
        Self { index, begin, end }
    }
}

/// A crop request for one axis identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedDimensionSubrange {
    pub name: String,
    pub begin: usize,
    pub end: usize,
}

impl NamedDimensionSubrange {
    pub fn new(name: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            begin,
            end,
        }
    }
}

/// Derived physical layout of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct StorageDetail {
    /// Signed storage stride (negative when descending)
    stride: isize,

    /// Offset contributed to the base when descending
    descending_offset: usize,
}

// =============================================================================
// DimensionSpace
// =============================================================================

/// An ordered set of axes with a logical and a storage layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpace {
    /// Axes in logical order
    dimensions: Vec<Dimension>,

    /// Storage order, fastest-varying axis first
    storage: Vec<IndexedDimensionStorage>,

    /// Physical layout, indexed by logical axis index
    detail: Vec<StorageDetail>,

    /// Storage offset of the element at raw position zero on every axis
    base: usize,
}

impl DimensionSpace {
    /// Create a space whose storage order mirrors the logical order, all
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::DuplicateName`] if two axes share a name.
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, DimensionError> {
        let order = (0..dimensions.len())
            .map(IndexedDimensionStorage::ascending)
            .collect();
        Self::with_storage_order(dimensions, order)
    }

    /// Create a space with an explicit storage order.
    ///
    /// # Errors
    ///
    /// Fails on duplicate axis names or an invalid storage order.
    pub fn with_storage_order(
        dimensions: Vec<Dimension>,
        order: Vec<IndexedDimensionStorage>,
    ) -> Result<Self, DimensionError> {
        let mut names = HashSet::with_capacity(dimensions.len());
        for dimension in &dimensions {
            if !names.insert(dimension.name()) {
                return Err(DimensionError::DuplicateName(dimension.name().to_string()));
            }
        }

        let mut space = Self {
            detail: vec![StorageDetail::default(); dimensions.len()],
            dimensions,
            storage: Vec::new(),
            base: 0,
        };
        space.compute_logical_strides();
        space.set_storage_order(order)?;
        Ok(space)
    }

    /// Create a space with a storage order given by axis names.
    pub fn with_named_storage_order(
        dimensions: Vec<Dimension>,
        order: &[NamedDimensionStorage],
    ) -> Result<Self, DimensionError> {
        let mut space = Self::new(dimensions)?;
        space.set_named_storage_order(order)?;
        Ok(space)
    }

    // -------------------------------------------------------------------------
    // Storage order
    // -------------------------------------------------------------------------

    /// Replace the storage order and recompute storage strides and base.
    ///
    /// # Errors
    ///
    /// Fails if `order` does not have one entry per axis, references an axis
    /// index out of range, or repeats an axis. The space is unchanged on
    /// failure.
    pub fn set_storage_order(
        &mut self,
        order: Vec<IndexedDimensionStorage>,
    ) -> Result<(), DimensionError> {
        let count = self.dimensions.len();
        if order.len() != count {
            return Err(DimensionError::StorageOrderLength {
                expected: count,
                actual: order.len(),
            });
        }

        let mut seen = vec![false; count];
        for entry in &order {
            if entry.index >= count {
                return Err(DimensionError::IndexOutOfRange {
                    index: entry.index,
                    count,
                });
            }
            if std::mem::replace(&mut seen[entry.index], true) {
                return Err(DimensionError::DuplicateIndex(entry.index));
            }
        }

        self.storage = order;
        self.compute_storage_strides();
        Ok(())
    }

    /// Replace the storage order using axis names.
    pub fn set_named_storage_order(
        &mut self,
        order: &[NamedDimensionStorage],
    ) -> Result<(), DimensionError> {
        let indexed = order
            .iter()
            .map(|entry| {
                self.index_of(&entry.name)
                    .map(|index| IndexedDimensionStorage::new(index, entry.direction))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.set_storage_order(indexed)
    }

    // -------------------------------------------------------------------------
    // Subranges
    // -------------------------------------------------------------------------

    /// Derive a cropped space.
    ///
    /// Bounds are relative to each axis's current active range, so nested
    /// crops compose. Storage order, storage strides and base are inherited.
    ///
    /// # Errors
    ///
    /// Fails if an axis index repeats or is out of range, or if a requested
    /// range is empty, inverted or larger than the current active size.
    pub fn subrange(&self, ranges: &[IndexedDimensionSubrange]) -> Result<Self, DimensionError> {
        let count = self.dimensions.len();
        let mut seen = vec![false; count];
        for range in ranges {
            if range.index >= count {
                return Err(DimensionError::IndexOutOfRange {
                    index: range.index,
                    count,
                });
            }
            if std::mem::replace(&mut seen[range.index], true) {
                return Err(DimensionError::DuplicateIndex(range.index));
            }
        }

        let mut cropped = self.clone();
        for range in ranges {
            cropped.dimensions[range.index] =
                self.dimensions[range.index].subrange(range.begin, range.end)?;
        }
        cropped.compute_logical_strides();
        Ok(cropped)
    }

    /// Derive a cropped space using axis names.
    pub fn named_subrange(
        &self,
        ranges: &[NamedDimensionSubrange],
    ) -> Result<Self, DimensionError> {
        let indexed = ranges
            .iter()
            .map(|range| {
                self.index_of(&range.name)
                    .map(|index| IndexedDimensionSubrange::new(index, range.begin, range.end))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.subrange(&indexed)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Axes in logical order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, index: usize) -> Option<&Dimension> {
        self.dimensions.get(index)
    }

    /// Resolve an axis name to its logical index.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::UnknownName`] if no axis has this name.
    pub fn index_of(&self, name: &str) -> Result<usize, DimensionError> {
        self.dimensions
            .iter()
            .position(|d| d.name() == name)
            .ok_or_else(|| DimensionError::UnknownName(name.to_string()))
    }

    /// Storage order, fastest-varying axis first.
    pub fn storage_order(&self) -> &[IndexedDimensionStorage] {
        &self.storage
    }

    /// Active size of every axis, in logical order.
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(Dimension::size).collect()
    }

    /// Logical strides, in logical order.
    pub fn logical_strides(&self) -> Vec<usize> {
        self.dimensions.iter().map(Dimension::stride).collect()
    }

    /// Signed storage strides, in logical order.
    pub fn storage_strides(&self) -> Vec<isize> {
        self.detail.iter().map(|d| d.stride).collect()
    }

    /// Signed storage stride of one axis.
    pub fn storage_stride(&self, index: usize) -> Option<isize> {
        self.detail.get(index).map(|d| d.stride)
    }

    /// Storage direction of one axis.
    pub fn direction(&self, index: usize) -> Option<Direction> {
        self.storage
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| entry.direction)
    }

    /// Descending offset of one axis (zero when ascending).
    pub fn descending_offset(&self, index: usize) -> Option<usize> {
        self.detail.get(index).map(|d| d.descending_offset)
    }

    /// Storage offset of raw position zero on every axis.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of addressable elements (product of active sizes).
    pub fn num_elements(&self) -> usize {
        self.dimensions.iter().map(Dimension::size).product()
    }

    /// Number of elements in storage (product of raw extents).
    pub fn storage_size(&self) -> usize {
        self.dimensions.iter().map(Dimension::extent).product()
    }

    // -------------------------------------------------------------------------
    // Index conversions
    // -------------------------------------------------------------------------

    /// Dense index of a coordinate in logical order.
    ///
    /// # Errors
    ///
    /// Fails if `coord` has the wrong length or a component is outside the
    /// active size of its axis.
    pub fn logical_index(&self, coord: &[usize]) -> Result<usize, DimensionError> {
        self.check_coord(coord)?;
        Ok(self
            .dimensions
            .iter()
            .zip(coord)
            .map(|(d, &c)| c * d.stride())
            .sum())
    }

    /// Inverse of [`logical_index`](Self::logical_index).
    pub fn logical_coord(&self, index: usize) -> Result<Vec<usize>, DimensionError> {
        let count = self.num_elements();
        if index >= count {
            return Err(DimensionError::ElementOutOfRange { index, count });
        }

        let mut coord = vec![0; self.dimensions.len()];
        let mut remainder = index;
        for (i, dimension) in self.dimensions.iter().enumerate().rev() {
            coord[i] = remainder / dimension.stride();
            remainder %= dimension.stride();
        }
        Ok(coord)
    }

    /// Physical storage offset of a coordinate.
    ///
    /// The coordinate is relative to the active range of each axis.
    pub fn storage_index(&self, coord: &[usize]) -> Result<usize, DimensionError> {
        self.check_coord(coord)?;
        let offset = self
            .dimensions
            .iter()
            .zip(&self.detail)
            .zip(coord)
            .fold(self.base as isize, |acc, ((d, detail), &c)| {
                acc + detail.stride * (c + d.begin()) as isize
            });
        Ok(offset as usize)
    }

    /// Inverse of [`storage_index`](Self::storage_index).
    ///
    /// # Errors
    ///
    /// Fails if `index` is beyond storage or addresses an element outside the
    /// active range.
    pub fn storage_coord(&self, index: usize) -> Result<Vec<usize>, DimensionError> {
        let count = self.storage_size();
        if index >= count {
            return Err(DimensionError::ElementOutOfRange { index, count });
        }

        let mut coord = vec![0; self.dimensions.len()];
        let mut remainder = index;
        for entry in self.storage.iter().rev() {
            let dimension = &self.dimensions[entry.index];
            let magnitude = self.detail[entry.index].stride.unsigned_abs();
            let step = remainder / magnitude;
            remainder %= magnitude;

            let raw = match entry.direction {
                Direction::Ascending => step,
                Direction::Descending => dimension.extent() - 1 - step,
            };
            if raw < dimension.begin() || raw >= dimension.end() {
                return Err(DimensionError::CoordinateOutOfRange {
                    name: dimension.name().to_string(),
                    value: raw,
                    size: dimension.size(),
                });
            }
            coord[entry.index] = raw - dimension.begin();
        }
        Ok(coord)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn check_coord(&self, coord: &[usize]) -> Result<(), DimensionError> {
        if coord.len() != self.dimensions.len() {
            return Err(DimensionError::CoordinateLength {
                expected: self.dimensions.len(),
                actual: coord.len(),
            });
        }
        for (dimension, &value) in self.dimensions.iter().zip(coord) {
            if value >= dimension.size() {
                return Err(DimensionError::CoordinateOutOfRange {
                    name: dimension.name().to_string(),
                    value,
                    size: dimension.size(),
                });
            }
        }
        Ok(())
    }

    fn compute_logical_strides(&mut self) {
        let mut stride = 1;
        for dimension in &mut self.dimensions {
            dimension.set_stride(stride);
            stride *= dimension.size();
        }
    }

    fn compute_storage_strides(&mut self) {
        let mut stride = 1usize;
        let mut base = 0;
        for entry in &self.storage {
            let extent = self.dimensions[entry.index].extent();
            let detail = &mut self.detail[entry.index];
            match entry.direction {
                Direction::Ascending => {
                    detail.stride = stride as isize;
                    detail.descending_offset = 0;
                }
                Direction::Descending => {
                    detail.stride = -(stride as isize);
                    detail.descending_offset = (extent - 1) * stride;
                }
            }
            base += detail.descending_offset;
            stride *= extent;
        }
        self.base = base;
    }
}

impl fmt::Display for DimensionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.dimensions.iter().map(Dimension::name).collect();
        writeln!(f, "Logical dimensions: {}", names.join(" "))?;
        let extents: Vec<usize> = self.dimensions.iter().map(Dimension::extent).collect();
        writeln!(f, "  Extents: {extents:?}")?;
        let ranges: Vec<String> = self
            .dimensions
            .iter()
            .map(|d| format!("[{},{})", d.begin(), d.end()))
            .collect();
        writeln!(f, "  Ranges: {}", ranges.join(" "))?;
        writeln!(f, "  Sizes: {:?}", self.shape())?;
        writeln!(f, "  Strides: {:?}", self.logical_strides())?;

        let storage: Vec<String> = self
            .storage
            .iter()
            .map(|entry| {
                let d = &self.dimensions[entry.index];
                format!("{}({}{})", d.name(), entry.direction.sign(), d.extent())
            })
            .collect();
        writeln!(f, "Storage dimensions: {}", storage.join(" "))?;
        writeln!(f, "  Base: {}", self.base)?;
        writeln!(f, "  Strides: {:?}", self.storage_strides())?;
        write!(
            f,
            "  Descending offsets: {:?}",
            self.detail.iter().map(|d| d.descending_offset).collect::<Vec<_>>()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
