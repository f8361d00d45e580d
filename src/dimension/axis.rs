//! A single named axis of a multi-dimensional image.
//!
//! An axis has a raw `extent` (the number of elements present in the
//! underlying storage) and an active range `[begin, end)` selecting the
//! elements currently addressed. Cropping an axis narrows the active range
//! without touching the extent, which is what keeps physical addressing
//! stable under repeated cropping.

use std::fmt;

use crate::error::DimensionError;

// =============================================================================
// Direction
// =============================================================================

/// Direction in which an axis is laid out in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Index 0 is stored first
    #[default]
    Ascending,

    /// Index 0 is stored last
    Descending,
}

impl Direction {
    /// Check if this is the ascending direction.
    #[inline]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Direction::Ascending)
    }

    /// Sign used when rendering storage orders (`+` ascending, `-` descending).
    pub const fn sign(self) -> char {
        match self {
            Direction::Ascending => '+',
            Direction::Descending => '-',
        }
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// One named logical axis.
///
/// The logical stride is derived by the owning
/// [`DimensionSpace`](super::DimensionSpace) and is `1` for a standalone axis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dimension {
    name: String,
    extent: usize,
    begin: usize,
    end: usize,
    stride: usize,
}

impl Dimension {
    /// Create an axis covering its full extent.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::ZeroExtent`] if `extent` is zero.
    pub fn new(name: impl Into<String>, extent: usize) -> Result<Self, DimensionError> {
        Self::with_range(name, extent, 0, extent)
    }

    /// Create an axis with an explicit active range.
    ///
    /// `begin == end` is accepted and describes a fixed axis addressing no
    /// elements.
    ///
    /// # Arguments
    ///
    /// * `name` - Axis name, unique within a coordinate space
    /// * `extent` - Number of elements in storage
    /// * `begin` - First active element
    /// * `end` - One past the last active element
    ///
    /// # Errors
    ///
    /// Fails if the extent is zero or the range does not fit in `[0, extent)`.
    pub fn with_range(
        name: impl Into<String>,
        extent: usize,
        begin: usize,
        end: usize,
    ) -> Result<Self, DimensionError> {
        let dimension = Self {
            name: name.into(),
            extent,
            begin,
            end,
            stride: 1,
        };
        dimension.check(0, extent)?;
        Ok(dimension)
    }

    /// Crop this axis to `[begin, end)` relative to its current active range.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::InvalidSubrange`] for an empty, inverted or
    /// oversized request.
    pub fn subrange(&self, begin: usize, end: usize) -> Result<Self, DimensionError> {
        if begin >= end || end > self.size() {
            return Err(DimensionError::InvalidSubrange {
                name: self.name.clone(),
                begin,
                end,
                size: self.size(),
            });
        }

        let cropped = Self {
            name: self.name.clone(),
            extent: self.extent,
            begin: self.begin + begin,
            end: self.begin + end,
            stride: self.stride,
        };
        cropped.check(self.begin, self.end)?;
        Ok(cropped)
    }

    /// Validate this axis against the active range of its parent.
    ///
    /// # Errors
    ///
    /// Fails if the extent is zero, if `begin >= extent`, `end > extent` or
    /// `begin > end`, or if `[begin, end)` is not inside
    /// `[parent_begin, parent_end)`.
    pub fn check(&self, parent_begin: usize, parent_end: usize) -> Result<(), DimensionError> {
        if self.extent == 0 {
            return Err(DimensionError::ZeroExtent {
                name: self.name.clone(),
            });
        }

        if self.begin >= self.extent || self.end > self.extent || self.begin > self.end {
            return Err(DimensionError::InvalidRange {
                name: self.name.clone(),
                extent: self.extent,
                begin: self.begin,
                end: self.end,
            });
        }

        if self.begin < parent_begin || self.end > parent_end {
            return Err(DimensionError::OutsideParentRange {
                name: self.name.clone(),
                begin: self.begin,
                end: self.end,
                parent_begin,
                parent_end,
            });
        }

        Ok(())
    }

    /// Axis name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of elements in storage.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// First active element.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// One past the last active element.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of active elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.end - self.begin
    }

    /// Logical stride within the owning coordinate space.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub(crate) fn set_stride(&mut self, stride: usize) {
        self.stride = stride;
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] [{}, {})",
            self.name, self.extent, self.begin, self.end
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
