//! Tile geometry of one plane.
//!
//! [`TileInfo`] converts between pixel positions, linear tile indices and
//! tile regions. It holds only a [`DirectoryHandle`]; every query takes the
//! registry, re-resolves the handle and fails with
//! [`TileError::DirectoryGone`] once the directory has been removed.
//!
//! Tiles are numbered the way the directory numbers them natively. For the
//! libtiff layout used by [`MemoryDirectory`](super::MemoryDirectory) the
//! index of the tile at `(row, column)` in sample plane `s` is
//! `s * tiles_per_plane + row * columns + column`.

use crate::error::TileError;

use super::directory::{Directory, DirectoryHandle, DirectoryRegistry, PlaneProperties};
use super::region::PlaneRegion;
use super::tags::{PlanarConfiguration, TileType};

/// Tile geometry bound to a directory handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
    handle: DirectoryHandle,
}

impl TileInfo {
    /// Create tile geometry for a registered directory.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::DirectoryGone`] for a stale handle and
    /// [`TileError::InvalidGeometry`] if the directory properties do not
    /// describe a tile grid.
    pub fn new<D: Directory>(
        registry: &DirectoryRegistry<D>,
        handle: DirectoryHandle,
    ) -> Result<Self, TileError> {
        registry.get(handle)?.properties().validate()?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> DirectoryHandle {
        self.handle
    }

    fn resolve<'r, D: Directory>(
        &self,
        registry: &'r DirectoryRegistry<D>,
    ) -> Result<&'r D, TileError> {
        registry.get(self.handle)
    }

    /// Current properties of the plane.
    pub fn properties<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<PlaneProperties, TileError> {
        Ok(self.resolve(registry)?.properties())
    }

    // =========================================================================
    // Counts and sizes
    // =========================================================================

    pub fn tile_width<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u32, TileError> {
        Ok(self.properties(registry)?.tile_width)
    }

    pub fn tile_height<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u32, TileError> {
        Ok(self.properties(registry)?.tile_height)
    }

    pub fn tile_type<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<TileType, TileError> {
        Ok(self.properties(registry)?.tile_type)
    }

    pub fn samples_per_pixel<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u16, TileError> {
        Ok(self.properties(registry)?.samples_per_pixel)
    }

    pub fn planar_configuration<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<PlanarConfiguration, TileError> {
        Ok(self.properties(registry)?.planar_configuration)
    }

    /// Number of tile rows: `ceil(image_height / tile_height)`.
    pub fn tile_row_count<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u32, TileError> {
        Ok(self.properties(registry)?.tiles_down())
    }

    /// Number of tile columns: `ceil(image_width / tile_width)`.
    pub fn tile_column_count<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u32, TileError> {
        Ok(self.properties(registry)?.tiles_across())
    }

    /// Total number of tiles or strips, as reported by the directory.
    pub fn tile_count<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u32, TileError> {
        Ok(self.resolve(registry)?.tile_count())
    }

    /// Number of tiles in one sample plane.
    pub fn tiles_per_plane<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<u32, TileError> {
        Ok(self.properties(registry)?.tiles_per_plane())
    }

    /// Size in bytes of one decoded tile.
    pub fn buffer_size<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
    ) -> Result<usize, TileError> {
        Ok(self.properties(registry)?.tile_bytes())
    }

    // =========================================================================
    // Index conversions
    // =========================================================================

    /// Index of the tile containing pixel `(x, y)` of `sample`.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::RegionOutOfBounds`] for a pixel outside the
    /// image and [`TileError::SampleOutOfRange`] for an unknown sample.
    pub fn tile_index<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
        x: u32,
        y: u32,
        sample: u16,
    ) -> Result<u32, TileError> {
        let directory = self.resolve(registry)?;
        let props = directory.properties();
        if x >= props.image_width || y >= props.image_height {
            return Err(TileError::RegionOutOfBounds {
                region: PlaneRegion::new(x, y, 1, 1),
                width: props.image_width,
                height: props.image_height,
            });
        }
        if sample >= props.samples_per_pixel {
            return Err(TileError::SampleOutOfRange {
                sample,
                samples: props.samples_per_pixel,
            });
        }
        Ok(directory.native_tile_index(x, y, sample))
    }

    fn check_index<D: Directory>(
        &self,
        directory: &D,
        index: u32,
    ) -> Result<PlaneProperties, TileError> {
        let count = directory.tile_count();
        if index >= count {
            return Err(TileError::IndexOutOfRange { index, count });
        }
        Ok(directory.properties())
    }

    /// Row of a tile within its sample plane.
    pub fn tile_row<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
        index: u32,
    ) -> Result<u32, TileError> {
        let props = self.check_index(self.resolve(registry)?, index)?;
        Ok((index % props.tiles_per_plane()) / props.tiles_across())
    }

    /// Column of a tile within its sample plane.
    pub fn tile_column<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
        index: u32,
    ) -> Result<u32, TileError> {
        let props = self.check_index(self.resolve(registry)?, index)?;
        Ok((index % props.tiles_per_plane()) % props.tiles_across())
    }

    /// Sample plane of a tile (always 0 for chunky planes).
    pub fn tile_sample<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
        index: u32,
    ) -> Result<u16, TileError> {
        let props = self.check_index(self.resolve(registry)?, index)?;
        Ok((index / props.tiles_per_plane()) as u16)
    }

    /// Region covered by a tile, optionally intersected with `clip`.
    ///
    /// Tiles in the last row and column usually overhang the image, so
    /// callers pass the image bounds as `clip` to get the stored pixels.
    pub fn tile_region<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
        index: u32,
        clip: Option<&PlaneRegion>,
    ) -> Result<PlaneRegion, TileError> {
        let props = self.check_index(self.resolve(registry)?, index)?;
        let within = index % props.tiles_per_plane();
        let row = within / props.tiles_across();
        let column = within % props.tiles_across();
        let region = PlaneRegion::new(
            column * props.tile_width,
            row * props.tile_height,
            props.tile_width,
            props.tile_height,
        );
        Ok(match clip {
            Some(clip) => region.intersection(clip),
            None => region,
        })
    }

    /// Indices of every tile intersecting `region`, by sample, then row,
    /// then column.
    ///
    /// The region is clipped to the image first; a region entirely outside
    /// the image covers no tiles.
    pub fn tile_coverage<D: Directory>(
        &self,
        registry: &DirectoryRegistry<D>,
        region: &PlaneRegion,
    ) -> Result<Vec<u32>, TileError> {
        let directory = self.resolve(registry)?;
        let props = directory.properties();
        let image = PlaneRegion::new(0, 0, props.image_width, props.image_height);
        let clipped = region.intersection(&image);
        if !clipped.valid() {
            return Ok(Vec::new());
        }

        let first_row = clipped.y / props.tile_height;
        let last_row = (clipped.y + clipped.h - 1) / props.tile_height;
        let first_column = clipped.x / props.tile_width;
        let last_column = (clipped.x + clipped.w - 1) / props.tile_width;

        let mut tiles = Vec::new();
        for sample in 0..props.sample_planes() {
            for row in first_row..=last_row {
                for column in first_column..=last_column {
                    tiles.push(directory.native_tile_index(
                        column * props.tile_width,
                        row * props.tile_height,
                        sample,
                    ));
                }
            }
        }
        Ok(tiles)
    }
}

// =============================================================================
// Tests
// =============================================================================
