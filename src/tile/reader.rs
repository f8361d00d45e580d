//! Reading plane regions into pixel buffers.
//!
//! A [`PlaneReader`] assembles an arbitrary region of a plane from the tiles
//! that cover it. Tile bytes are fetched through a [`TileCache`] and decoded
//! sample by sample into a [`VariantPixelBuffer`] of shape
//! `[w, h, 1, 1, 1, samples, 1, 1, 1]`. The destination buffer may use any
//! storage order; samples are placed by logical index.

use bytes::Bytes;
use tracing::trace;

use crate::config::TilingConfig;
use crate::error::{PixelError, TileError};
use crate::pixel::{
    Pixel, PixelBuffer, PixelBufferVisitorMut, PixelIndices, PixelShape, PixelType, SampleAddress,
    VariantPixelBuffer,
};
use crate::tiff::{
    Directory, DirectoryHandle, DirectoryRegistry, PlaneProperties, PlaneRegion, TileInfo,
};

use super::cache::{TileCache, TileCacheKey};

// =============================================================================
// Shared helpers
// =============================================================================

/// Shape of a buffer holding `region` with `samples` samples per pixel.
pub fn region_shape(region: &PlaneRegion, samples: u16) -> PixelShape {
    [
        region.w as usize,
        region.h as usize,
        1,
        1,
        1,
        usize::from(samples),
        1,
        1,
        1,
    ]
}

#[inline]
pub(crate) fn pixel_indices(x: u32, y: u32, sample: u16) -> PixelIndices {
    [x as usize, y as usize, 0, 0, 0, usize::from(sample), 0, 0, 0]
}

/// Check that `region` lies inside the plane and that a buffer of the given
/// type and shape can hold it.
pub(crate) fn check_transfer(
    props: &PlaneProperties,
    region: &PlaneRegion,
    pixel_type: PixelType,
    shape: PixelShape,
) -> Result<(), TileError> {
    let image = PlaneRegion::new(0, 0, props.image_width, props.image_height);
    if !region.valid() || !image.contains(region) {
        return Err(TileError::RegionOutOfBounds {
            region: *region,
            width: props.image_width,
            height: props.image_height,
        });
    }
    if pixel_type != props.pixel_type {
        return Err(PixelError::TypeMismatch {
            expected: props.pixel_type,
            actual: pixel_type,
        }
        .into());
    }
    let expected = region_shape(region, props.samples_per_pixel);
    if shape != expected {
        return Err(TileError::BufferShape {
            expected,
            actual: shape,
        });
    }
    Ok(())
}

/// Placement of one tile's pixels relative to the transferred region.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TileWindow {
    /// Unclipped region of the tile
    pub tile: PlaneRegion,

    /// Part of the tile inside the transferred region
    pub overlap: PlaneRegion,

    /// The transferred region
    pub region: PlaneRegion,

    /// Sample plane of the tile (0 for chunky planes)
    pub sample: u16,
}

impl TileWindow {
    /// Samples present in the tile.
    pub fn samples(&self, props: &PlaneProperties) -> std::ops::Range<u16> {
        if props.is_planar() {
            self.sample..self.sample + 1
        } else {
            0..props.samples_per_pixel
        }
    }

    /// Address of pixel `(x, y)` sample `s` inside the tile bytes.
    pub fn address(&self, props: &PlaneProperties, x: u32, y: u32, s: u16) -> SampleAddress {
        let column = (x - self.tile.x) as usize;
        SampleAddress {
            row_start: (y - self.tile.y) as usize * props.row_bytes(),
            column: if props.is_planar() {
                column
            } else {
                column * usize::from(props.samples_per_pixel) + usize::from(s)
            },
        }
    }
}

struct DecodeTile<'d> {
    data: &'d [u8],
    props: PlaneProperties,
    window: TileWindow,
}

impl PixelBufferVisitorMut for DecodeTile<'_> {
    type Output = Result<(), PixelError>;

    fn visit<T: Pixel>(self, buffer: &mut PixelBuffer<'_, T>) -> Self::Output {
        let TileWindow { overlap, region, .. } = self.window;
        for y in overlap.y..overlap.y + overlap.h {
            for x in overlap.x..overlap.x + overlap.w {
                for s in self.window.samples(&self.props) {
                    let address = self.window.address(&self.props, x, y, s);
                    let value = T::read_sample(self.data, address, self.props.endian);
                    *buffer.at_mut(&pixel_indices(x - region.x, y - region.y, s))? = value;
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// PlaneReader
// =============================================================================

/// Reads regions of planes through a decoded tile cache.
pub struct PlaneReader {
    cache: TileCache,
}

impl PlaneReader {
    pub fn new(cache: TileCache) -> Self {
        Self { cache }
    }

    pub fn from_config(config: &TilingConfig) -> Self {
        Self::new(TileCache::from_config(config))
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TileCache {
        &mut self.cache
    }

    /// Drop cached tiles of a directory, e.g. after it has been written.
    pub fn invalidate(&mut self, handle: DirectoryHandle) -> usize {
        self.cache.remove_directory(handle)
    }

    fn fetch<D: Directory>(
        &mut self,
        directory: &D,
        handle: DirectoryHandle,
        tile: u32,
    ) -> Result<Bytes, TileError> {
        let key = TileCacheKey::new(handle, tile);
        if let Some(data) = self.cache.get(&key) {
            return Ok(data);
        }
        let data = directory.read_tile(tile)?;
        self.cache.put(key, data.clone());
        Ok(data)
    }

    /// Fill `buffer` with the pixels of `region`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry owning the directory
    /// * `handle` - Directory of the plane to read
    /// * `region` - Region to read, entirely inside the plane
    /// * `buffer` - Destination of shape `[w, h, 1, 1, 1, samples, 1, 1, 1]`
    ///   and the plane's pixel type
    ///
    /// # Errors
    ///
    /// Fails without reading if the handle is stale, the region leaves the
    /// plane or the buffer does not match. Directory I/O errors and
    /// truncated tiles abort the read; `buffer` may then be partly filled.
    pub fn read_region<D: Directory>(
        &mut self,
        registry: &DirectoryRegistry<D>,
        handle: DirectoryHandle,
        region: &PlaneRegion,
        buffer: &mut VariantPixelBuffer<'_>,
    ) -> Result<(), TileError> {
        let info = TileInfo::new(registry, handle)?;
        let props = info.properties(registry)?;
        check_transfer(&props, region, buffer.pixel_type(), buffer.shape())?;

        let directory = registry.get(handle)?;
        let required = props.tile_bytes();
        for tile in info.tile_coverage(registry, region)? {
            let data = self.fetch(directory, handle, tile)?;
            if data.len() < required {
                return Err(TileError::TruncatedTile {
                    index: tile,
                    required,
                    actual: data.len(),
                });
            }

            let tile_region = info.tile_region(registry, tile, None)?;
            let window = TileWindow {
                tile: tile_region,
                overlap: tile_region.intersection(region),
                region: *region,
                sample: info.tile_sample(registry, tile)?,
            };
            trace!(%handle, tile, overlap = %window.overlap, "Decoding tile");
            buffer.apply_visitor_mut(DecodeTile {
                data: &data,
                props,
                window,
            })?;
        }
        Ok(())
    }
}

impl Default for PlaneReader {
    fn default() -> Self {
        Self::new(TileCache::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
