//! Writing plane regions from pixel buffers.
//!
//! A [`PlaneWriter`] accepts regions in any order. Each region is scattered
//! into in-memory images of the tiles it touches, and its coverage is
//! recorded per sample plane. A tile is written to the directory as soon as
//! its part of the image is fully covered, so a writer filling a plane tile
//! by tile never holds more than the tiles in progress.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::TilingConfig;
use crate::error::{IoError, PixelError, TileError};
use crate::pixel::{Pixel, PixelBuffer, PixelBufferVisitor, VariantPixelBuffer};
use crate::tiff::{
    Directory, DirectoryHandle, DirectoryRegistry, PlaneProperties, PlaneRegion, TileCoverage,
    TileInfo,
};

use super::reader::{check_transfer, pixel_indices, TileWindow};

struct EncodeTile<'d> {
    data: &'d mut [u8],
    props: PlaneProperties,
    window: TileWindow,
}

impl PixelBufferVisitor for EncodeTile<'_> {
    type Output = Result<(), PixelError>;

    fn visit<T: Pixel>(self, buffer: &PixelBuffer<'_, T>) -> Self::Output {
        let TileWindow { overlap, region, .. } = self.window;
        for y in overlap.y..overlap.y + overlap.h {
            for x in overlap.x..overlap.x + overlap.w {
                for s in self.window.samples(&self.props) {
                    let value = *buffer.at(&pixel_indices(x - region.x, y - region.y, s))?;
                    let address = self.window.address(&self.props, x, y, s);
                    value.write_sample(self.data, address, self.props.endian);
                }
            }
        }
        Ok(())
    }
}

/// Writes regions of one plane and flushes tiles once they are complete.
#[derive(Debug)]
pub struct PlaneWriter {
    info: TileInfo,
    image: PlaneRegion,
    pending: HashMap<u32, Vec<u8>>,
    coverage: Vec<TileCoverage>,
    written: HashSet<u32>,
    coalesce: bool,
}

impl PlaneWriter {
    /// Create a writer for a registered directory.
    ///
    /// Coverage trackers and coalescing follow `config`.
    pub fn new<D: Directory>(
        registry: &DirectoryRegistry<D>,
        handle: DirectoryHandle,
        config: &TilingConfig,
    ) -> Result<Self, TileError> {
        let info = TileInfo::new(registry, handle)?;
        let props = info.properties(registry)?;
        Ok(Self {
            info,
            image: PlaneRegion::new(0, 0, props.image_width, props.image_height),
            pending: HashMap::new(),
            coverage: (0..props.sample_planes())
                .map(|_| TileCoverage::from_config(config))
                .collect(),
            written: HashSet::new(),
            coalesce: config.coalesce,
        })
    }

    pub fn handle(&self) -> DirectoryHandle {
        self.info.handle()
    }

    /// Coverage recorded for one sample plane (always 0 for chunky planes).
    pub fn coverage(&self, sample: u16) -> Option<&TileCoverage> {
        self.coverage.get(usize::from(sample))
    }

    /// Check that every pixel of every sample plane has been written and
    /// every tile stored in the directory.
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty() && self.coverage.iter().all(|c| c.covered(&self.image))
    }

    /// Tiles holding data not yet written to the directory, sorted.
    pub fn pending_tiles(&self) -> Vec<u32> {
        let mut tiles: Vec<u32> = self.pending.keys().copied().collect();
        tiles.sort_unstable();
        tiles
    }

    /// Tiles written to the directory so far, sorted.
    pub fn written_tiles(&self) -> Vec<u32> {
        let mut tiles: Vec<u32> = self.written.iter().copied().collect();
        tiles.sort_unstable();
        tiles
    }

    /// Initial content of a tile: its stored bytes, or zeros if it was never
    /// written.
    fn load_tile<D: Directory>(
        directory: &D,
        tile: u32,
        required: usize,
    ) -> Result<Vec<u8>, TileError> {
        match directory.read_tile(tile) {
            Ok(data) if data.len() >= required => Ok(data[..required].to_vec()),
            Ok(data) => Err(TileError::TruncatedTile {
                index: tile,
                required,
                actual: data.len(),
            }),
            Err(IoError::TileNotWritten(_)) => Ok(vec![0; required]),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the pixels of `buffer` to `region`.
    ///
    /// Returns the tiles that became complete and were written to the
    /// directory by this call.
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry owning the directory
    /// * `region` - Region to write, entirely inside the plane
    /// * `buffer` - Source of shape `[w, h, 1, 1, 1, samples, 1, 1, 1]` and
    ///   the plane's pixel type, in any storage order
    ///
    /// # Errors
    ///
    /// Fails without changes if the handle is stale, the region leaves the
    /// plane or the buffer does not match. Directory I/O errors are
    /// propagated unchanged.
    pub fn write_region<D: Directory>(
        &mut self,
        registry: &mut DirectoryRegistry<D>,
        region: &PlaneRegion,
        buffer: &VariantPixelBuffer<'_>,
    ) -> Result<Vec<u32>, TileError> {
        let handle = self.info.handle();
        let props = self.info.properties(registry)?;
        check_transfer(&props, region, buffer.pixel_type(), buffer.shape())?;

        let tiles = self.info.tile_coverage(registry, region)?;
        let required = props.tile_bytes();
        for &tile in &tiles {
            if !self.pending.contains_key(&tile) {
                let data = Self::load_tile(registry.get(handle)?, tile, required)?;
                self.pending.insert(tile, data);
            }
            let tile_region = self.info.tile_region(registry, tile, None)?;
            let window = TileWindow {
                tile: tile_region,
                overlap: tile_region.intersection(region),
                region: *region,
                sample: self.info.tile_sample(registry, tile)?,
            };
            if let Some(data) = self.pending.get_mut(&tile) {
                buffer.apply_visitor(EncodeTile {
                    data: data.as_mut_slice(),
                    props,
                    window,
                })?;
            }
        }

        for coverage in &mut self.coverage {
            coverage.insert(*region, self.coalesce);
        }

        let mut completed = Vec::new();
        for &tile in &tiles {
            let clipped = self.info.tile_region(registry, tile, Some(&self.image))?;
            let sample = usize::from(self.info.tile_sample(registry, tile)?);
            let complete = self
                .coverage
                .get(sample)
                .is_some_and(|coverage| coverage.covered(&clipped));
            if !complete {
                continue;
            }
            // a failed write keeps the tile pending for a later flush
            if let Some(data) = self.pending.get(&tile) {
                registry.get_mut(handle)?.write_tile(tile, data)?;
                self.pending.remove(&tile);
                self.written.insert(tile);
                completed.push(tile);
            }
        }
        if !completed.is_empty() {
            debug!(%handle, tiles = ?completed, "Flushed complete tiles");
        }
        Ok(completed)
    }

    /// Write every pending tile, complete or not. Unwritten pixels of those
    /// tiles keep their previous content, or zero.
    ///
    /// Returns the pending tiles that were written: incomplete ones and
    /// complete ones whose earlier write failed.
    pub fn flush<D: Directory>(
        &mut self,
        registry: &mut DirectoryRegistry<D>,
    ) -> Result<Vec<u32>, TileError> {
        let handle = self.info.handle();
        let tiles = self.pending_tiles();
        if !tiles.is_empty() {
            warn!(%handle, tiles = ?tiles, "Flushing pending tiles");
        }
        for &tile in &tiles {
            if let Some(data) = self.pending.get(&tile) {
                registry.get_mut(handle)?.write_tile(tile, data)?;
            }
            self.pending.remove(&tile);
            self.written.insert(tile);
        }
        Ok(tiles)
    }
}

// =============================================================================
// Tests
// =============================================================================
