//! Image directories and the registry that owns them.
//!
//! A [`Directory`] is the storage collaborator for one plane: it reports the
//! plane's static properties, maps pixels to native tile indices, and reads
//! or writes whole tiles. Directories live in a [`DirectoryRegistry`] and are
//! referred to by generation-checked [`DirectoryHandle`]s, so anything that
//! outlives a directory fails with [`TileError::DirectoryGone`] instead of
//! reaching freed state.
//!
//! # Example
//!
//! ```
//! use ome_tiling::tiff::{DirectoryRegistry, MemoryDirectory, PlaneProperties};
//!
//! let mut registry = DirectoryRegistry::new();
//! let handle = registry.insert(MemoryDirectory::new(PlaneProperties::tiled(100, 80, 32, 32)));
//!
//! assert!(registry.get(handle).is_ok());
//! registry.remove(handle).unwrap();
//! assert!(registry.get(handle).is_err());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tracing::debug;

use crate::error::{IoError, TileError};
use crate::pixel::{EndianType, PixelType};

use super::tags::{
    pixel_type_for, sample_format_for, PlanarConfiguration, SampleFormat, TiffTag, TileType,
};

// =============================================================================
// PlaneProperties
// =============================================================================

/// Static layout of one plane, as recorded in its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneProperties {
    /// Image width in pixels
    pub image_width: u32,

    /// Image height in pixels
    pub image_height: u32,

    /// Tile width in pixels (image width for strips)
    pub tile_width: u32,

    /// Tile height in pixels (rows per strip for strips)
    pub tile_height: u32,

    /// Number of samples per pixel
    pub samples_per_pixel: u16,

    /// Chunky or planar sample layout
    pub planar_configuration: PlanarConfiguration,

    /// Tiles or strips
    pub tile_type: TileType,

    /// Representation of each sample
    pub pixel_type: PixelType,

    /// Byte order of multi-byte samples in tile data
    pub endian: EndianType,
}

impl PlaneProperties {
    /// Single-sample `uint8` plane cut into tiles.
    pub fn tiled(image_width: u32, image_height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            tile_width,
            tile_height,
            samples_per_pixel: 1,
            planar_configuration: PlanarConfiguration::Contig,
            tile_type: TileType::Tile,
            pixel_type: PixelType::Uint8,
            endian: EndianType::Native,
        }
    }

    /// Single-sample `uint8` plane cut into full-width strips.
    pub fn stripped(image_width: u32, image_height: u32, rows_per_strip: u32) -> Self {
        Self {
            tile_type: TileType::Strip,
            ..Self::tiled(image_width, image_height, image_width, rows_per_strip)
        }
    }

    pub fn with_samples(mut self, samples_per_pixel: u16, planar: PlanarConfiguration) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.planar_configuration = planar;
        self
    }

    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    pub fn with_endian(mut self, endian: EndianType) -> Self {
        self.endian = endian;
        self
    }

    /// Check that the properties describe a usable tile grid.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::InvalidGeometry`] for zero sizes, zero samples,
    /// or strips narrower than the image.
    pub fn validate(&self) -> Result<(), TileError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(TileError::InvalidGeometry(format!(
                "image size {}x{} is empty",
                self.image_width, self.image_height
            )));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(TileError::InvalidGeometry(format!(
                "{} size {}x{} is empty",
                self.tile_type.name(),
                self.tile_width,
                self.tile_height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(TileError::InvalidGeometry(
                "samples per pixel must be greater than 0".to_string(),
            ));
        }
        if self.tile_type == TileType::Strip && self.tile_width != self.image_width {
            return Err(TileError::InvalidGeometry(format!(
                "strip width {} differs from image width {}",
                self.tile_width, self.image_width
            )));
        }
        if self.checked_tile_count().is_none() {
            return Err(TileError::InvalidGeometry(format!(
                "{}x{} {}s of {}x{} with {} sample planes exceed u32 indices",
                self.tiles_across(),
                self.tiles_down(),
                self.tile_type.name(),
                self.tile_width,
                self.tile_height,
                self.sample_planes()
            )));
        }
        Ok(())
    }

    fn checked_tile_count(&self) -> Option<u32> {
        self.tiles_across()
            .checked_mul(self.tiles_down())?
            .checked_mul(u32::from(self.sample_planes()))
    }

    /// Build the properties of a plane from its directory's tag values.
    ///
    /// `tag` returns the first value of a tag, or `None` if it is absent.
    /// Absent optional tags take their TIFF defaults; a plane without
    /// `TileWidth` is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::InvalidGeometry`] if the image size is missing,
    /// the sample format and bit depth have no pixel type, or the resulting
    /// geometry is invalid.
    pub fn from_tags(
        endian: EndianType,
        tag: impl Fn(TiffTag) -> Option<u32>,
    ) -> Result<Self, TileError> {
        let required = |t: TiffTag| {
            tag(t).ok_or_else(|| {
                TileError::InvalidGeometry(format!("missing tag {t:?} ({})", t.as_u16()))
            })
        };
        let short = |t: TiffTag, default: u16| -> Result<u16, TileError> {
            match tag(t) {
                None => Ok(default),
                Some(v) => u16::try_from(v).map_err(|_| {
                    TileError::InvalidGeometry(format!("tag {t:?} value {v} out of range"))
                }),
            }
        };

        let image_width = required(TiffTag::ImageWidth)?;
        let image_height = required(TiffTag::ImageLength)?;
        let bits = short(TiffTag::BitsPerSample, 1)?;
        let format = short(TiffTag::SampleFormat, SampleFormat::Uint.as_u16())?;
        let format = SampleFormat::from_u16(format).unwrap_or(SampleFormat::Void);
        let pixel_type = pixel_type_for(format, bits).ok_or_else(|| {
            TileError::InvalidGeometry(format!(
                "no pixel type for {} samples of {bits} bits",
                format.name()
            ))
        })?;
        let planar = short(TiffTag::PlanarConfiguration, PlanarConfiguration::Contig.as_u16())?;
        let planar = PlanarConfiguration::from_u16(planar).ok_or_else(|| {
            TileError::InvalidGeometry(format!("unknown planar configuration {planar}"))
        })?;

        let base = match tag(TiffTag::TileWidth) {
            Some(tile_width) => {
                Self::tiled(image_width, image_height, tile_width, required(TiffTag::TileLength)?)
            }
            None => {
                let rows = tag(TiffTag::RowsPerStrip).unwrap_or(image_height);
                Self::stripped(image_width, image_height, rows.min(image_height))
            }
        };
        let props = base
            .with_samples(short(TiffTag::SamplesPerPixel, 1)?, planar)
            .with_pixel_type(pixel_type)
            .with_endian(endian);
        props.validate()?;
        Ok(props)
    }

    /// Tag values describing this plane, as an encoder would record them.
    pub fn tags(&self) -> Vec<(TiffTag, u32)> {
        let (format, bits) = sample_format_for(self.pixel_type);
        let mut tags = vec![
            (TiffTag::ImageWidth, self.image_width),
            (TiffTag::ImageLength, self.image_height),
            (TiffTag::BitsPerSample, u32::from(bits)),
            (TiffTag::SamplesPerPixel, u32::from(self.samples_per_pixel)),
            (
                TiffTag::PlanarConfiguration,
                u32::from(self.planar_configuration.as_u16()),
            ),
            (TiffTag::SampleFormat, u32::from(format.as_u16())),
        ];
        match self.tile_type {
            TileType::Tile => {
                tags.push((TiffTag::TileWidth, self.tile_width));
                tags.push((TiffTag::TileLength, self.tile_height));
            }
            TileType::Strip => tags.push((TiffTag::RowsPerStrip, self.tile_height)),
        }
        tags
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.planar_configuration.is_planar()
    }

    /// Number of tile columns: `ceil(image_width / tile_width)`, or 0 for
    /// a zero tile width.
    pub fn tiles_across(&self) -> u32 {
        if self.tile_width == 0 {
            return 0;
        }
        self.image_width.div_ceil(self.tile_width)
    }

    /// Number of tile rows: `ceil(image_height / tile_height)`, or 0 for a
    /// zero tile height.
    pub fn tiles_down(&self) -> u32 {
        if self.tile_height == 0 {
            return 0;
        }
        self.image_height.div_ceil(self.tile_height)
    }

    /// Number of tiles covering one sample plane, saturating for grids that
    /// fail [`validate`](Self::validate).
    pub fn tiles_per_plane(&self) -> u32 {
        self.tiles_across().saturating_mul(self.tiles_down())
    }

    /// Number of separately stored sample planes (1 when chunky).
    pub fn sample_planes(&self) -> u16 {
        if self.is_planar() {
            self.samples_per_pixel
        } else {
            1
        }
    }

    /// Total number of tiles across all sample planes, saturating for grids
    /// that fail [`validate`](Self::validate).
    pub fn tile_count(&self) -> u32 {
        self.tiles_per_plane()
            .saturating_mul(u32::from(self.sample_planes()))
    }

    /// Samples stored in one tile row.
    pub fn row_samples(&self) -> usize {
        let per_pixel = if self.is_planar() {
            1
        } else {
            usize::from(self.samples_per_pixel)
        };
        self.tile_width as usize * per_pixel
    }

    /// Bytes in one tile row. Bit samples are packed and rows padded to a
    /// whole byte.
    pub fn row_bytes(&self) -> usize {
        match self.pixel_type {
            PixelType::Bit => self.row_samples().div_ceil(8),
            other => self.row_samples() * other.bytes(),
        }
    }

    /// Bytes in one decoded tile.
    pub fn tile_bytes(&self) -> usize {
        self.row_bytes() * self.tile_height as usize
    }
}

// =============================================================================
// Directory Trait
// =============================================================================

/// Storage collaborator for one plane.
///
/// All I/O is blocking. Tile data is exchanged in the plane's declared byte
/// order; implementations never byte-swap.
pub trait Directory {
    /// Static properties of the plane.
    fn properties(&self) -> PlaneProperties;

    /// Native linear index of the tile containing pixel `(x, y)` of `sample`.
    fn native_tile_index(&self, x: u32, y: u32, sample: u16) -> u32;

    /// Total number of tiles or strips.
    fn tile_count(&self) -> u32 {
        self.properties().tile_count()
    }

    /// Read one decoded tile.
    fn read_tile(&self, index: u32) -> Result<Bytes, IoError>;

    /// Write one decoded tile.
    fn write_tile(&mut self, index: u32, data: &[u8]) -> Result<(), IoError>;
}

// =============================================================================
// MemoryDirectory
// =============================================================================

/// A directory holding its tiles in memory.
///
/// Native addressing follows libtiff's `TIFFComputeTile` and
/// `TIFFComputeStrip`.
#[derive(Debug)]
pub struct MemoryDirectory {
    properties: PlaneProperties,
    tiles: Vec<Option<Bytes>>,
    reads: AtomicUsize,
    writes: usize,
    read_only: bool,
}

impl MemoryDirectory {
    pub fn new(properties: PlaneProperties) -> Self {
        Self {
            tiles: vec![None; properties.tile_count() as usize],
            properties,
            reads: AtomicUsize::new(0),
            writes: 0,
            read_only: false,
        }
    }

    /// Build a directory from existing tiles that rejects further writes.
    ///
    /// Missing trailing tiles are left unwritten.
    pub fn read_only(properties: PlaneProperties, tiles: Vec<Bytes>) -> Self {
        let mut directory = Self::new(properties);
        for (slot, tile) in directory.tiles.iter_mut().zip(tiles) {
            *slot = Some(tile);
        }
        directory.read_only = true;
        directory
    }

    /// Check if a tile has been written.
    pub fn contains_tile(&self, index: u32) -> bool {
        matches!(self.tiles.get(index as usize), Some(Some(_)))
    }

    /// Number of tiles written so far.
    pub fn written_tiles(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_some()).count()
    }

    /// Number of `read_tile` calls served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `write_tile` calls accepted.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check_index(&self, index: u32) -> Result<(), IoError> {
        let count = self.tiles.len() as u32;
        if index >= count {
            return Err(IoError::TileOutOfRange { index, count });
        }
        Ok(())
    }
}

impl Directory for MemoryDirectory {
    fn properties(&self) -> PlaneProperties {
        self.properties
    }

    fn native_tile_index(&self, x: u32, y: u32, sample: u16) -> u32 {
        let p = &self.properties;
        let sample_offset = if p.is_planar() {
            u32::from(sample) * p.tiles_per_plane()
        } else {
            0
        };
        match p.tile_type {
            TileType::Tile => {
                sample_offset + p.tiles_across() * (y / p.tile_height) + x / p.tile_width
            }
            TileType::Strip => sample_offset + y / p.tile_height,
        }
    }

    fn read_tile(&self, index: u32) -> Result<Bytes, IoError> {
        self.check_index(index)?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.tiles[index as usize]
            .clone()
            .ok_or(IoError::TileNotWritten(index))
    }

    fn write_tile(&mut self, index: u32, data: &[u8]) -> Result<(), IoError> {
        if self.read_only {
            return Err(IoError::ReadOnly);
        }
        self.check_index(index)?;
        let expected = self.properties.tile_bytes();
        if data.len() != expected {
            return Err(IoError::TileSize {
                index,
                expected,
                actual: data.len(),
            });
        }
        self.tiles[index as usize] = Some(Bytes::copy_from_slice(data));
        self.writes += 1;
        Ok(())
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Generation-checked reference to a directory in a [`DirectoryRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectoryHandle {
    index: u32,
    generation: u32,
}

impl DirectoryHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for DirectoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<D> {
    generation: u32,
    directory: Option<D>,
}

/// Arena owning the directories of an open image.
///
/// Removing a directory bumps its slot generation, so every outstanding
/// handle to it stops resolving even after the slot is reused.
#[derive(Debug)]
pub struct DirectoryRegistry<D> {
    slots: Vec<Slot<D>>,
    free: Vec<u32>,
}

impl<D: Directory> DirectoryRegistry<D> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Take ownership of a directory and return its handle.
    pub fn insert(&mut self, directory: D) -> DirectoryHandle {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.directory = Some(directory);
                DirectoryHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    directory: Some(directory),
                });
                DirectoryHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        debug!(%handle, "Registered directory");
        handle
    }

    /// Resolve a handle.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::DirectoryGone`] if the directory was removed.
    pub fn get(&self, handle: DirectoryHandle) -> Result<&D, TileError> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.directory.as_ref())
            .ok_or(TileError::DirectoryGone(handle))
    }

    pub fn get_mut(&mut self, handle: DirectoryHandle) -> Result<&mut D, TileError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.directory.as_mut())
            .ok_or(TileError::DirectoryGone(handle))
    }

    /// Remove a directory, invalidating every handle to it.
    pub fn remove(&mut self, handle: DirectoryHandle) -> Result<D, TileError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(TileError::DirectoryGone(handle))?;
        let directory = slot.directory.take().ok_or(TileError::DirectoryGone(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        debug!(%handle, "Removed directory");
        Ok(directory)
    }

    pub fn contains(&self, handle: DirectoryHandle) -> bool {
        self.get(handle).is_ok()
    }

    /// Number of live directories.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D: Directory> Default for DirectoryRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
