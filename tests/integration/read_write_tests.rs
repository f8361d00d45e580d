//! Plane writer and reader integration tests.
//!
//! Tests verify:
//! - Planes written region by region in any order read back unchanged
//! - Planar and strip layouts, big-endian samples and mixed storage orders
//! - Directory failures surface unchanged through [`TileError::Io`]
//! - Cached tiles follow invalidation and handle generations

use bytes::Bytes;

use ome_tiling::error::IoError;
use ome_tiling::{
    make_storage_order, region_shape, DimensionOrder, Directory, DirectoryRegistry, EndianType,
    MemoryDirectory, Pixel, PixelType, PlanarConfiguration, PlaneProperties, PlaneReader,
    PlaneRegion, PlaneWriter, TileError, TileInfo, TilingConfig, VariantPixelBuffer,
};

use super::test_utils::{init_tracing, region, single_directory, FailingDirectory, Lcg};

// =============================================================================
// Helpers
// =============================================================================

/// Allocate a buffer for `region` and fill every sample from `f(x, y, s)`,
/// with coordinates relative to the plane.
fn buffer_for<T: Pixel>(
    region: &PlaneRegion,
    samples: u16,
    pixel_type: PixelType,
    interleaved: bool,
    f: impl Fn(u32, u32, u16) -> T,
) -> VariantPixelBuffer<'static> {
    let order = make_storage_order(DimensionOrder::XYZTC, interleaved);
    let mut buffer = VariantPixelBuffer::new(region_shape(region, samples), pixel_type, &order)
        .expect("valid buffer shape");
    for y in 0..region.h {
        for x in 0..region.w {
            for s in 0..samples {
                let indices = [x as usize, y as usize, 0, 0, 0, usize::from(s), 0, 0, 0];
                *buffer.at_mut::<T>(&indices).expect("index in range") =
                    f(region.x + x, region.y + y, s);
            }
        }
    }
    buffer
}

fn empty_buffer(
    region: &PlaneRegion,
    samples: u16,
    pixel_type: PixelType,
) -> VariantPixelBuffer<'static> {
    VariantPixelBuffer::with_default_order(region_shape(region, samples), pixel_type)
        .expect("valid buffer shape")
}

fn gradient(x: u32, y: u32, _s: u16) -> u8 {
    ((x * 7 + y * 13) % 251) as u8
}

fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = Lcg::new(seed);
    for i in (1..items.len()).rev() {
        items.swap(i, rng.next_u32(i as u32 + 1) as usize);
    }
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_tiles_written_out_of_order_read_back() {
    init_tracing();
    let props = PlaneProperties::tiled(100, 80, 16, 16);
    let (mut registry, handle) = single_directory(props);
    let plane = region(0, 0, 100, 80);

    let info = TileInfo::new(&registry, handle).unwrap();
    let mut tiles: Vec<u32> = (0..info.tile_count(&registry).unwrap()).collect();
    shuffle(&mut tiles, 99);

    let mut writer = PlaneWriter::new(&registry, handle, &TilingConfig::default()).unwrap();
    for &tile in &tiles {
        let r = info.tile_region(&registry, tile, Some(&plane)).unwrap();
        let buffer = buffer_for(&r, 1, PixelType::Uint8, true, gradient);
        // each clipped tile is complete as soon as it is written
        assert_eq!(writer.write_region(&mut registry, &r, &buffer).unwrap(), vec![tile]);
    }

    assert!(writer.is_complete());
    assert!(writer.pending_tiles().is_empty());
    assert_eq!(writer.written_tiles(), (0..35).collect::<Vec<u32>>());
    assert!(writer.flush(&mut registry).unwrap().is_empty());
    assert!(writer.coverage(0).unwrap().covered(&plane));

    let mut reader = PlaneReader::default();
    let mut whole = empty_buffer(&plane, 1, PixelType::Uint8);
    reader.read_region(&registry, handle, &plane, &mut whole).unwrap();
    assert_eq!(whole, buffer_for(&plane, 1, PixelType::Uint8, true, gradient));

    let sub = region(30, 30, 45, 20);
    let mut part = empty_buffer(&sub, 1, PixelType::Uint8);
    reader.read_region(&registry, handle, &sub, &mut part).unwrap();
    assert_eq!(part, buffer_for(&sub, 1, PixelType::Uint8, true, gradient));
}

#[test]
fn test_planar_big_endian_round_trip() {
    init_tracing();
    let props = PlaneProperties::tiled(40, 30, 16, 16)
        .with_samples(3, PlanarConfiguration::Separate)
        .with_pixel_type(PixelType::Uint16)
        .with_endian(EndianType::Big);
    let (mut registry, handle) = single_directory(props);
    let plane = region(0, 0, 40, 30);
    let value = |x: u32, y: u32, s: u16| (u32::from(s) * 10_000 + y * 100 + x) as u16;

    let mut writer = PlaneWriter::new(&registry, handle, &TilingConfig::default()).unwrap();
    for (y, h) in [(0, 7), (7, 7), (14, 7), (21, 7), (28, 2)] {
        let band = region(0, y, 40, h);
        let buffer = buffer_for(&band, 3, PixelType::Uint16, false, value);
        writer.write_region(&mut registry, &band, &buffer).unwrap();
    }
    assert!(writer.is_complete());
    assert_eq!(writer.written_tiles(), (0..18).collect::<Vec<u32>>());

    let dir = registry.get(handle).unwrap();
    // sample 1 starts at tile 6, after the six tiles of sample 0
    assert_eq!(
        dir.read_tile(6).unwrap().slice(0..2),
        Bytes::copy_from_slice(&value(0, 0, 1).to_be_bytes())
    );
    assert_eq!(dir.read_tile(0).unwrap().len(), 16 * 16 * 2);

    let mut reader = PlaneReader::default();
    let mut read = empty_buffer(&plane, 3, PixelType::Uint16);
    reader.read_region(&registry, handle, &plane, &mut read).unwrap();
    assert_eq!(read, buffer_for(&plane, 3, PixelType::Uint16, true, value));
}

#[test]
fn test_strip_plane_round_trip() {
    let props = PlaneProperties::stripped(50, 23, 5).with_samples(2, PlanarConfiguration::Contig);
    let (mut registry, handle) = single_directory(props);
    let plane = region(0, 0, 50, 23);
    let value = |x: u32, y: u32, s: u16| gradient(x, y, s).wrapping_add(100 * s as u8);

    let mut writer = PlaneWriter::new(&registry, handle, &TilingConfig::default()).unwrap();
    let mut completed = Vec::new();
    for y in (0..23).rev() {
        let row = region(0, y, 50, 1);
        let buffer = buffer_for(&row, 2, PixelType::Uint8, true, value);
        completed.extend(writer.write_region(&mut registry, &row, &buffer).unwrap());
    }
    // the short last strip completes first
    assert_eq!(completed, vec![4, 3, 2, 1, 0]);
    assert!(writer.is_complete());

    let mut reader = PlaneReader::default();
    let mut read = empty_buffer(&plane, 2, PixelType::Uint8);
    reader.read_region(&registry, handle, &plane, &mut read).unwrap();
    assert_eq!(read, buffer_for(&plane, 2, PixelType::Uint8, false, value));
}

#[test]
fn test_pixel_writes_without_coalescing() {
    let config =
        TilingConfig::from_json(r#"{"coverage_backend": "linear", "coalesce": false}"#).unwrap();
    let (mut registry, handle) = single_directory(PlaneProperties::tiled(4, 4, 2, 2));
    let plane = region(0, 0, 4, 4);

    let mut pixels: Vec<PlaneRegion> = (0..16).map(|i| region(i % 4, i / 4, 1, 1)).collect();
    shuffle(&mut pixels, 5);

    let mut writer = PlaneWriter::new(&registry, handle, &config).unwrap();
    let mut completed = Vec::new();
    for pixel in &pixels {
        let buffer = buffer_for(pixel, 1, PixelType::Uint8, true, gradient);
        completed.extend(writer.write_region(&mut registry, pixel, &buffer).unwrap());
    }
    completed.sort_unstable();
    assert_eq!(completed, vec![0, 1, 2, 3]);
    assert_eq!(writer.coverage(0).unwrap().size(), 16);
    assert!(writer.is_complete());

    let mut read = empty_buffer(&plane, 1, PixelType::Uint8);
    PlaneReader::from_config(&config)
        .read_region(&registry, handle, &plane, &mut read)
        .unwrap();
    assert_eq!(read, buffer_for(&plane, 1, PixelType::Uint8, true, gradient));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_directory_failures_propagate() {
    let props = PlaneProperties::tiled(8, 8, 4, 4);
    let tile = region(0, 0, 4, 4);

    // one call allowed: loading the tile succeeds, storing it fails
    let mut registry = DirectoryRegistry::new();
    let handle = registry.insert(FailingDirectory::new(props, 1));
    let mut writer = PlaneWriter::new(&registry, handle, &TilingConfig::default()).unwrap();
    let buffer = buffer_for(&tile, 1, PixelType::Uint8, true, gradient);
    assert_eq!(
        writer.write_region(&mut registry, &tile, &buffer),
        Err(TileError::Io(IoError::Backend("simulated failure".to_string())))
    );

    let mut registry = DirectoryRegistry::new();
    let handle = registry.insert(FailingDirectory::new(props, 0));
    let mut read = empty_buffer(&tile, 1, PixelType::Uint8);
    assert_eq!(
        PlaneReader::default().read_region(&registry, handle, &tile, &mut read),
        Err(TileError::Io(IoError::Backend("simulated failure".to_string())))
    );
}

#[test]
fn test_reading_unwritten_tile_fails() {
    let (registry, handle) = single_directory(PlaneProperties::tiled(4, 4, 2, 2));
    let r = region(1, 1, 2, 2);
    let mut read = empty_buffer(&r, 1, PixelType::Uint8);
    assert_eq!(
        PlaneReader::default().read_region(&registry, handle, &r, &mut read),
        Err(TileError::Io(IoError::TileNotWritten(0)))
    );
}

// =============================================================================
// Caching
// =============================================================================

#[test]
fn test_reader_invalidate_after_rewrite() {
    let (mut registry, handle) = single_directory(PlaneProperties::tiled(4, 4, 2, 2));
    let plane = region(0, 0, 4, 4);
    let config = TilingConfig::default();

    let ones = buffer_for(&plane, 1, PixelType::Uint8, true, |_, _, _| 1u8);
    let twos = buffer_for(&plane, 1, PixelType::Uint8, true, |_, _, _| 2u8);

    PlaneWriter::new(&registry, handle, &config)
        .unwrap()
        .write_region(&mut registry, &plane, &ones)
        .unwrap();

    let mut reader = PlaneReader::from_config(&config);
    let mut read = empty_buffer(&plane, 1, PixelType::Uint8);
    reader.read_region(&registry, handle, &plane, &mut read).unwrap();
    assert_eq!(read, ones);
    assert_eq!(reader.cache().len(), 4);

    PlaneWriter::new(&registry, handle, &config)
        .unwrap()
        .write_region(&mut registry, &plane, &twos)
        .unwrap();

    // stale until invalidated
    reader.read_region(&registry, handle, &plane, &mut read).unwrap();
    assert_eq!(read, ones);

    assert_eq!(reader.invalidate(handle), 4);
    reader.read_region(&registry, handle, &plane, &mut read).unwrap();
    assert_eq!(read, twos);
}

#[test]
fn test_cache_ignores_reused_slot() {
    let props = PlaneProperties::tiled(2, 2, 2, 2);
    let plane = region(0, 0, 2, 2);
    let mut registry = DirectoryRegistry::new();
    let old = registry.insert(MemoryDirectory::read_only(props, vec![Bytes::from_static(&[1; 4])]));

    let mut reader = PlaneReader::default();
    let mut read = empty_buffer(&plane, 1, PixelType::Uint8);
    reader.read_region(&registry, old, &plane, &mut read).unwrap();

    registry.remove(old).unwrap();
    let new = registry.insert(MemoryDirectory::read_only(props, vec![Bytes::from_static(&[9; 4])]));
    assert_eq!(new.index(), old.index());
    assert_ne!(new, old);

    assert_eq!(
        reader.read_region(&registry, old, &plane, &mut read),
        Err(TileError::DirectoryGone(old))
    );
    reader.read_region(&registry, new, &plane, &mut read).unwrap();
    assert_eq!(read.data::<u8>().unwrap(), &[9; 4]);
}
