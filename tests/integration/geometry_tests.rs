//! Tile geometry integration tests.
//!
//! Tests verify:
//! - Counts and regions for a plane whose last tiles overhang the image
//! - Index and region conversions round trip for every tile
//! - Coverage sets for tiled, stripped and planar planes
//! - Geometry fails cleanly once its directory is removed

use ome_tiling::{
    DirectoryRegistry, MemoryDirectory, PixelType, PlanarConfiguration, PlaneProperties,
    TileError, TileInfo,
};

use super::test_utils::{region, single_directory};

fn geometries() -> Vec<PlaneProperties> {
    vec![
        PlaneProperties::tiled(100, 80, 32, 32),
        PlaneProperties::tiled(64, 64, 16, 32)
            .with_samples(3, PlanarConfiguration::Contig)
            .with_pixel_type(PixelType::Uint16),
        PlaneProperties::tiled(70, 33, 16, 16).with_samples(4, PlanarConfiguration::Separate),
        PlaneProperties::stripped(50, 37, 8),
        PlaneProperties::stripped(13, 9, 4)
            .with_samples(2, PlanarConfiguration::Separate)
            .with_pixel_type(PixelType::Bit),
    ]
}

// =============================================================================
// Concrete Geometry
// =============================================================================

#[test]
fn test_overhanging_plane() {
    let (registry, handle) = single_directory(PlaneProperties::tiled(100, 80, 32, 32));
    let info = TileInfo::new(&registry, handle).unwrap();
    let image = region(0, 0, 100, 80);

    assert_eq!(info.tile_column_count(&registry).unwrap(), 4);
    assert_eq!(info.tile_row_count(&registry).unwrap(), 3);
    assert_eq!(info.tile_count(&registry).unwrap(), 12);
    assert_eq!(info.tile_region(&registry, 0, None).unwrap(), region(0, 0, 32, 32));
    assert_eq!(info.tile_region(&registry, 11, None).unwrap(), region(96, 64, 32, 32));
    assert_eq!(
        info.tile_region(&registry, 11, Some(&image)).unwrap(),
        region(96, 64, 4, 16)
    );
}

#[test]
fn test_buffer_sizes() {
    let sizes: Vec<usize> = geometries()
        .into_iter()
        .map(|props| {
            let (registry, handle) = single_directory(props);
            TileInfo::new(&registry, handle)
                .unwrap()
                .buffer_size(&registry)
                .unwrap()
        })
        .collect();
    // 32*32, 16*3*2*32, 16*16, 50*8, ceil(13/8)*4
    assert_eq!(sizes, vec![1024, 3072, 256, 400, 8]);
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_index_region_round_trip() {
    for props in geometries() {
        let (registry, handle) = single_directory(props);
        let info = TileInfo::new(&registry, handle).unwrap();

        for i in 0..info.tile_count(&registry).unwrap() {
            let tile = info.tile_region(&registry, i, None).unwrap();
            let sample = info.tile_sample(&registry, i).unwrap();
            assert_eq!(
                info.tile_index(&registry, tile.x, tile.y, sample).unwrap(),
                i,
                "tile {i} of {props:?}"
            );
        }
    }
}

#[test]
fn test_tiles_partition_the_image() {
    for props in geometries() {
        let (registry, handle) = single_directory(props);
        let info = TileInfo::new(&registry, handle).unwrap();
        let image = region(0, 0, props.image_width, props.image_height);

        let area: u64 = (0..info.tiles_per_plane(&registry).unwrap())
            .map(|i| info.tile_region(&registry, i, Some(&image)).unwrap().area())
            .sum();
        assert_eq!(area, image.area());

        let mut cover = info.tile_coverage(&registry, &image).unwrap();
        cover.sort_unstable();
        let all: Vec<u32> = (0..info.tile_count(&registry).unwrap()).collect();
        assert_eq!(cover, all);
    }
}

// =============================================================================
// Coverage Sets
// =============================================================================

#[test]
fn test_coverage_orders_samples_first() {
    let (registry, handle) = single_directory(
        PlaneProperties::tiled(64, 64, 32, 32).with_samples(2, PlanarConfiguration::Separate),
    );
    let info = TileInfo::new(&registry, handle).unwrap();

    assert_eq!(
        info.tile_coverage(&registry, &region(16, 40, 32, 8)).unwrap(),
        vec![2, 3, 6, 7]
    );
}

#[test]
fn test_coverage_of_point() {
    for props in geometries() {
        let (registry, handle) = single_directory(props);
        let info = TileInfo::new(&registry, handle).unwrap();
        let (x, y) = (props.image_width - 1, props.image_height - 1);

        let tiles = info.tile_coverage(&registry, &region(x, y, 1, 1)).unwrap();
        assert_eq!(tiles.len(), usize::from(props.sample_planes()));
        assert_eq!(tiles[0], info.tile_index(&registry, x, y, 0).unwrap());
    }
}

// =============================================================================
// Directory Lifetime
// =============================================================================

#[test]
fn test_geometry_after_directory_removed() {
    let mut registry = DirectoryRegistry::new();
    let handle = registry.insert(MemoryDirectory::new(PlaneProperties::tiled(8, 8, 4, 4)));
    let info = TileInfo::new(&registry, handle).unwrap();

    registry.remove(handle).unwrap();
    let replacement = registry.insert(MemoryDirectory::new(PlaneProperties::tiled(8, 8, 4, 4)));
    assert_eq!(replacement.index(), handle.index());

    assert_eq!(
        info.tile_count(&registry),
        Err(TileError::DirectoryGone(handle))
    );
    assert_eq!(
        info.tile_index(&registry, 0, 0, 0),
        Err(TileError::DirectoryGone(handle))
    );
    assert!(TileInfo::new(&registry, replacement).is_ok());
}
