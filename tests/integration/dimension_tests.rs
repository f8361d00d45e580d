//! Coordinate space integration tests.
//!
//! Tests verify:
//! - Fresh spaces have the identity storage order and zero base
//! - Nested subranges compose into one absolute crop
//! - Descending axes map logical order onto reversed storage

use ome_tiling::{
    Dimension, DimensionError, DimensionSpace, Direction, IndexedDimensionStorage,
    IndexedDimensionSubrange, NamedDimensionStorage, NamedDimensionSubrange,
};

fn space(extents: &[(&str, usize)]) -> DimensionSpace {
    let dimensions = extents
        .iter()
        .map(|(name, extent)| Dimension::new(*name, *extent).unwrap())
        .collect();
    DimensionSpace::new(dimensions).unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_identity_storage_order() {
    for extents in [
        vec![("X", 1)],
        vec![("X", 64), ("Y", 32)],
        vec![("X", 3), ("Y", 4), ("Z", 5), ("T", 6), ("C", 7)],
    ] {
        let space = space(&extents);
        assert_eq!(space.base(), 0);
        for (i, entry) in space.storage_order().iter().enumerate() {
            assert_eq!(entry.index, i);
            assert_eq!(entry.direction, Direction::Ascending);
        }
    }
}

#[test]
fn test_construction_errors() {
    assert!(matches!(
        Dimension::new("X", 0),
        Err(DimensionError::ZeroExtent { .. })
    ));

    let duplicate = vec![Dimension::new("X", 2).unwrap(), Dimension::new("X", 3).unwrap()];
    assert_eq!(
        DimensionSpace::new(duplicate).unwrap_err(),
        DimensionError::DuplicateName("X".to_string())
    );

    let mut space = space(&[("X", 2), ("Y", 3)]);
    assert!(matches!(
        space.set_storage_order(vec![IndexedDimensionStorage::ascending(0)]),
        Err(DimensionError::StorageOrderLength { .. })
    ));
    assert_eq!(
        space.set_storage_order(vec![
            IndexedDimensionStorage::ascending(1),
            IndexedDimensionStorage::ascending(1),
        ]),
        Err(DimensionError::DuplicateIndex(1))
    );
    assert!(matches!(
        space.set_named_storage_order(&[
            NamedDimensionStorage::new("X", Direction::Ascending),
            NamedDimensionStorage::new("Q", Direction::Ascending),
        ]),
        Err(DimensionError::UnknownName(_))
    ));
}

// =============================================================================
// Subranges
// =============================================================================

#[test]
fn test_nested_subranges_compose() {
    let full = space(&[("X", 100), ("Y", 50)]);

    let nested = full
        .subrange(&[IndexedDimensionSubrange::new(0, 10, 90)])
        .unwrap()
        .subrange(&[IndexedDimensionSubrange::new(0, 5, 20)])
        .unwrap();
    let direct = full
        .subrange(&[IndexedDimensionSubrange::new(0, 15, 30)])
        .unwrap();

    let (a, b) = (nested.dimension(0).unwrap(), direct.dimension(0).unwrap());
    assert_eq!((a.begin(), a.end()), (15, 30));
    assert_eq!((a.begin(), a.end()), (b.begin(), b.end()));
    assert_eq!(nested.num_elements(), direct.num_elements());
    assert_eq!(
        nested.storage_index(&[0, 0]).unwrap(),
        full.storage_index(&[15, 0]).unwrap()
    );
}

#[test]
fn test_named_subrange_rejects_growth() {
    let full = space(&[("X", 100), ("Y", 50)]);
    let crop = full
        .named_subrange(&[NamedDimensionSubrange::new("Y", 10, 20)])
        .unwrap();

    assert!(matches!(
        crop.named_subrange(&[NamedDimensionSubrange::new("Y", 0, 11)]),
        Err(DimensionError::InvalidSubrange { .. })
    ));
    assert!(matches!(
        crop.subrange(&[
            IndexedDimensionSubrange::new(0, 0, 1),
            IndexedDimensionSubrange::new(0, 1, 2),
        ]),
        Err(DimensionError::DuplicateIndex(0))
    ));
}

// =============================================================================
// Descending Axes
// =============================================================================

#[test]
fn test_descending_single_axis() {
    for n in [1usize, 2, 7, 128] {
        let dimensions = vec![Dimension::new("X", n).unwrap()];
        let space = DimensionSpace::with_storage_order(
            dimensions,
            vec![IndexedDimensionStorage::descending(0)],
        )
        .unwrap();
        let stride = space.storage_stride(0).unwrap().unsigned_abs();

        assert_eq!(space.storage_index(&[0]).unwrap(), (n - 1) * stride);
        assert_eq!(space.storage_index(&[n - 1]).unwrap(), 0);
    }
}

#[test]
fn test_storage_coord_inverts_storage_index() {
    let dimensions = vec![
        Dimension::new("X", 4).unwrap(),
        Dimension::new("Y", 3).unwrap(),
        Dimension::new("C", 2).unwrap(),
    ];
    let space = DimensionSpace::with_storage_order(
        dimensions,
        vec![
            IndexedDimensionStorage::ascending(2),
            IndexedDimensionStorage::descending(0),
            IndexedDimensionStorage::ascending(1),
        ],
    )
    .unwrap();

    for i in 0..space.num_elements() {
        let coord = space.logical_coord(i).unwrap();
        let offset = space.storage_index(&coord).unwrap();
        assert_eq!(space.storage_coord(offset).unwrap(), coord);
    }
}
