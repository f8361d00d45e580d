//! Coverage tracker integration tests.
//!
//! Every property is checked against both the grid and the linear index.
//!
//! Tests verify:
//! - Separate regions stay separate, edge-sharing regions coalesce
//! - Re-inserting covered regions never grows the tracker
//! - A plane filled tile by tile in any order collapses to one region
//! - Both backends agree on random workloads

use ome_tiling::{CoverageBackend, PlaneRegion, TileCoverage, TilingConfig};

use super::test_utils::{coverage_backends, init_tracing, region, Lcg};

// =============================================================================
// Pairwise Properties
// =============================================================================

#[test]
fn test_separate_regions_stay_separate() {
    let pairs = [
        (region(0, 0, 10, 10), region(20, 0, 10, 10)),
        (region(0, 0, 10, 10), region(10, 10, 10, 10)),
        (region(0, 0, 10, 10), region(10, 5, 10, 10)),
        (region(5, 5, 3, 3), region(0, 9, 20, 1)),
    ];
    for (name, mut coverage) in coverage_backends() {
        for (a, b) in pairs {
            coverage.clear();
            assert!(coverage.insert(a, true));
            assert!(coverage.insert(b, true));
            assert_eq!(coverage.size(), 2, "{name}: {a} and {b}");
        }
    }
}

#[test]
fn test_edge_sharing_regions_coalesce() {
    let pairs = [
        (region(0, 0, 10, 10), region(10, 0, 10, 10)),
        (region(10, 0, 10, 10), region(0, 0, 10, 10)),
        (region(3, 0, 7, 4), region(3, 4, 7, 9)),
        (region(3, 4, 7, 9), region(3, 0, 7, 4)),
    ];
    for (name, mut coverage) in coverage_backends() {
        for (a, b) in pairs {
            coverage.clear();
            coverage.insert(a, true);
            coverage.insert(b, true);
            assert_eq!(coverage.size(), 1, "{name}: {a} and {b}");
            assert!(coverage.covered(&a.union(&b)), "{name}: {a} and {b}");
        }
    }
}

#[test]
fn test_concrete_coalesce() {
    for (name, mut coverage) in coverage_backends() {
        coverage.insert(region(0, 0, 10, 10), true);
        coverage.insert(region(10, 0, 10, 10), true);
        assert_eq!(coverage.regions(), vec![region(0, 0, 20, 10)], "{name}");
    }
}

#[test]
fn test_reinsert_is_idempotent() {
    let regions = [region(0, 0, 10, 10), region(4, 4, 2, 2), region(50, 50, 1, 1)];
    for (name, mut coverage) in coverage_backends() {
        for r in regions {
            coverage.insert(r, false);
        }
        let size = coverage.size();
        for r in regions {
            for coalesce in [true, false] {
                assert!(!coverage.insert(r, coalesce), "{name}: {r}");
                assert_eq!(coverage.size(), size, "{name}: {r}");
                assert_eq!(coverage.coverage(&r), r.area(), "{name}: {r}");
            }
        }
    }
}

// =============================================================================
// Plane Filling
// =============================================================================

#[test]
fn test_row_major_fill_collapses() {
    init_tracing();
    let plane = region(0, 0, 160, 96);
    for (name, mut coverage) in coverage_backends() {
        for row in 0..6 {
            for col in 0..10 {
                assert!(coverage.insert(region(col * 16, row * 16, 16, 16), true), "{name}");
            }
            assert_eq!(coverage.size(), 1, "{name}: row {row}");
        }
        assert_eq!(coverage.regions(), vec![plane], "{name}");
    }
}

#[test]
fn test_fill_in_any_order() {
    let plane = region(0, 0, 160, 96);
    let mut tiles: Vec<PlaneRegion> = (0..6)
        .flat_map(|row| (0..10).map(move |col| region(col * 16, row * 16, 16, 16)))
        .collect();

    let mut rng = Lcg::new(7);
    for i in (1..tiles.len()).rev() {
        tiles.swap(i, rng.next_u32(i as u32 + 1) as usize);
    }

    for (name, mut coverage) in coverage_backends() {
        for (i, tile) in tiles.iter().enumerate() {
            assert!(!coverage.covered(&plane), "{name}");
            assert!(coverage.insert(*tile, true), "{name}: {tile}");
            assert_eq!(coverage.coverage(&plane), 256 * (i as u64 + 1), "{name}");
        }
        assert!(coverage.covered(&plane), "{name}");
        assert!(coverage.size() <= tiles.len(), "{name}");
        for tile in &tiles {
            assert!(!coverage.insert(*tile, true), "{name}: {tile}");
        }
    }
}

#[test]
fn test_strip_by_strip_fill() {
    for (name, mut coverage) in coverage_backends() {
        for row in 0..100 {
            coverage.insert(region(0, row * 3, 512, 3), true);
            assert_eq!(coverage.size(), 1, "{name}");
        }
        assert_eq!(coverage.regions(), vec![region(0, 0, 512, 300)], "{name}");
    }
}

// =============================================================================
// Backend Agreement
// =============================================================================

#[test]
fn test_backends_agree_without_coalescing() {
    let mut rng = Lcg::new(42);
    let mut grid = TileCoverage::from_config(&TilingConfig {
        coverage_backend: CoverageBackend::Grid,
        grid_cell_size: 8,
        ..TilingConfig::default()
    });
    let mut linear = TileCoverage::new(CoverageBackend::Linear, 0);

    for step in 0..300 {
        let r = random_region(&mut rng);
        assert_eq!(grid.insert(r, false), linear.insert(r, false), "step {step}: {r}");

        if step % 17 == 0 {
            if let Some(existing) = linear.regions().first().copied() {
                assert!(linear.remove(&existing));
                assert!(grid.remove(&existing), "step {step}: {existing}");
            }
        }

        let probe = random_probe(&mut rng);
        assert_eq!(grid.coverage(&probe), linear.coverage(&probe), "step {step}: {probe}");
        assert_eq!(grid.size(), linear.size(), "step {step}");
    }

    let mut from_grid = grid.regions();
    let mut from_linear = linear.regions();
    from_grid.sort_by_key(|r| (r.y, r.x, r.w, r.h));
    from_linear.sort_by_key(|r| (r.y, r.x, r.w, r.h));
    assert_eq!(from_grid, from_linear);
}

#[test]
fn test_backends_agree_on_coverage() {
    let mut rng = Lcg::new(1234);
    let mut grid = TileCoverage::grid(4);
    let mut linear = TileCoverage::linear();

    for step in 0..300 {
        let r = random_region(&mut rng);
        // merge order may differ between backends, the covered pixels may not
        assert_eq!(grid.insert(r, true), linear.insert(r, true), "step {step}: {r}");

        let probe = random_probe(&mut rng);
        assert_eq!(grid.coverage(&probe), linear.coverage(&probe), "step {step}: {probe}");
        assert_eq!(grid.covered(&probe), linear.covered(&probe), "step {step}: {probe}");
    }
}

/// Region on a 4 pixel lattice, so that neighbours often share edges.
fn random_region(rng: &mut Lcg) -> PlaneRegion {
    region(
        rng.next_u32(60) / 4 * 4,
        rng.next_u32(60) / 4 * 4,
        (rng.next_u32(4) + 1) * 4,
        (rng.next_u32(4) + 1) * 4,
    )
}

fn random_probe(rng: &mut Lcg) -> PlaneRegion {
    region(
        rng.next_u32(64),
        rng.next_u32(64),
        rng.next_u32(16) + 1,
        rng.next_u32(16) + 1,
    )
}
