//! Coverage tracking for partially read or written planes.
//!
//! [`TileCoverage`] records which parts of a plane have been transferred and
//! answers whether a region is fully covered. Regions live in a
//! [`CoverageIndex`]; two interchangeable backends are provided:
//!
//! - [`GridIndex`]: uniform-grid spatial index, the default
//! - [`LinearIndex`]: plain list scanned on every query
//!
//! Both return the same answers for every operation; only the cost differs.
//!
//! # Coalescing
//!
//! With coalescing enabled, an inserted region is merged with every indexed
//! region it shares a full edge with, repeatedly, so a plane filled tile by
//! tile or strip by strip collapses into a handful of rectangles.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::config::{CoverageBackend, TilingConfig, DEFAULT_GRID_CELL_SIZE};

use super::region::PlaneRegion;

// =============================================================================
// CoverageIndex Trait
// =============================================================================

/// Storage for the regions of one [`TileCoverage`].
pub trait CoverageIndex: fmt::Debug + Send {
    /// Add a region. Duplicates are kept.
    fn insert(&mut self, region: PlaneRegion);

    /// Remove one region equal to `region`. Returns whether one was found.
    fn remove(&mut self, region: &PlaneRegion) -> bool;

    /// Regions whose closed bounds meet the closed bounds of `region`.
    fn query_touching(&self, region: &PlaneRegion) -> Vec<PlaneRegion>;

    /// Regions sharing positive area with `region`.
    fn query_intersecting(&self, region: &PlaneRegion) -> Vec<PlaneRegion>;

    /// Number of indexed regions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Snapshot of every indexed region.
    fn regions(&self) -> Vec<PlaneRegion>;
}

// =============================================================================
// LinearIndex
// =============================================================================

/// Coverage index that scans every region on each query.
#[derive(Debug, Default, Clone)]
pub struct LinearIndex {
    regions: Vec<PlaneRegion>,
}

impl LinearIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoverageIndex for LinearIndex {
    fn insert(&mut self, region: PlaneRegion) {
        self.regions.push(region);
    }

    fn remove(&mut self, region: &PlaneRegion) -> bool {
        match self.regions.iter().position(|r| r == region) {
            Some(pos) => {
                self.regions.remove(pos);
                true
            }
            None => false,
        }
    }

    fn query_touching(&self, region: &PlaneRegion) -> Vec<PlaneRegion> {
        self.regions
            .iter()
            .filter(|r| r.touches(region))
            .copied()
            .collect()
    }

    fn query_intersecting(&self, region: &PlaneRegion) -> Vec<PlaneRegion> {
        self.regions
            .iter()
            .filter(|r| r.overlaps(region))
            .copied()
            .collect()
    }

    fn len(&self) -> usize {
        self.regions.len()
    }

    fn clear(&mut self) {
        self.regions.clear();
    }

    fn regions(&self) -> Vec<PlaneRegion> {
        self.regions.clone()
    }
}

// =============================================================================
// GridIndex
// =============================================================================

/// Regions spanning more cells than this are kept outside the grid.
const LARGE_REGION_CELLS: u64 = 1024;

/// Queries spanning more cells than this scan every region instead.
const MAX_QUERY_CELLS: u64 = 4096;

type Cell = (u64, u64);

/// Inclusive cell range `(x0, y0, x1, y1)` touched by the closed bounds of a
/// region.
fn cell_range(region: &PlaneRegion, cell_size: u32) -> (u64, u64, u64, u64) {
    let size = u64::from(cell_size);
    (
        u64::from(region.x) / size,
        u64::from(region.y) / size,
        region.right() / size,
        region.bottom() / size,
    )
}

fn cell_span(range: (u64, u64, u64, u64)) -> u64 {
    let (x0, y0, x1, y1) = range;
    (x1 - x0 + 1).saturating_mul(y1 - y0 + 1)
}

/// Coverage index bucketing regions into square cells.
///
/// A region is registered in every cell its closed bounds touch, so regions
/// sharing only an edge are found from either side. Very large regions are
/// kept in a separate list that every query scans.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: u32,
    slots: Vec<Option<PlaneRegion>>,
    free: Vec<usize>,
    cells: HashMap<Cell, Vec<usize>>,
    large: Vec<usize>,
    count: usize,
}

impl GridIndex {
    /// Create an empty grid. A zero cell size is treated as 1.
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            slots: Vec::new(),
            free: Vec::new(),
            cells: HashMap::new(),
            large: Vec::new(),
            count: 0,
        }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    fn for_each_cell(range: (u64, u64, u64, u64), mut f: impl FnMut(Cell)) {
        let (x0, y0, x1, y1) = range;
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                f((cx, cy));
            }
        }
    }

    /// Slot ids that may match `region`, sorted and unique.
    fn candidates(&self, region: &PlaneRegion) -> Vec<usize> {
        let range = cell_range(region, self.cell_size);
        let mut ids: Vec<usize> = if cell_span(range) > MAX_QUERY_CELLS {
            (0..self.slots.len())
                .filter(|&id| self.slots[id].is_some())
                .collect()
        } else {
            let mut ids = self.large.clone();
            Self::for_each_cell(range, |cell| {
                if let Some(bucket) = self.cells.get(&cell) {
                    ids.extend_from_slice(bucket);
                }
            });
            ids
        };
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn query(&self, region: &PlaneRegion, keep: impl Fn(&PlaneRegion) -> bool) -> Vec<PlaneRegion> {
        self.candidates(region)
            .into_iter()
            .filter_map(|id| self.slots[id])
            .filter(|r| keep(r))
            .collect()
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_CELL_SIZE)
    }
}

impl CoverageIndex for GridIndex {
    fn insert(&mut self, region: PlaneRegion) {
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(region);
                id
            }
            None => {
                self.slots.push(Some(region));
                self.slots.len() - 1
            }
        };

        let range = cell_range(&region, self.cell_size);
        if cell_span(range) > LARGE_REGION_CELLS {
            self.large.push(id);
        } else {
            let cells = &mut self.cells;
            Self::for_each_cell(range, |cell| cells.entry(cell).or_default().push(id));
        }
        self.count += 1;
    }

    fn remove(&mut self, region: &PlaneRegion) -> bool {
        let Some(id) = self
            .candidates(region)
            .into_iter()
            .find(|&id| self.slots[id].as_ref() == Some(region))
        else {
            return false;
        };

        let range = cell_range(region, self.cell_size);
        if cell_span(range) > LARGE_REGION_CELLS {
            self.large.retain(|&other| other != id);
        } else {
            let cells = &mut self.cells;
            Self::for_each_cell(range, |cell| {
                if let Some(bucket) = cells.get_mut(&cell) {
                    bucket.retain(|&other| other != id);
                    if bucket.is_empty() {
                        cells.remove(&cell);
                    }
                }
            });
        }
        self.slots[id] = None;
        self.free.push(id);
        self.count -= 1;
        true
    }

    fn query_touching(&self, region: &PlaneRegion) -> Vec<PlaneRegion> {
        self.query(region, |r| r.touches(region))
    }

    fn query_intersecting(&self, region: &PlaneRegion) -> Vec<PlaneRegion> {
        self.query(region, |r| r.overlaps(region))
    }

    fn len(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.cells.clear();
        self.large.clear();
        self.count = 0;
    }

    fn regions(&self) -> Vec<PlaneRegion> {
        self.slots.iter().flatten().copied().collect()
    }
}

// =============================================================================
// TileCoverage
// =============================================================================

/// Area of the union of `regions`.
///
/// Sweeps vertical slabs between consecutive x edges and merges the y
/// intervals of the regions spanning each slab.
fn union_area(regions: &[PlaneRegion]) -> u64 {
    let mut xs: Vec<u64> = regions
        .iter()
        .flat_map(|r| [u64::from(r.x), r.right()])
        .collect();
    xs.sort_unstable();
    xs.dedup();

    let mut area = 0;
    let mut spans: Vec<(u64, u64)> = Vec::with_capacity(regions.len());
    for slab in xs.windows(2) {
        let (left, right) = (slab[0], slab[1]);
        spans.clear();
        spans.extend(
            regions
                .iter()
                .filter(|r| u64::from(r.x) <= left && r.right() >= right)
                .map(|r| (u64::from(r.y), r.bottom())),
        );
        spans.sort_unstable();

        let mut covered = 0;
        let mut current: Option<(u64, u64)> = None;
        for &(top, bottom) in &spans {
            current = match current {
                Some((start, end)) if top <= end => Some((start, end.max(bottom))),
                Some((start, end)) => {
                    covered += end - start;
                    Some((top, bottom))
                }
                None => Some((top, bottom)),
            };
        }
        if let Some((start, end)) = current {
            covered += end - start;
        }
        area += covered * (right - left);
    }
    area
}

/// Set of covered regions of one plane.
///
/// Not internally synchronized; each plane owns its own tracker.
#[derive(Debug)]
pub struct TileCoverage {
    index: Box<dyn CoverageIndex>,
}

impl TileCoverage {
    /// Create an empty tracker with the given backend.
    pub fn new(backend: CoverageBackend, cell_size: u32) -> Self {
        match backend {
            CoverageBackend::Grid => Self::grid(cell_size),
            CoverageBackend::Linear => Self::linear(),
        }
    }

    /// Create an empty tracker backed by a [`GridIndex`].
    pub fn grid(cell_size: u32) -> Self {
        Self::with_index(Box::new(GridIndex::new(cell_size)))
    }

    /// Create an empty tracker backed by a [`LinearIndex`].
    pub fn linear() -> Self {
        Self::with_index(Box::new(LinearIndex::new()))
    }

    pub fn with_index(index: Box<dyn CoverageIndex>) -> Self {
        Self { index }
    }

    /// Create an empty tracker using the configured backend.
    pub fn from_config(config: &TilingConfig) -> Self {
        Self::new(config.coverage_backend, config.grid_cell_size)
    }

    /// Record a region as covered.
    ///
    /// Returns `false` without changing anything if the region is empty or
    /// already fully covered. With `coalesce`, the region is first merged
    /// with every indexed region whose union with it is an exact rectangle.
    pub fn insert(&mut self, region: PlaneRegion, coalesce: bool) -> bool {
        if !region.valid() || self.covered(&region) {
            return false;
        }

        let mut candidate = region;
        if coalesce {
            loop {
                let mut merged = false;
                for other in self.index.query_touching(&candidate) {
                    let union = candidate.union(&other);
                    if union.valid() && self.index.remove(&other) {
                        debug!(%candidate, %other, %union, "Coalesced coverage regions");
                        candidate = union;
                        merged = true;
                    }
                }
                if !merged {
                    break;
                }
            }
        }

        self.index.insert(candidate);
        true
    }

    /// Remove a region previously inserted verbatim (or produced by
    /// coalescing). Returns whether it was found.
    pub fn remove(&mut self, region: &PlaneRegion) -> bool {
        self.index.remove(region)
    }

    /// Covered area of `region`, in pixels.
    pub fn coverage(&self, region: &PlaneRegion) -> u64 {
        if !region.valid() {
            return 0;
        }
        let clipped: Vec<PlaneRegion> = self
            .index
            .query_intersecting(region)
            .iter()
            .map(|r| r.intersection(region))
            .collect();
        union_area(&clipped)
    }

    /// Check that `region` has no uncovered pixel. Empty regions are always
    /// covered.
    pub fn covered(&self, region: &PlaneRegion) -> bool {
        self.coverage(region) == region.area()
    }

    /// Number of indexed regions.
    pub fn size(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Snapshot of every indexed region.
    pub fn regions(&self) -> Vec<PlaneRegion> {
        self.index.regions()
    }
}

impl Default for TileCoverage {
    fn default() -> Self {
        Self::grid(DEFAULT_GRID_CELL_SIZE)
    }
}

// =============================================================================
// Tests
// =============================================================================
