//! Test utilities for integration tests.
//!
//! This module provides directory implementations and helper functions for
//! building planes with various layouts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use bytes::Bytes;
use tracing_subscriber::EnvFilter;

use ome_tiling::error::IoError;
use ome_tiling::{
    Directory, DirectoryHandle, DirectoryRegistry, MemoryDirectory, PlaneProperties, PlaneRegion,
    TileCoverage,
};

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Both coverage backends, labelled for assertion messages.
pub fn coverage_backends() -> Vec<(&'static str, TileCoverage)> {
    vec![
        ("linear", TileCoverage::linear()),
        ("grid", TileCoverage::grid(32)),
    ]
}

pub fn region(x: u32, y: u32, w: u32, h: u32) -> PlaneRegion {
    PlaneRegion::new(x, y, w, h)
}

/// Register a single empty in-memory directory.
pub fn single_directory(
    props: PlaneProperties,
) -> (DirectoryRegistry<MemoryDirectory>, DirectoryHandle) {
    let mut registry = DirectoryRegistry::new();
    let handle = registry.insert(MemoryDirectory::new(props));
    (registry, handle)
}

/// Deterministic pseudo-random sequence (64-bit LCG).
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self, bound: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % u64::from(bound)) as u32
    }
}

// =============================================================================
// Failing Directory
// =============================================================================

/// A directory that fails every tile access after a set number of calls.
pub struct FailingDirectory {
    inner: MemoryDirectory,
    remaining: AtomicUsize,
}

impl FailingDirectory {
    pub fn new(props: PlaneProperties, allowed_calls: usize) -> Self {
        Self {
            inner: MemoryDirectory::new(props),
            remaining: AtomicUsize::new(allowed_calls),
        }
    }

    fn consume(&self) -> Result<(), IoError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| IoError::Backend("simulated failure".to_string()))
    }
}

impl Directory for FailingDirectory {
    fn properties(&self) -> PlaneProperties {
        self.inner.properties()
    }

    fn native_tile_index(&self, x: u32, y: u32, sample: u16) -> u32 {
        self.inner.native_tile_index(x, y, sample)
    }

    fn read_tile(&self, index: u32) -> Result<Bytes, IoError> {
        self.consume()?;
        self.inner.read_tile(index)
    }

    fn write_tile(&mut self, index: u32, data: &[u8]) -> Result<(), IoError> {
        self.consume()?;
        self.inner.write_tile(index, data)
    }
}
