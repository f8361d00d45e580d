//! Cache for decoded tile bytes.
//!
//! Reading a region touches every tile it overlaps, and neighbouring regions
//! share tiles. This LRU cache keeps recently read tiles so that they are
//! fetched from the directory only once.
//!
//! # Cache Key
//!
//! Tiles are cached by directory handle and linear tile index. Handles carry
//! a generation, so tiles of a removed directory never satisfy lookups for a
//! directory that later reuses its slot.
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total size of cached tiles in bytes and evicts
//! least-recently-used entries when the capacity is exceeded.

use std::num::NonZeroUsize;

use bytes::Bytes;
use lru::LruCache;
use tracing::trace;

use crate::config::{TilingConfig, DEFAULT_TILE_CACHE_BYTES, DEFAULT_TILE_CACHE_ENTRIES};
use crate::tiff::DirectoryHandle;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for one decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    /// Directory the tile belongs to
    pub directory: DirectoryHandle,

    /// Linear tile index within the directory
    pub tile: u32,
}

impl TileCacheKey {
    pub fn new(directory: DirectoryHandle, tile: u32) -> Self {
        Self { directory, tile }
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

/// LRU cache of decoded tiles with size-based capacity.
///
/// Not internally synchronized: one reader owns one cache.
pub struct TileCache {
    cache: LruCache<TileCacheKey, Bytes>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Current total size in bytes
    current_size: usize,
}

impl TileCache {
    /// Create a new tile cache with default capacity (64MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_BYTES)
    }

    /// Create a new tile cache with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_TILE_CACHE_ENTRIES)
    }

    /// Create a new tile cache with specified capacity and maximum entries.
    ///
    /// # Arguments
    ///
    /// * `max_size` - Maximum total size of cached tiles in bytes
    /// * `max_entries` - Maximum number of entries; 0 is treated as 1
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(entries),
            max_size,
            current_size: 0,
        }
    }

    pub fn from_config(config: &TilingConfig) -> Self {
        Self::with_capacity_and_entries(config.tile_cache_bytes, config.tile_cache_entries)
    }

    /// Get a tile from the cache, marking it as recently used.
    pub fn get(&mut self, key: &TileCacheKey) -> Option<Bytes> {
        let hit = self.cache.get(key).cloned();
        trace!(
            directory = %key.directory,
            tile = key.tile,
            hit = hit.is_some(),
            "Tile cache lookup"
        );
        hit
    }

    /// Check if a tile is in the cache without updating LRU order.
    pub fn contains(&self, key: &TileCacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Store a tile in the cache.
    ///
    /// If the cache is over capacity after insertion, least-recently-used
    /// entries are evicted until the cache is within capacity. A tile larger
    /// than the whole capacity is therefore not retained.
    pub fn put(&mut self, key: TileCacheKey, data: Bytes) {
        if let Some(old_data) = self.cache.pop(&key) {
            self.current_size = self.current_size.saturating_sub(old_data.len());
        }

        self.current_size += data.len();
        // key is absent, so anything returned was evicted by the entry limit
        if let Some((_, evicted)) = self.cache.push(key, data) {
            self.current_size = self.current_size.saturating_sub(evicted.len());
        }

        while self.current_size > self.max_size {
            match self.cache.pop_lru() {
                Some((evicted_key, evicted)) => {
                    self.current_size = self.current_size.saturating_sub(evicted.len());
                    trace!(
                        directory = %evicted_key.directory,
                        tile = evicted_key.tile,
                        "Evicted tile"
                    );
                }
                None => break,
            }
        }
    }

    /// Remove a tile from the cache.
    pub fn remove(&mut self, key: &TileCacheKey) -> Option<Bytes> {
        let data = self.cache.pop(key)?;
        self.current_size = self.current_size.saturating_sub(data.len());
        Some(data)
    }

    /// Remove every tile of a directory. Returns the number removed.
    pub fn remove_directory(&mut self, directory: DirectoryHandle) -> usize {
        let keys: Vec<TileCacheKey> = self
            .cache
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| key.directory == directory)
            .collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.current_size = 0;
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Current total size of cached tiles in bytes.
    pub fn size(&self) -> usize {
        self.current_size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
