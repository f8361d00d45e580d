//! Configuration for the tiling engine.
//!
//! [`TilingConfig`] holds the tunables shared by coverage trackers, the tile
//! cache and plane writers. It can be:
//! - Flattened into a host application's clap arguments
//! - Read from environment variables with the `OME_TILING_` prefix
//! - Deserialized from a host configuration file (every field is optional)
//!
//! # Example
//!
//! ```
//! use ome_tiling::config::{CoverageBackend, TilingConfig};
//!
//! let config = TilingConfig::from_json(r#"{ "coverage_backend": "linear" }"#).unwrap();
//! assert_eq!(config.coverage_backend, CoverageBackend::Linear);
//! assert_eq!(config.grid_cell_size, 256);
//! ```
//!
//! # Environment Variables
//!
//! - `OME_TILING_COVERAGE_BACKEND` - Coverage index, `grid` or `linear` (default: grid)
//! - `OME_TILING_GRID_CELL_SIZE` - Grid cell size in pixels (default: 256)
//! - `OME_TILING_TILE_CACHE_BYTES` - Decoded tile cache capacity (default: 64MB)
//! - `OME_TILING_TILE_CACHE_ENTRIES` - Maximum cached tiles (default: 4096)
//! - `OME_TILING_COALESCE` - Merge adjacent covered regions (default: true)

use std::fmt;

use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Default Values
// =============================================================================

/// Default coverage grid cell size in pixels.
pub const DEFAULT_GRID_CELL_SIZE: u32 = 256;

/// Default decoded tile cache capacity: 64MB
pub const DEFAULT_TILE_CACHE_BYTES: usize = 64 * 1024 * 1024;

/// Default maximum number of cached tiles.
pub const DEFAULT_TILE_CACHE_ENTRIES: usize = 4096;

// =============================================================================
// Coverage Backend
// =============================================================================

/// Index structure used by coverage trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageBackend {
    /// Uniform-grid spatial index
    #[default]
    Grid,

    /// Linear scan over all regions
    Linear,
}

impl fmt::Display for CoverageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageBackend::Grid => f.write_str("grid"),
            CoverageBackend::Linear => f.write_str("linear"),
        }
    }
}

// =============================================================================
// TilingConfig
// =============================================================================

/// Tunables of the tiling engine.
#[derive(Parser, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[command(name = "ome-tiling")]
#[serde(default)]
pub struct TilingConfig {
    // =========================================================================
    // Coverage
    // =========================================================================
    /// Coverage index backend.
    #[arg(
        long,
        value_enum,
        default_value_t = CoverageBackend::Grid,
        env = "OME_TILING_COVERAGE_BACKEND"
    )]
    pub coverage_backend: CoverageBackend,

    /// Cell size in pixels of the grid coverage index.
    #[arg(long, default_value_t = DEFAULT_GRID_CELL_SIZE, env = "OME_TILING_GRID_CELL_SIZE")]
    pub grid_cell_size: u32,

    // =========================================================================
    // Tile Cache
    // =========================================================================
    /// Maximum total size of cached decoded tiles in bytes.
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_BYTES, env = "OME_TILING_TILE_CACHE_BYTES")]
    pub tile_cache_bytes: usize,

    /// Maximum number of cached decoded tiles.
    #[arg(
        long,
        default_value_t = DEFAULT_TILE_CACHE_ENTRIES,
        env = "OME_TILING_TILE_CACHE_ENTRIES"
    )]
    pub tile_cache_entries: usize,

    // =========================================================================
    // Writers
    // =========================================================================
    /// Merge edge-adjacent regions when recording written coverage.
    #[arg(long, default_value_t = true, action = ArgAction::Set, env = "OME_TILING_COALESCE")]
    pub coalesce: bool,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            coverage_backend: CoverageBackend::Grid,
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
            tile_cache_bytes: DEFAULT_TILE_CACHE_BYTES,
            tile_cache_entries: DEFAULT_TILE_CACHE_ENTRIES,
            coalesce: true,
        }
    }
}

impl TilingConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_cell_size == 0 {
            return Err("grid_cell_size must be greater than 0".to_string());
        }
        if self.tile_cache_bytes == 0 {
            return Err("tile_cache_bytes must be greater than 0".to_string());
        }
        if self.tile_cache_entries == 0 {
            return Err("tile_cache_entries must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Build a configuration from `OME_TILING_*` environment variables,
    /// falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed values and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::try_parse_from(["ome-tiling"])
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Deserialize a configuration from JSON. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
