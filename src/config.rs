//! Engine configuration.
//!
//! `LifeConfig::default()` matches the classic setup (10 world units per
//! cell). Individual knobs can be set with the builder methods, loaded from
//! TOML, or overridden from the environment:
//!
//! - `CHUNKLIFE_CELL_WORLD_SIZE`: world size of one cell (positive float)
//! - `CHUNKLIFE_INITIAL_CHUNKS`: chunk store capacity hint

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::chunklife::store::DEFAULT_CHUNK_CAPACITY;
use crate::error::Result;

pub const DEFAULT_CELL_WORLD_SIZE: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifeConfig {
    /// World-space edge length of one cell. Only used when converting world
    /// positions to cell addresses.
    pub cell_world_size: f64,
    /// How many chunks the store is pre-sized for. Not a limit.
    pub initial_chunk_capacity: usize,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            cell_world_size: DEFAULT_CELL_WORLD_SIZE,
            initial_chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }
}

impl LifeConfig {
    /// Set the world size of one cell. Non-positive or non-finite values are
    /// ignored.
    pub fn cell_world_size(mut self, size: f64) -> Self {
        if size.is_finite() && size > 0.0 {
            self.cell_world_size = size;
        }
        self
    }

    pub fn initial_chunk_capacity(mut self, n: usize) -> Self {
        self.initial_chunk_capacity = n.max(1);
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(text)?;
        // Route through the setters so bad values fall back to defaults.
        Ok(Self::default()
            .cell_world_size(parsed.cell_world_size)
            .initial_chunk_capacity(parsed.initial_chunk_capacity))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply `CHUNKLIFE_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CHUNKLIFE_CELL_WORLD_SIZE") {
            match raw.trim().parse::<f64>() {
                Ok(size) => self = self.cell_world_size(size),
                Err(_) => warn!(value = %raw, "ignoring CHUNKLIFE_CELL_WORLD_SIZE"),
            }
        }
        if let Some(raw) = lookup("CHUNKLIFE_INITIAL_CHUNKS") {
            match raw.trim().parse::<usize>() {
                Ok(n) => self = self.initial_chunk_capacity(n),
                Err(_) => warn!(value = %raw, "ignoring CHUNKLIFE_INITIAL_CHUNKS"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifeError;

    #[test]
    fn builder_rejects_degenerate_cell_size() {
        let config = LifeConfig::default().cell_world_size(0.0).cell_world_size(f64::NAN);
        assert_eq!(config.cell_world_size, DEFAULT_CELL_WORLD_SIZE);
        assert_eq!(LifeConfig::default().cell_world_size(2.5).cell_world_size, 2.5);
        assert_eq!(LifeConfig::default().initial_chunk_capacity(0).initial_chunk_capacity, 1);
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = LifeConfig::from_toml_str("cell_world_size = 4.0").expect("parse");
        assert_eq!(config.cell_world_size, 4.0);
        assert_eq!(config.initial_chunk_capacity, DEFAULT_CHUNK_CAPACITY);

        let config = LifeConfig::from_toml_str("").expect("parse");
        assert_eq!(config, LifeConfig::default());
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = LifeConfig::from_toml_str("chunk_size = 8").expect_err("unknown key");
        assert!(matches!(err, LifeError::Config(_)));
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let config = LifeConfig::default().with_overrides_from(|key| match key {
            "CHUNKLIFE_CELL_WORLD_SIZE" => Some(" 3.5 ".to_string()),
            "CHUNKLIFE_INITIAL_CHUNKS" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.cell_world_size, 3.5);
        assert_eq!(config.initial_chunk_capacity, DEFAULT_CHUNK_CAPACITY);
    }
}
