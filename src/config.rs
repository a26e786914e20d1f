//! Configuration for Arbor
//!
//! Centralized configuration with sensible defaults. Consumed by the CLI;
//! the storage adapters keep taking explicit parameters.

use std::path::PathBuf;

use crate::tree::codec;

/// Main configuration for an Arbor index
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Bytes per block; every block in a store has this size
    pub block_size: usize,

    /// Path of the index file (file-backed adapter)
    pub index_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 4096,
            index_path: PathBuf::from("./arbor.idx"),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The exact payload length a leaf block holds at this block size
    pub fn leaf_payload_size(&self) -> usize {
        codec::leaf_payload_size(self.block_size)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
