//! Error type shared by the engine and its configuration loader.

use thiserror::Error;

use crate::chunklife::ChunkId;

#[derive(Debug, Error)]
pub enum LifeError {
    /// Allocating a chunk buffer or growing the chunk index failed.
    #[error("out of memory while allocating {chunk}")]
    ResourceExhaustion { chunk: ChunkId },

    /// A chunk was added for an id the store already holds.
    #[error("{chunk} is already allocated")]
    ChunkExists { chunk: ChunkId },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LifeError>;
