//! Conway's Game of Life (B3/S23) on an unbounded plane of lazily allocated
//! chunks.

pub mod chunklife;
pub mod config;
pub mod error;

pub use chunklife::{ChunkId, ChunkLife, GlobalCellId, StepStats, WorldPos};
pub use config::LifeConfig;
pub use error::{LifeError, Result};
