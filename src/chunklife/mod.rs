//! ChunkLife engine internals and public API.

mod chunk;
mod chunkmap;
mod coords;
mod engine;
mod growth;
mod input;
pub(crate) mod store;

pub use chunk::{Cell, Chunk};
pub use chunkmap::ChunkIdx;
pub use coords::{
    CHUNK_CELLS, CHUNK_SIZE, CellId, ChunkId, Edge, GlobalCellId, WorldPos, cell_index,
    chunk_id_of, chunk_world_origin, global_cell_id_of, global_cell_id_to_world_origin,
};
pub use engine::{ChunkLife, StepStats, next_state};
pub use growth::grow_chunks_if_needed;
pub use input::PanState;
pub use store::ChunkStore;
