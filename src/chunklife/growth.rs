//! Frontier expansion for ChunkLife.
//!
//! Before a generation is computed, every chunk with a live cell on one of
//! its four edges gets the chunk across that edge allocated. Only chunks that
//! existed when the pass started are inspected, so the allocated region grows
//! by at most one ring of chunks per step and freshly grown (all-dead) chunks
//! wait for the next step.

use std::collections::HashSet;

use tracing::debug;

use super::coords::Edge;
use super::store::ChunkStore;
use crate::error::Result;

/// Allocate missing edge neighbors of border-touching chunks.
/// Returns the number of chunks allocated.
///
/// The missing neighbors are collected first and added as one batch, so an
/// allocation failure leaves the store as it was.
pub fn grow_chunks_if_needed(store: &mut ChunkStore) -> Result<usize> {
    let snapshot = store.len();
    let mut missing = Vec::new();
    let mut seen = HashSet::new();

    for chunk in store.iter() {
        let id = chunk.id();
        for edge in Edge::ALL {
            let neighbor = id.neighbor(edge);
            if store.contains(neighbor) || seen.contains(&neighbor) {
                continue;
            }
            if chunk.edge_has_live(edge) {
                seen.insert(neighbor);
                missing.push(neighbor);
            }
        }
    }

    store.add_chunks(&missing)?;
    let grown = missing.len();
    if grown > 0 {
        debug!(grown, inspected = snapshot, total = store.len(), "expanded frontier");
    }
    Ok(grown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunklife::coords::{CHUNK_SIZE_I64, CellId, ChunkId, GlobalCellId};

    fn toggle(store: &mut ChunkStore, chunk: ChunkId, x: i64, y: i64) {
        store
            .toggle_cell(GlobalCellId::new(chunk, CellId::new(x, y)))
            .expect("toggle");
    }

    #[test]
    fn interior_life_does_not_grow() {
        let mut store = ChunkStore::new();
        toggle(&mut store, ChunkId::new(0, 0), 5, 5);
        assert_eq!(grow_chunks_if_needed(&mut store).expect("grow"), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corner_cell_grows_both_edge_neighbors_only() {
        let mut store = ChunkStore::new();
        let last = CHUNK_SIZE_I64 - 1;
        toggle(&mut store, ChunkId::new(0, 0), last, 0);

        assert_eq!(grow_chunks_if_needed(&mut store).expect("grow"), 2);
        assert!(store.contains(ChunkId::new(1, 0)));
        assert!(store.contains(ChunkId::new(0, -1)));
        assert!(!store.contains(ChunkId::new(1, -1)));
        assert!(!store.contains(ChunkId::new(-1, 0)));
    }

    #[test]
    fn new_chunks_are_not_inspected_in_the_same_pass() {
        let mut store = ChunkStore::new();
        let last = CHUNK_SIZE_I64 - 1;
        toggle(&mut store, ChunkId::new(0, 0), last, 3);

        grow_chunks_if_needed(&mut store).expect("grow");
        assert_eq!(store.len(), 2);

        // The grown chunk is dead, so a second pass adds nothing either.
        assert_eq!(grow_chunks_if_needed(&mut store).expect("grow"), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn grown_chunks_follow_scan_order() {
        let mut store = ChunkStore::new();
        let last = CHUNK_SIZE_I64 - 1;
        toggle(&mut store, ChunkId::new(0, 0), 0, 0);
        toggle(&mut store, ChunkId::new(4, 4), last, last);

        assert_eq!(grow_chunks_if_needed(&mut store).expect("grow"), 4);
        let ids: Vec<_> = store.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![
                ChunkId::new(0, 0),
                ChunkId::new(4, 4),
                ChunkId::new(0, -1),
                ChunkId::new(-1, 0),
                ChunkId::new(4, 5),
                ChunkId::new(5, 4),
            ]
        );
    }

    #[test]
    fn shared_neighbor_is_allocated_once() {
        let mut store = ChunkStore::new();
        let last = CHUNK_SIZE_I64 - 1;
        toggle(&mut store, ChunkId::new(0, 0), last, 10);
        toggle(&mut store, ChunkId::new(2, 0), 0, 10);

        assert_eq!(grow_chunks_if_needed(&mut store).expect("grow"), 1);
        assert_eq!(store.len(), 3);
        assert!(store.contains(ChunkId::new(1, 0)));
    }
}
