//! Chunk store and cell accessor for ChunkLife.
//!
//! Chunks live in a dense vector in insertion order; `ChunkMap` maps each
//! `ChunkId` to its slot. Slots are stable for the lifetime of the store
//! since chunks are never evicted, but callers still resolve cells through a
//! fresh id lookup on every access instead of holding on to chunk references.

use std::collections::{HashSet, TryReserveError};

use tracing::debug;

use super::chunk::{Cell, Chunk};
use super::chunkmap::{ChunkIdx, ChunkMap};
use super::coords::{ChunkId, GlobalCellId};
use crate::error::{LifeError, Result};

/// Initial capacity hint, in chunks.
pub const DEFAULT_CHUNK_CAPACITY: usize = 32;

pub struct ChunkStore {
    chunks: Vec<Chunk>,
    index: ChunkMap,
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHUNK_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            chunks: Vec::with_capacity(cap),
            index: ChunkMap::with_capacity(cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Slot of the chunk with this id. Never allocates.
    #[inline]
    pub fn idx_of(&self, id: ChunkId) -> Option<ChunkIdx> {
        self.index.get(id)
    }

    #[inline]
    pub fn contains(&self, id: ChunkId) -> bool {
        self.index.get(id).is_some()
    }

    #[inline]
    pub fn find(&self, id: ChunkId) -> Option<&Chunk> {
        self.index.get(id).map(|idx| &self.chunks[idx.index()])
    }

    #[inline]
    pub fn find_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.index.get(id).map(|idx| &mut self.chunks[idx.index()])
    }

    #[inline]
    pub fn get(&self, idx: ChunkIdx) -> &Chunk {
        &self.chunks[idx.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: ChunkIdx) -> &mut Chunk {
        &mut self.chunks[idx.index()]
    }

    /// Chunks in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> + '_ {
        self.chunks.iter_mut()
    }

    /// Allocate an all-dead chunk for an id that is not present yet.
    ///
    /// An id that is already allocated is rejected with `ChunkExists`. On any
    /// error the store is left exactly as it was.
    pub fn add_chunk(&mut self, id: ChunkId) -> Result<ChunkIdx> {
        self.add_chunks(std::slice::from_ref(&id))?;
        Ok(ChunkIdx((self.chunks.len() - 1) as u32))
    }

    /// Allocate all-dead chunks for a batch of distinct, absent ids, appended
    /// in the given order.
    ///
    /// Every buffer and all index room is acquired before the first chunk is
    /// committed, so either the whole batch lands or the store is unchanged.
    pub fn add_chunks(&mut self, ids: &[ChunkId]) -> Result<()> {
        let mut batch = HashSet::with_capacity(ids.len());
        for &id in ids {
            if self.contains(id) || !batch.insert(id) {
                return Err(LifeError::ChunkExists { chunk: id });
            }
        }
        let Some(&first) = ids.first() else {
            return Ok(());
        };
        let exhausted = |_: TryReserveError| LifeError::ResourceExhaustion { chunk: first };

        let end = self.chunks.len() + ids.len();
        if u32::try_from(end - 1).is_err() {
            return Err(LifeError::ResourceExhaustion { chunk: first });
        }
        let mut fresh = Vec::new();
        fresh.try_reserve_exact(ids.len()).map_err(exhausted)?;
        for &id in ids {
            fresh.push(Chunk::try_new(id)?);
        }
        self.chunks.try_reserve(ids.len()).map_err(exhausted)?;
        self.index.try_reserve(ids.len()).map_err(exhausted)?;

        // Nothing below allocates.
        for chunk in fresh {
            let idx = ChunkIdx(self.chunks.len() as u32);
            self.index.insert_reserved(chunk.id(), idx);
            self.chunks.push(chunk);
        }
        debug!(first = %first, added = ids.len(), total = end, "allocated chunks");
        Ok(())
    }

    /// Find-or-add.
    pub fn ensure_chunk(&mut self, id: ChunkId) -> Result<ChunkIdx> {
        match self.index.get(id) {
            Some(idx) => Ok(idx),
            None => self.add_chunk(id),
        }
    }

    /// Drop every chunk, keeping the backing allocations for reuse.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.index.clear();
    }

    // ── Cell accessor ───────────────────────────────────────────────────

    /// Current state of a cell. Cells of unallocated chunks are dead.
    #[inline]
    pub fn cell_status(&self, gcid: GlobalCellId) -> bool {
        self.find(gcid.chunk)
            .is_some_and(|chunk| chunk.is_alive(gcid.cell))
    }

    /// Mutable slot of a cell whose chunk is already allocated.
    #[inline]
    pub fn cell_mut(&mut self, gcid: GlobalCellId) -> Option<&mut Cell> {
        self.find_mut(gcid.chunk).map(|chunk| chunk.cell_mut(gcid.cell))
    }

    /// Flip a cell, allocating its chunk first if needed. Returns the new
    /// state.
    pub fn toggle_cell(&mut self, gcid: GlobalCellId) -> Result<bool> {
        let idx = self.ensure_chunk(gcid.chunk)?;
        let cell = self.get_mut(idx).cell_mut(gcid.cell);
        cell.alive = !cell.alive;
        Ok(cell.alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunklife::coords::CellId;

    #[test]
    fn find_after_add() {
        let mut store = ChunkStore::new();
        assert!(store.find(ChunkId::new(0, 0)).is_none());

        let idx = store.add_chunk(ChunkId::new(3, -4)).expect("add");
        assert_eq!(store.idx_of(ChunkId::new(3, -4)), Some(idx));
        assert_eq!(store.find(ChunkId::new(3, -4)).map(Chunk::id), Some(ChunkId::new(3, -4)));
        assert!(!store.contains(ChunkId::new(-4, 3)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ensure_chunk_never_duplicates() {
        let mut store = ChunkStore::with_capacity(1);
        let a = store.ensure_chunk(ChunkId::new(1, 1)).expect("ensure");
        let b = store.ensure_chunk(ChunkId::new(1, 1)).expect("ensure");
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn many_chunks_stay_addressable() {
        let mut store = ChunkStore::with_capacity(1);
        for y in -10..10 {
            for x in -10..10 {
                store.add_chunk(ChunkId::new(x, y)).expect("add");
            }
        }
        assert_eq!(store.len(), 400);
        for y in -10..10 {
            for x in -10..10 {
                let chunk = store.find(ChunkId::new(x, y)).expect("present");
                assert_eq!(chunk.id(), ChunkId::new(x, y));
            }
        }
        let order: Vec<_> = store.iter().take(2).map(Chunk::id).collect();
        assert_eq!(order, vec![ChunkId::new(-10, -10), ChunkId::new(-9, -10)]);
    }

    #[test]
    fn cell_status_of_missing_chunk_is_dead_and_does_not_allocate() {
        let store = ChunkStore::new();
        let gcid = GlobalCellId::new(ChunkId::new(7, 7), CellId::new(0, 0));
        assert!(!store.cell_status(gcid));
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_allocates_and_flips() {
        let mut store = ChunkStore::new();
        let gcid = GlobalCellId::new(ChunkId::new(-1, 2), CellId::new(5, 6));

        assert!(store.toggle_cell(gcid).expect("toggle"));
        assert!(store.cell_status(gcid));
        assert!(store.contains(ChunkId::new(-1, 2)));

        assert!(!store.toggle_cell(gcid).expect("toggle"));
        assert!(!store.cell_status(gcid));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cell_mut_requires_existing_chunk() {
        let mut store = ChunkStore::new();
        let gcid = GlobalCellId::new(ChunkId::new(0, 0), CellId::new(1, 1));
        assert!(store.cell_mut(gcid).is_none());

        store.add_chunk(gcid.chunk).expect("add");
        store.cell_mut(gcid).expect("cell").alive = true;
        assert!(store.cell_status(gcid));
    }

    #[test]
    fn add_chunk_rejects_allocated_id() {
        let mut store = ChunkStore::new();
        let gcid = GlobalCellId::new(ChunkId::new(0, 0), CellId::new(4, 4));
        assert!(store.toggle_cell(gcid).expect("toggle"));

        let err = store.add_chunk(ChunkId::new(0, 0)).unwrap_err();
        assert!(matches!(err, LifeError::ChunkExists { chunk } if chunk == ChunkId::new(0, 0)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().filter(|c| c.id() == ChunkId::new(0, 0)).count(), 1);
        assert!(store.cell_status(gcid));
    }

    #[test]
    fn add_chunks_appends_batch_in_order() {
        let mut store = ChunkStore::with_capacity(1);
        store.add_chunk(ChunkId::new(0, 0)).expect("add");
        let batch: Vec<_> = (1..=40).map(|x| ChunkId::new(x, -x)).collect();
        store.add_chunks(&batch).expect("batch");

        assert_eq!(store.len(), 41);
        let ids: Vec<_> = store.iter().skip(1).map(Chunk::id).collect();
        assert_eq!(ids, batch);
        for (i, &id) in batch.iter().enumerate() {
            assert_eq!(store.idx_of(id), Some(ChunkIdx(i as u32 + 1)));
        }
    }

    #[test]
    fn rejected_batch_leaves_store_untouched() {
        let mut store = ChunkStore::new();
        store.add_chunk(ChunkId::new(5, 5)).expect("add");

        let repeated = [ChunkId::new(1, 0), ChunkId::new(2, 0), ChunkId::new(1, 0)];
        assert!(matches!(
            store.add_chunks(&repeated),
            Err(LifeError::ChunkExists { chunk }) if chunk == ChunkId::new(1, 0)
        ));
        let present = [ChunkId::new(1, 0), ChunkId::new(5, 5)];
        assert!(store.add_chunks(&present).is_err());

        assert_eq!(store.len(), 1);
        assert!(!store.contains(ChunkId::new(1, 0)));
        assert!(!store.contains(ChunkId::new(2, 0)));
    }

    #[test]
    fn clear_empties_store() {
        let mut store = ChunkStore::new();
        store.add_chunk(ChunkId::new(0, 0)).expect("add");
        store.clear();
        assert!(store.is_empty());
        assert!(store.find(ChunkId::new(0, 0)).is_none());
        store.add_chunk(ChunkId::new(0, 0)).expect("re-add after clear");
    }
}
