//! Chunk and cell storage for ChunkLife.
//!
//! A chunk owns a boxed, row-major buffer of `CHUNK_SIZE * CHUNK_SIZE` cells.
//! Each cell carries the current generation (`alive`) next to the scratch bit
//! for the generation being computed (`alive_next`), so one pass can evaluate
//! the whole plane before any cell advances.

use super::coords::{CHUNK_CELLS, CHUNK_SIZE_I64, CellId, ChunkId, Edge, cell_index};
use crate::error::{LifeError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub alive: bool,
    pub alive_next: bool,
}

impl Cell {
    pub const DEAD: Self = Self {
        alive: false,
        alive_next: false,
    };
}

#[derive(Clone, Debug)]
pub struct Chunk {
    id: ChunkId,
    cells: Box<[Cell]>,
}

impl Chunk {
    /// Allocate an all-dead chunk, reporting allocation failure instead of
    /// aborting.
    pub fn try_new(id: ChunkId) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(CHUNK_CELLS)
            .map_err(|_| LifeError::ResourceExhaustion { chunk: id })?;
        cells.resize(CHUNK_CELLS, Cell::DEAD);
        Ok(Self {
            id,
            cells: cells.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn id(&self) -> ChunkId {
        self.id
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    #[inline]
    pub fn cell(&self, cell: CellId) -> &Cell {
        &self.cells[cell_index(cell)]
    }

    #[inline]
    pub fn cell_mut(&mut self, cell: CellId) -> &mut Cell {
        &mut self.cells[cell_index(cell)]
    }

    #[inline]
    pub fn is_alive(&self, cell: CellId) -> bool {
        self.cell(cell).alive
    }

    /// Whether any cell on `edge` is alive in the current generation.
    pub fn edge_has_live(&self, edge: Edge) -> bool {
        edge.cells().any(|cell| self.is_alive(cell))
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().filter(|c| c.alive).count() as u64
    }

    pub fn has_live(&self) -> bool {
        self.cells.iter().any(|c| c.alive)
    }

    /// Local coordinates of every live cell, row by row.
    pub fn live_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .map(|(i, _)| CellId::from_index(i))
    }

    /// Absolute coordinates of this chunk's cell `(0, 0)`.
    #[inline]
    pub fn base(&self) -> (i64, i64) {
        (self.id.x * CHUNK_SIZE_I64, self.id.y * CHUNK_SIZE_I64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunklife::coords::CHUNK_SIZE;

    #[test]
    fn new_chunk_is_dead() {
        let chunk = Chunk::try_new(ChunkId::new(-2, 5)).expect("allocate chunk");
        assert_eq!(chunk.id(), ChunkId::new(-2, 5));
        assert_eq!(chunk.cells().len(), CHUNK_SIZE * CHUNK_SIZE);
        assert!(chunk.cells().iter().all(|c| *c == Cell::DEAD));
        assert!(!chunk.has_live());
        assert_eq!(chunk.base(), (-2 * CHUNK_SIZE_I64, 5 * CHUNK_SIZE_I64));
    }

    #[test]
    fn edge_scan_sees_only_its_edge() {
        let mut chunk = Chunk::try_new(ChunkId::new(0, 0)).expect("allocate chunk");
        let last = CHUNK_SIZE_I64 - 1;
        chunk.cell_mut(CellId::new(last, 4)).alive = true;

        assert!(chunk.edge_has_live(Edge::Right));
        assert!(!chunk.edge_has_live(Edge::Left));
        assert!(!chunk.edge_has_live(Edge::Top));
        assert!(!chunk.edge_has_live(Edge::Bottom));

        chunk.cell_mut(CellId::new(0, 0)).alive = true;
        assert!(chunk.edge_has_live(Edge::Top));
        assert!(chunk.edge_has_live(Edge::Left));
    }

    #[test]
    fn scratch_bit_does_not_count_as_live() {
        let mut chunk = Chunk::try_new(ChunkId::new(0, 0)).expect("allocate chunk");
        chunk.cell_mut(CellId::new(0, 3)).alive_next = true;
        assert!(!chunk.edge_has_live(Edge::Left));
        assert_eq!(chunk.population(), 0);
    }

    #[test]
    fn live_cells_and_population_agree() {
        let mut chunk = Chunk::try_new(ChunkId::new(1, 1)).expect("allocate chunk");
        for cell in [CellId::new(1, 0), CellId::new(1, 1), CellId::new(1, 2)] {
            chunk.cell_mut(cell).alive = true;
        }
        let live: Vec<_> = chunk.live_cells().collect();
        assert_eq!(live, vec![CellId::new(1, 0), CellId::new(1, 1), CellId::new(1, 2)]);
        assert_eq!(chunk.population(), 3);
    }
}
