use tracing::{info, trace};

use super::chunk::Chunk;
use super::chunkmap::ChunkIdx;
use super::coords::{
    CHUNK_CELLS, CHUNK_SIZE, CHUNK_SIZE_I64, CellId, ChunkId, GlobalCellId, WorldPos,
    global_cell_id_of, global_cell_id_to_world_origin,
};
use super::growth;
use super::store::ChunkStore;
use crate::config::LifeConfig;
use crate::error::Result;

/// Neighbor offsets in scan order, `(0, 0)` excluded.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Slots of the 3x3 block of chunks centred on the one being evaluated,
/// indexed by `(dy + 1) * 3 + (dx + 1)`. `None` is an unallocated (dead)
/// chunk.
type ChunkWindow = [Option<ChunkIdx>; 9];

#[inline(always)]
fn window_slot(dx: i64, dy: i64) -> usize {
    ((dy + 1) * 3 + (dx + 1)) as usize
}

fn chunk_window(store: &ChunkStore, id: ChunkId) -> ChunkWindow {
    let mut window = [None; 9];
    for dy in -1..=1 {
        for dx in -1..=1 {
            window[window_slot(dx, dy)] = store.idx_of(id.offset(dx, dy));
        }
    }
    window
}

/// Count live neighbors through a pre-resolved chunk window.
#[inline]
fn count_in_window(store: &ChunkStore, window: &ChunkWindow, gcid: GlobalCellId) -> u8 {
    let last = CHUNK_SIZE_I64 - 1;
    let (x, y) = (gcid.cell.x, gcid.cell.y);
    let interior = x > 0 && x < last && y > 0 && y < last;

    // Interior cells never leave their own chunk.
    if let (true, Some(center)) = (interior, window[window_slot(0, 0)]) {
        let cells = store.get(center).cells();
        let i = (x + y * CHUNK_SIZE_I64) as usize;
        let (row_up, row_down) = (i - CHUNK_SIZE, i + CHUNK_SIZE);
        return [
            row_up - 1,
            row_up,
            row_up + 1,
            i - 1,
            i + 1,
            row_down - 1,
            row_down,
            row_down + 1,
        ]
        .into_iter()
        .filter(|&n| cells[n].alive)
        .count() as u8;
    }

    let mut count = 0u8;
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let neighbor = gcid.apply_offset(dx, dy);
        let slot = window_slot(neighbor.chunk.x - gcid.chunk.x, neighbor.chunk.y - gcid.chunk.y);
        if window[slot].is_some_and(|idx| store.get(idx).is_alive(neighbor.cell)) {
            count += 1;
        }
    }
    count
}

/// B3/S23.
#[inline(always)]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    neighbors == 3 || (neighbors == 2 && alive)
}

/// What one `step` did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Chunks allocated by frontier expansion.
    pub grown: usize,
    /// Chunks evaluated by the generation pass.
    pub evaluated: usize,
    pub births: u64,
    pub deaths: u64,
}

/// Game of Life on an unbounded plane of lazily allocated chunks.
pub struct ChunkLife {
    store: ChunkStore,
    config: LifeConfig,
    generation: u64,
    population_cache: Option<u64>,
}

impl Default for ChunkLife {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkLife {
    pub fn new() -> Self {
        Self::with_config(LifeConfig::default())
    }

    pub fn with_config(config: LifeConfig) -> Self {
        Self {
            store: ChunkStore::with_capacity(config.initial_chunk_capacity),
            config,
            generation: 0,
            population_cache: Some(0),
        }
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Flip one cell, allocating its chunk if needed. Returns the new state.
    pub fn toggle_cell(&mut self, gcid: GlobalCellId) -> Result<bool> {
        let alive = self.store.toggle_cell(gcid)?;
        self.population_cache = None;
        trace!(cell = %gcid, alive, "toggled cell");
        Ok(alive)
    }

    /// Set one cell. Clearing a cell never allocates.
    pub fn set_cell(&mut self, gcid: GlobalCellId, alive: bool) -> Result<()> {
        let idx = match self.store.idx_of(gcid.chunk) {
            Some(idx) => idx,
            None if alive => self.store.add_chunk(gcid.chunk)?,
            None => return Ok(()),
        };
        let cell = self.store.get_mut(idx).cell_mut(gcid.cell);
        if cell.alive != alive {
            cell.alive = alive;
            self.population_cache = None;
        }
        Ok(())
    }

    pub fn set_cell_at(&mut self, x: i64, y: i64, alive: bool) -> Result<()> {
        self.set_cell(GlobalCellId::from_absolute(x, y), alive)
    }

    /// Batch-set many live cells given in absolute coordinates.
    pub fn set_cells_alive<I>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        for (x, y) in cells {
            self.set_cell_at(x, y, true)?;
        }
        Ok(())
    }

    /// Discard every chunk and start over from an empty plane.
    pub fn reset(&mut self) {
        info!(
            chunks = self.store.len(),
            generation = self.generation,
            "resetting simulation"
        );
        self.store = ChunkStore::with_capacity(self.config.initial_chunk_capacity);
        self.generation = 0;
        self.population_cache = Some(0);
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Allocate chunks across every edge that carries a live cell.
    pub fn grow_chunks_if_needed(&mut self) -> Result<usize> {
        growth::grow_chunks_if_needed(&mut self.store)
    }

    /// Live neighbors of a cell, reading unallocated chunks as dead.
    pub fn count_neighbors(&self, gcid: GlobalCellId) -> u8 {
        NEIGHBOR_OFFSETS
            .iter()
            .filter(|&&(dx, dy)| self.store.cell_status(gcid.apply_offset(dx, dy)))
            .count() as u8
    }

    /// Fill every cell's `alive_next` from the current generation.
    ///
    /// Reads only `alive` and writes only `alive_next`, so the order in which
    /// chunks and cells are visited cannot change the result. Returns the
    /// number of chunks evaluated.
    pub fn compute_next_generation(&mut self) -> usize {
        let count = self.store.len();
        let mut next = vec![false; CHUNK_CELLS];
        for i in 0..count {
            let idx = ChunkIdx(i as u32);
            let id = self.store.get(idx).id();
            let window = chunk_window(&self.store, id);
            {
                let chunk = self.store.get(idx);
                for (slot, out) in next.iter_mut().enumerate() {
                    let gcid = GlobalCellId::new(id, CellId::from_index(slot));
                    let neighbors = count_in_window(&self.store, &window, gcid);
                    *out = next_state(chunk.cells()[slot].alive, neighbors);
                }
            }
            for (cell, &alive_next) in self.store.get_mut(idx).cells_mut().iter_mut().zip(&next) {
                cell.alive_next = alive_next;
            }
        }
        count
    }

    /// Advance every cell to its computed `alive_next`. Returns
    /// `(births, deaths)`.
    pub fn apply_generation(&mut self) -> (u64, u64) {
        let mut births = 0u64;
        let mut deaths = 0u64;
        for chunk in self.store.iter_mut() {
            for cell in chunk.cells_mut() {
                match (cell.alive, cell.alive_next) {
                    (false, true) => births += 1,
                    (true, false) => deaths += 1,
                    _ => {}
                }
                cell.alive = cell.alive_next;
            }
        }
        self.population_cache = None;
        (births, deaths)
    }

    /// One generation: grow, compute, apply. On error the world is unchanged.
    pub fn step(&mut self) -> Result<StepStats> {
        let grown = self.grow_chunks_if_needed()?;
        let evaluated = self.compute_next_generation();
        let (births, deaths) = self.apply_generation();
        self.generation += 1;

        let stats = StepStats {
            grown,
            evaluated,
            births,
            deaths,
        };
        trace!(generation = self.generation, ?stats, "step");
        Ok(stats)
    }

    pub fn step_n(&mut self, n: u64) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn get_cell(&self, gcid: GlobalCellId) -> bool {
        self.store.cell_status(gcid)
    }

    pub fn get_cell_at(&self, x: i64, y: i64) -> bool {
        self.get_cell(GlobalCellId::from_absolute(x, y))
    }

    pub fn chunk_count(&self) -> usize {
        self.store.len()
    }

    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &Chunk> + '_ {
        self.store.iter()
    }

    pub fn find_chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.store.find(id)
    }

    /// Allocated chunks inside the inclusive chunk rectangle spanned by
    /// `top_left` and `bottom_right`, row by row.
    pub fn chunks_in(
        &self,
        top_left: ChunkId,
        bottom_right: ChunkId,
    ) -> impl Iterator<Item = &Chunk> + '_ {
        (top_left.y..=bottom_right.y).flat_map(move |y| {
            (top_left.x..=bottom_right.x).filter_map(move |x| self.store.find(ChunkId::new(x, y)))
        })
    }

    pub fn world_position_to_global_cell_id(&self, pos: WorldPos) -> GlobalCellId {
        global_cell_id_of(pos, self.config.cell_world_size)
    }

    pub fn cell_world_origin(&self, gcid: GlobalCellId) -> WorldPos {
        global_cell_id_to_world_origin(gcid, self.config.cell_world_size)
    }

    pub fn population(&mut self) -> u64 {
        if let Some(cached) = self.population_cache {
            return cached;
        }
        let total = self.store.iter().map(Chunk::population).sum();
        self.population_cache = Some(total);
        total
    }

    pub fn is_empty(&mut self) -> bool {
        self.population() == 0
    }

    /// `(min_x, min_y, max_x, max_y)` of live cells in absolute coordinates.
    pub fn bounds(&self) -> Option<(i64, i64, i64, i64)> {
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        let mut seen = false;

        self.for_each_live(|x, y| {
            seen = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        });

        seen.then_some((min_x, min_y, max_x, max_y))
    }

    /// Visit every live cell in absolute coordinates.
    pub fn for_each_live<F: FnMut(i64, i64)>(&self, mut f: F) {
        for chunk in self.store.iter() {
            let (base_x, base_y) = chunk.base();
            for cell in chunk.live_cells() {
                f(base_x + cell.x, base_y + cell.y);
            }
        }
    }
}
