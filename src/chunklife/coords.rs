//! Coordinate model for ChunkLife.
//!
//! The plane is cut into square chunks of `CHUNK_SIZE x CHUNK_SIZE` cells.
//! A cell is addressed by the chunk that owns it plus its local offset inside
//! that chunk. World-space positions (what a pointer or camera produces) are
//! mapped onto that address with floor division, never truncation, so the
//! cells just left of / above the origin land in chunk `-1`.

use std::fmt;

pub const CHUNK_SIZE: usize = 32;
pub(crate) const CHUNK_SIZE_I64: i64 = CHUNK_SIZE as i64;
pub const CHUNK_CELLS: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Position of a chunk on the infinite chunk grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId {
    pub x: i64,
    pub y: i64,
}

impl ChunkId {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The chunk sharing `edge` with this one.
    #[inline]
    pub const fn neighbor(self, edge: Edge) -> Self {
        let (dx, dy) = edge.offset();
        self.offset(dx, dy)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({}, {})", self.x, self.y)
    }
}

/// Local cell coordinate inside a chunk.
///
/// Normalized values lie in `[0, CHUNK_SIZE)` on both axes. Offset arithmetic
/// may leave that range for a moment; see [`GlobalCellId::apply_offset`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellId {
    pub x: i64,
    pub y: i64,
}

impl CellId {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn is_in_bounds(self) -> bool {
        self.x >= 0 && self.x < CHUNK_SIZE_I64 && self.y >= 0 && self.y < CHUNK_SIZE_I64
    }

    /// Inverse of [`cell_index`].
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self {
            x: (index % CHUNK_SIZE) as i64,
            y: (index / CHUNK_SIZE) as i64,
        }
    }
}

/// Row-major slot of a normalized cell inside its chunk buffer.
///
/// # Panics
/// Panics when `cell` is outside `[0, CHUNK_SIZE)`. Every neighbor-relative
/// address goes through `apply_offset`, so hitting this is a caller bug.
#[inline]
pub fn cell_index(cell: CellId) -> usize {
    assert!(
        cell.is_in_bounds(),
        "cell ({}, {}) outside chunk bounds 0..{CHUNK_SIZE}",
        cell.x,
        cell.y
    );
    (cell.x + cell.y * CHUNK_SIZE_I64) as usize
}

/// The one stable name of a cell anywhere on the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlobalCellId {
    pub chunk: ChunkId,
    pub cell: CellId,
}

impl GlobalCellId {
    #[inline]
    pub const fn new(chunk: ChunkId, cell: CellId) -> Self {
        Self { chunk, cell }
    }

    /// Address of the cell at absolute cell coordinates `(x, y)`.
    #[inline]
    pub const fn from_absolute(x: i64, y: i64) -> Self {
        Self {
            chunk: ChunkId::new(x.div_euclid(CHUNK_SIZE_I64), y.div_euclid(CHUNK_SIZE_I64)),
            cell: CellId::new(x.rem_euclid(CHUNK_SIZE_I64), y.rem_euclid(CHUNK_SIZE_I64)),
        }
    }

    #[inline]
    pub const fn to_absolute(self) -> (i64, i64) {
        (
            self.chunk.x * CHUNK_SIZE_I64 + self.cell.x,
            self.chunk.y * CHUNK_SIZE_I64 + self.cell.y,
        )
    }

    /// Fold any out-of-range local coordinate into its owning chunk.
    #[inline]
    pub const fn normalize(self) -> Self {
        Self {
            chunk: ChunkId::new(
                self.chunk.x + self.cell.x.div_euclid(CHUNK_SIZE_I64),
                self.chunk.y + self.cell.y.div_euclid(CHUNK_SIZE_I64),
            ),
            cell: CellId::new(
                self.cell.x.rem_euclid(CHUNK_SIZE_I64),
                self.cell.y.rem_euclid(CHUNK_SIZE_I64),
            ),
        }
    }

    /// Step by `(dx, dy)` with `dx, dy` in `-1..=1`, crossing into the
    /// adjacent chunk when the local coordinate leaves `[0, CHUNK_SIZE)`.
    #[inline]
    pub fn apply_offset(self, dx: i64, dy: i64) -> Self {
        debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy));
        let mut out = Self {
            chunk: self.chunk,
            cell: CellId::new(self.cell.x + dx, self.cell.y + dy),
        };
        wrap_axis(&mut out.chunk.x, &mut out.cell.x);
        wrap_axis(&mut out.chunk.y, &mut out.cell.y);
        out
    }
}

impl fmt::Display for GlobalCellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Cell({}, {})", self.chunk, self.cell.x, self.cell.y)
    }
}

#[inline(always)]
fn wrap_axis(chunk: &mut i64, local: &mut i64) {
    if *local < 0 {
        *chunk -= 1;
        *local += CHUNK_SIZE_I64;
    } else if *local >= CHUNK_SIZE_I64 {
        *chunk += 1;
        *local -= CHUNK_SIZE_I64;
    }
}

/// The four edges of a chunk. Row 0 is the top row; `+y` points down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Edge {
    Top = 0,    // row 0, (cx, cy-1)
    Bottom = 1, // row CHUNK_SIZE-1, (cx, cy+1)
    Left = 2,   // column 0, (cx-1, cy)
    Right = 3,  // column CHUNK_SIZE-1, (cx+1, cy)
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    #[inline]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Edge::Top => (0, -1),
            Edge::Bottom => (0, 1),
            Edge::Left => (-1, 0),
            Edge::Right => (1, 0),
        }
    }

    /// Local cells along this edge, in increasing order.
    pub fn cells(self) -> impl Iterator<Item = CellId> {
        let last = CHUNK_SIZE_I64 - 1;
        (0..CHUNK_SIZE_I64).map(move |i| match self {
            Edge::Top => CellId::new(i, 0),
            Edge::Bottom => CellId::new(i, last),
            Edge::Left => CellId::new(0, i),
            Edge::Right => CellId::new(last, i),
        })
    }
}

/// A point in world space (the space a camera looks at).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[inline]
fn chunk_world_size(cell_world_size: f64) -> f64 {
    CHUNK_SIZE as f64 * cell_world_size
}

/// Chunk containing a world position.
pub fn chunk_id_of(pos: WorldPos, cell_world_size: f64) -> ChunkId {
    let size = chunk_world_size(cell_world_size);
    ChunkId::new((pos.x / size).floor() as i64, (pos.y / size).floor() as i64)
}

/// World-space corner of a chunk (its cell `(0, 0)`).
pub fn chunk_world_origin(id: ChunkId, cell_world_size: f64) -> WorldPos {
    let size = chunk_world_size(cell_world_size);
    WorldPos::new(id.x as f64 * size, id.y as f64 * size)
}

/// Cell containing a world position.
///
/// Valid for positions whose cell coordinates fit in `i64`. Positions past
/// that range (including infinities) saturate to the outermost cell, and NaN
/// maps to cell 0 on that axis.
pub fn global_cell_id_of(pos: WorldPos, cell_world_size: f64) -> GlobalCellId {
    GlobalCellId::from_absolute(
        (pos.x / cell_world_size).floor() as i64,
        (pos.y / cell_world_size).floor() as i64,
    )
}

/// World-space corner of a cell.
pub fn global_cell_id_to_world_origin(gcid: GlobalCellId, cell_world_size: f64) -> WorldPos {
    let origin = chunk_world_origin(gcid.chunk, cell_world_size);
    WorldPos::new(
        origin.x + gcid.cell.x as f64 * cell_world_size,
        origin.y + gcid.cell.y as f64 * cell_world_size,
    )
}
