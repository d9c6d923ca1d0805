//! Open-addressing hashmap for `ChunkId → ChunkIdx` lookups.
//!
//! Chunks are never removed during a run and each id is inserted once, so
//! the table only needs lookup, insert and grow:
//! - Robin Hood probing keeps probe chains short and lets misses exit early.
//! - The control word packs an occupied bit, the probe distance and a key
//!   fingerprint, so most mismatches are rejected without touching the key.
//! - Growth goes through `try_reserve`, letting the store surface allocation
//!   failure as an error. Once room is reserved, `insert_reserved` cannot
//!   fail, so a batch of inserts either all land or none do.

use std::collections::TryReserveError;

use super::coords::ChunkId;

/// Dense slot of a chunk inside the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkIdx(pub u32);

impl ChunkIdx {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// Two independent odd multipliers so grid-aligned keys do not cancel out.
const MX: u64 = 0x517c_c1b7_2722_0a95;
const MY: u64 = 0x6c62_272e_07bb_0142;

#[inline(always)]
fn chunk_hash(id: ChunkId) -> u64 {
    (id.x as u64).wrapping_mul(MX) ^ (id.y as u64).wrapping_mul(MY).rotate_right(31)
}

const OCCUPIED_BIT: u32 = 0x8000_0000;
const DIST_SHIFT: u32 = 12;
const DIST_MASK: u32 = 0x7fff_f000;
const FP_MASK: u32 = 0x0000_0fff;
const MATCH_MASK: u32 = OCCUPIED_BIT | FP_MASK;

#[derive(Clone, Copy)]
struct Slot {
    key: ChunkId,
    value: u32,
    /// `0` means empty.
    ctrl: u32,
}

impl Slot {
    const EMPTY: Self = Self {
        key: ChunkId::new(0, 0),
        value: 0,
        ctrl: 0,
    };

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.ctrl == 0
    }

    #[inline(always)]
    fn distance(&self) -> usize {
        ((self.ctrl & DIST_MASK) >> DIST_SHIFT) as usize
    }

    #[inline(always)]
    fn set_distance(&mut self, distance: usize) {
        assert!(
            distance <= (DIST_MASK >> DIST_SHIFT) as usize,
            "ChunkMap probe distance overflow (distance={distance})"
        );
        self.ctrl = (self.ctrl & !DIST_MASK) | ((distance as u32) << DIST_SHIFT);
    }
}

#[inline(always)]
fn match_ctrl_of(hash: u64) -> u32 {
    // High bits pick the fingerprint; low bits pick the bucket.
    OCCUPIED_BIT | ((hash >> 52) as u32 & FP_MASK)
}

// Load factor 1/2.
const LOAD_NUM: usize = 1;
const LOAD_DEN: usize = 2;
const MIN_SLOTS: usize = 16;

pub struct ChunkMap {
    slots: Vec<Slot>,
    len: usize,
    mask: usize,
}

impl ChunkMap {
    pub fn with_capacity(cap: usize) -> Self {
        let slots = slots_for(cap);
        Self {
            slots: vec![Slot::EMPTY; slots],
            len: 0,
            mask: slots - 1,
        }
    }

    pub fn get(&self, id: ChunkId) -> Option<ChunkIdx> {
        let hash = chunk_hash(id);
        let target = match_ctrl_of(hash);
        let mut pos = hash as usize & self.mask;
        let mut dist = 0usize;
        loop {
            let slot = &self.slots[pos];
            // A resident closer to home than we are means our key was never
            // pushed this far.
            if slot.is_empty() || dist > slot.distance() {
                return None;
            }
            if slot.ctrl & MATCH_MASK == target && slot.key == id {
                return Some(ChunkIdx(slot.value));
            }
            pos = (pos + 1) & self.mask;
            dist += 1;
        }
    }

    /// Make room for `additional` more keys. After this succeeds, that many
    /// `insert_reserved` calls will not resize.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = slots_for(self.len.saturating_add(additional));
        if needed > self.slots.len() {
            self.try_resize(needed)?;
        }
        Ok(())
    }

    /// Insert a key that is not in the map yet, into room made by
    /// `try_reserve`.
    pub fn insert_reserved(&mut self, id: ChunkId, value: ChunkIdx) {
        debug_assert!(self.get(id).is_none(), "{id} inserted twice");
        assert!(
            (self.len + 1) * LOAD_DEN <= self.slots.len() * LOAD_NUM,
            "ChunkMap insert without reserved room (len={})",
            self.len
        );
        let hash = chunk_hash(id);
        self.place(Slot {
            key: id,
            value: value.0,
            ctrl: match_ctrl_of(hash),
        });
        self.len += 1;
    }

    pub fn clear(&mut self) {
        self.slots.fill(Slot::EMPTY);
        self.len = 0;
    }

    fn try_resize(&mut self, new_slots: usize) -> Result<(), TryReserveError> {
        debug_assert!(new_slots.is_power_of_two());
        let mut fresh = Vec::new();
        fresh.try_reserve_exact(new_slots)?;
        fresh.resize(new_slots, Slot::EMPTY);
        let old = std::mem::replace(&mut self.slots, fresh);
        self.mask = new_slots - 1;
        for mut slot in old.into_iter().filter(|s| !s.is_empty()) {
            slot.set_distance(0);
            self.place(slot);
        }
        Ok(())
    }

    /// Robin Hood placement of a key known to be absent.
    fn place(&mut self, mut pending: Slot) {
        let mut pos = chunk_hash(pending.key) as usize & self.mask;
        loop {
            let slot = &mut self.slots[pos];
            if slot.is_empty() {
                *slot = pending;
                return;
            }
            if pending.distance() > slot.distance() {
                std::mem::swap(slot, &mut pending);
            }
            pending.set_distance(pending.distance() + 1);
            pos = (pos + 1) & self.mask;
        }
    }
}

fn slots_for(cap: usize) -> usize {
    cap.saturating_mul(LOAD_DEN)
        .div_ceil(LOAD_NUM)
        .next_power_of_two()
        .max(MIN_SLOTS)
}
