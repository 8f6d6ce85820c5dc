//! The lock-free transposition cache (§4.4).
//!
//! A flat, fixed-capacity, power-of-two table of slots. Each slot packs a
//! 64-bit stored hash alongside a 60-bit count / 4-bit depth word — the
//! same layout as the C++ original's `PerftTableEntry` bitfield union, kept
//! here as a single 128-bit atomic record (`portable_atomic::AtomicU128`,
//! since stable `std` has no 128-bit atomic) rather than two independent
//! 64-bit stores. The original holds hash+depth+count in one
//! `std::atomic<PerftTableEntry>` and writes it with a `compare_exchange_weak`
//! loop (search.cpp); mirrored here so a reader can never observe a hash
//! from one writer paired with a data word from a different, unrelated
//! update to the same slot. A lookup miss from a genuine hash mismatch is
//! still the cache's existing tolerance for collisions and stale entries
//! (§4.4: "there is no secondary probing, no generation counter, and no
//! locking") — only the torn-read hazard between concurrent writers is
//! eliminated.

use crate::error::PerftError;
use portable_atomic::AtomicU128;
use std::sync::atomic::Ordering;

/// Below this many bytes we give up rather than keep halving forever.
const MIN_CACHE_BYTES: usize = 1 << 20; // ~1 MiB

const COUNT_BITS: u32 = 60;
const COUNT_MASK: u64 = (1u64 << COUNT_BITS) - 1;

#[repr(align(16))]
struct Slot {
    /// High 64 bits: stored hash. Low 64 bits: `(depth << COUNT_BITS) | count`.
    record: AtomicU128,
}

impl Slot {
    const fn zero() -> Self {
        Slot {
            record: AtomicU128::new(0),
        }
    }
}

#[inline]
fn pack(hash: u64, data: u64) -> u128 {
    ((hash as u128) << 64) | data as u128
}

#[inline]
fn unpack(record: u128) -> (u64, u64) {
    ((record >> 64) as u64, record as u64)
}

/// Fixed-capacity, lock-free perft transposition cache keyed by
/// `position.hash XOR zobrist.depth_salt[depth]`.
pub struct PerftCache {
    slots: Vec<Slot>,
    mask: u64,
}

impl PerftCache {
    /// Allocates a cache sized to the largest power-of-two slot count that
    /// fits within `byte_budget`. On allocation failure, halves the
    /// request and retries down to `MIN_CACHE_BYTES`; if even that fails,
    /// returns `CacheAllocationFailed` (§5, §7).
    pub fn with_byte_budget(byte_budget: usize) -> Result<Self, PerftError> {
        let slot_size = std::mem::size_of::<Slot>();
        let mut budget = byte_budget;
        loop {
            let capacity = largest_pow2_slot_count(budget, slot_size);
            match try_allocate(capacity) {
                Some(slots) => {
                    return Ok(PerftCache {
                        slots,
                        mask: (capacity as u64) - 1,
                    })
                }
                None if budget > MIN_CACHE_BYTES => budget /= 2,
                None => return Err(PerftError::CacheAllocationFailed { requested_bytes: byte_budget }),
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    /// §4.4 lookup: returns the memoised count iff the slot's stored hash
    /// matches `key` (which already includes the depth salt) and the
    /// stored depth matches `depth`.
    #[inline]
    pub fn lookup(&self, key: u64, depth: u8) -> Option<u64> {
        let slot = &self.slots[self.index(key)];
        let (stored_hash, data) = unpack(slot.record.load(Ordering::Acquire));
        if stored_hash != key || stored_hash == 0 {
            return None;
        }
        let stored_depth = (data >> COUNT_BITS) as u8;
        if stored_depth != depth {
            return None;
        }
        Some(data & COUNT_MASK)
    }

    /// §4.4 update: writes hash, depth and count as one atomic 128-bit
    /// record via a `compare_exchange_weak` retry loop, mirroring the
    /// original's `std::atomic<PerftTableEntry>` update. Displacement of an
    /// unrelated entry already occupying this slot is intentional (§4.4);
    /// what the CAS loop rules out is a *reader* ever observing a hash from
    /// one write paired with a count/depth word from a different,
    /// concurrent write to the same slot.
    #[inline]
    pub fn store(&self, key: u64, depth: u8, count: u64) {
        debug_assert!(count <= COUNT_MASK, "perft subtree count exceeds 60 bits");
        let slot = &self.slots[self.index(key)];
        let data = ((depth as u64) << COUNT_BITS) | (count & COUNT_MASK);
        let new_record = pack(key, data);
        let mut current = slot.record.load(Ordering::Relaxed);
        while let Err(observed) =
            slot.record.compare_exchange_weak(current, new_record, Ordering::Release, Ordering::Relaxed)
        {
            current = observed;
        }
    }

    /// Zeroes every slot without reallocating (teacher-idiom `clear`, used
    /// between independent perft runs that must not see stale subtree
    /// counts from a different position).
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.record.store(0, Ordering::Relaxed);
        }
    }
}

fn largest_pow2_slot_count(byte_budget: usize, slot_size: usize) -> usize {
    let mut entries: usize = 1;
    while entries.saturating_mul(slot_size) < byte_budget {
        entries <<= 1;
    }
    (entries >> 1).max(1)
}

fn try_allocate(capacity: usize) -> Option<Vec<Slot>> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity).ok()?;
    slots.resize_with(capacity, Slot::zero);
    Some(slots)
}
