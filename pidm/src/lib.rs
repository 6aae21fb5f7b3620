// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Port-ID Manager: a bitmap allocator handing out [`PortId`]s.
//!
//! Mirrors IRATI's `pidm.c`: a zeroed bitmap, `allocate` finds the first
//! clear bit and sets it, `release` clears it again. The on-wire identity
//! returned to callers is `bit_index + 1`, since `0` is reserved to mean
//! "no port id" ([`PortId`] is a `NonZeroU32`) — see
//! [`PortId::bitmap_index`].

use common::PortId;
use concurrency::sync::Mutex;
use tracectl::{LevelFilter, trace_target};

trace_target!("pidm", LevelFilter::INFO, &[]);

/// Number of bits IRATI's kernel module sizes its bitmap to
/// (`(2 << BITS_PER_BYTE) * sizeof(port_id_t)` with an 8-bit byte and a
/// 32-bit `port_id_t`). Kept only as a documented reference point: this
/// crate takes its capacity as a constructor argument instead of a
/// hardcoded constant, so tests can afford to exhaust a small allocator.
pub const IRATI_REFERENCE_BITMAP_BITS: usize = 2048;

/// Default capacity for [`PortIdManager::new`], generous enough that no
/// real deployment should ever observe [`PidmError::Exhausted`].
pub const DEFAULT_CAPACITY_BITS: usize = 2 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PidmError {
    #[error("port-id bitmap is full")]
    Exhausted,
    #[error("port {0} is out of range for this bitmap's capacity")]
    OutOfRange(u32),
    #[error("port {0} is not currently allocated")]
    NotAllocated(u32),
}

impl From<PidmError> for common::RinaError {
    fn from(err: PidmError) -> Self {
        match err {
            PidmError::Exhausted => common::RinaError::OutOfPortIds,
            PidmError::OutOfRange(id) | PidmError::NotAllocated(id) => {
                common::RinaError::UnknownFlow(id)
            }
        }
    }
}

const WORD_BITS: usize = u64::BITS as usize;

/// A bitmap of `port_id - 1 -> in use` backed by a coarse mutex; allocation
/// and release are rare enough next to flow I/O that there is no benefit
/// to anything lock-free here (unlike [`concurrency::slot`]).
#[derive(Debug)]
pub struct PortIdManager {
    bits: Mutex<Vec<u64>>,
    capacity: usize,
}

impl Default for PortIdManager {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY_BITS)
    }
}

impl PortIdManager {
    /// Builds an allocator with room for `capacity_bits` distinct port ids.
    #[must_use]
    pub fn with_capacity(capacity_bits: usize) -> Self {
        let words = capacity_bits.div_ceil(WORD_BITS);
        Self {
            bits: Mutex::new(vec![0u64; words]),
            capacity: capacity_bits,
        }
    }

    /// Same sizing IRATI uses, documented at [`DEFAULT_CAPACITY_BITS`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Finds the first clear bit, sets it, and returns `bit_index + 1` as
    /// a [`PortId`].
    pub fn allocate(&self) -> Result<PortId, PidmError> {
        let mut bits = self.bits.lock();
        for (word_idx, word) in bits.iter_mut().enumerate() {
            if *word == u64::MAX {
                continue;
            }
            let bit = word.trailing_ones() as usize;
            let index = word_idx * WORD_BITS + bit;
            if index >= self.capacity {
                break;
            }
            *word |= 1 << bit;
            let raw = u32::try_from(index + 1).map_err(|_| PidmError::Exhausted)?;
            let id = PortId::new(raw).ok_or(PidmError::Exhausted)?;
            tracing::debug!(target: "pidm", port = raw, "allocated");
            return Ok(id);
        }
        tracing::warn!(target: "pidm", capacity = self.capacity, "bitmap exhausted");
        Err(PidmError::Exhausted)
    }

    /// Clears the bit backing `id`. Idempotent: releasing an id that is
    /// not currently set is a caller error the same way IRATI's
    /// `pidm_release` treats a bad id, not a silent no-op.
    pub fn release(&self, id: PortId) -> Result<(), PidmError> {
        let index = id.bitmap_index() as usize;
        if index >= self.capacity {
            return Err(PidmError::OutOfRange(id.get()));
        }
        let mut bits = self.bits.lock();
        let word_idx = index / WORD_BITS;
        let bit = index % WORD_BITS;
        let mask = 1u64 << bit;
        if bits[word_idx] & mask == 0 {
            return Err(PidmError::NotAllocated(id.get()));
        }
        bits[word_idx] &= !mask;
        tracing::debug!(target: "pidm", port = id.get(), "released");
        Ok(())
    }

    /// Whether `id`'s bit is currently set.
    #[must_use]
    pub fn is_allocated(&self, id: PortId) -> bool {
        let index = id.bitmap_index() as usize;
        if index >= self.capacity {
            return false;
        }
        let bits = self.bits.lock();
        bits[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_allocation_is_port_one() {
        let pidm = PortIdManager::with_capacity(8);
        let id = pidm.allocate().unwrap();
        assert_eq!(id.get(), 1);
    }

    #[test]
    fn released_ids_are_reused() {
        let pidm = PortIdManager::with_capacity(8);
        let first = pidm.allocate().unwrap();
        pidm.release(first).unwrap();
        let second = pidm.allocate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn exhaustion_is_reported_not_panicked() {
        let pidm = PortIdManager::with_capacity(4);
        for _ in 0..4 {
            pidm.allocate().unwrap();
        }
        assert_eq!(pidm.allocate(), Err(PidmError::Exhausted));
    }

    #[test]
    fn release_of_unallocated_id_is_an_error() {
        let pidm = PortIdManager::with_capacity(8);
        let id = PortId::new(3).unwrap();
        assert_eq!(pidm.release(id), Err(PidmError::NotAllocated(3)));
    }

    #[test]
    fn release_out_of_range_id_is_an_error() {
        let pidm = PortIdManager::with_capacity(4);
        let id = PortId::new(100).unwrap();
        assert_eq!(pidm.release(id), Err(PidmError::OutOfRange(100)));
    }

    #[test]
    fn allocations_never_collide_across_a_full_bitmap() {
        let pidm = PortIdManager::with_capacity(256);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..256 {
            let id = pidm.allocate().unwrap();
            assert!(seen.insert(id), "port id {id} allocated twice");
        }
        assert_eq!(pidm.allocate(), Err(PidmError::Exhausted));
    }

    #[test]
    fn bolero_allocate_release_bijection() {
        bolero::check!()
            .with_type::<Vec<bool>>()
            .for_each(|ops| {
                let pidm = PortIdManager::with_capacity(64);
                let mut held = Vec::new();
                for &do_allocate in ops {
                    if do_allocate || held.is_empty() {
                        if let Ok(id) = pidm.allocate() {
                            held.push(id);
                        }
                    } else {
                        let id = held.swap_remove(0);
                        pidm.release(id).unwrap();
                    }
                }
                for id in held {
                    assert!(pidm.is_allocated(id));
                }
            });
    }
}
