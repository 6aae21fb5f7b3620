// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The node-local flow handle.

use std::fmt;
use std::num::NonZeroU32;

/// A node-local, dense, recycled flow end-point handle.
///
/// `PortId` wraps a [`NonZeroU32`] because the reserved value `0` always
/// signals "invalid" (the IRATI kernel's `port_id_bad()`/`is_port_id_ok()`
/// pair, carried forward here as a type invariant instead of a runtime
/// check). [`PortIdManager::allocate`](../../pidm/struct.PortIdManager.html)
/// returns `index + 1` for exactly this reason: bit index `0` of the
/// underlying bitmap must still map to a nonzero `PortId`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(NonZeroU32);

impl PortId {
    /// Builds a `PortId` from a raw value, returning `None` for `0`.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Builds a `PortId` from a value already known to be nonzero.
    ///
    /// Intended for allocators that have just proven the value is in range
    /// (e.g. `bit_index + 1`); prefer [`PortId::new`] for untrusted input.
    #[must_use]
    pub const fn from_nonzero(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    /// The raw integer value, for logging and wire encoding.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The zero-based bitmap index this port corresponds to in the PIDM.
    #[must_use]
    pub const fn bitmap_index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortId({})", self.0)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PortId {
    type Error = crate::RinaError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        PortId::new(raw).ok_or(crate::RinaError::InvalidArgument("zero is not a valid PortId"))
    }
}
