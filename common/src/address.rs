// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! DIF-scoped node addresses, as carried by Flow-State Objects and the
//! forwarding table. The IRATI routing policy represents addresses as a
//! plain `unsigned int`; we keep that shape rather than inventing a richer
//! address type the spec never asks for.

use std::fmt;

/// A node's address within a single DIF.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u32);

impl Address {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Address {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
