// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The Flow-State Object: one node's view of one N-1 flow, as flooded
//! across the DIF.

use std::fmt;

use common::{Address, PortId};

/// A database key: (source address, neighbor address). Matches the FSO
/// database's keying in the routing core contract.
pub type FsoKey = (Address, Address);

/// One node's record of an N-1 flow to a neighbor. Mirrors
/// `rinad`'s `FlowStateObject`, with `avoid_port_`'s `NO_AVOID_PORT`
/// sentinel modeled as `Option<PortId>` instead of a magic `-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStateObject {
    pub address: Address,
    pub port_id: Option<PortId>,
    pub neighbor_address: Address,
    pub neighbor_port_id: Option<PortId>,
    pub up: bool,
    pub sequence_number: u32,
    pub age: u32,
    pub modified: bool,
    pub avoid_port: Option<PortId>,
    pub being_erased: bool,
}

impl FlowStateObject {
    #[must_use]
    pub fn key(&self) -> FsoKey {
        (self.address, self.neighbor_address)
    }

    #[must_use]
    pub fn is_self_advertisement(&self, local_address: Address) -> bool {
        self.address == local_address
    }

    /// Up *and* young enough to be used for routing: spec §4.3.4 ties
    /// both halves of an edge being usable to `age < max_age`, not just
    /// `up`.
    #[must_use]
    pub fn is_routable(&self, max_age: u32) -> bool {
        self.up && self.age < max_age
    }
}

impl fmt::Display for FlowStateObject {
    /// The RIB object name IRATI gives this FSO: `<address>-<neighbor>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.address, self.neighbor_address)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fso(address: u32, neighbor: u32) -> FlowStateObject {
        FlowStateObject {
            address: Address::new(address),
            port_id: PortId::new(1),
            neighbor_address: Address::new(neighbor),
            neighbor_port_id: PortId::new(2),
            up: true,
            sequence_number: 1,
            age: 0,
            modified: true,
            avoid_port: None,
            being_erased: false,
        }
    }

    #[test]
    fn display_matches_rib_object_naming() {
        assert_eq!(fso(1, 2).to_string(), "1-2");
    }

    #[test]
    fn routable_requires_up_and_young() {
        let mut f = fso(1, 2);
        assert!(f.is_routable(100));
        f.age = 100;
        assert!(!f.is_routable(100));
        f.age = 0;
        f.up = false;
        assert!(!f.is_routable(100));
    }
}
