// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The FSO database: keyed storage for every `FlowStateObject` this node
//! knows about, plus the event reactions the routing core contract
//! specifies (N-1 flow up/down, periodic ageing, remote updates).

use std::collections::HashMap;

use common::{Address, PortId};

use crate::config::LsrConfig;
use crate::fso::{FsoKey, FlowStateObject};

/// Mutable FSO storage, the ageing/grace-timer state machine, and the
/// propagation queue. Not `Sync` on its own; [`crate::Lsr`] wraps it in
/// the workspace's single coarse lock, per the concurrency model's "FSO
/// database is mutated only under the LSR lock" rule.
pub struct FsoDatabase {
    local_address: Address,
    config: LsrConfig,
    objects: HashMap<FsoKey, FlowStateObject>,
    /// Ticks remaining before a `being_erased` FSO is dropped. Absent
    /// entries are not yet armed.
    grace: HashMap<FsoKey, u32>,
}

impl FsoDatabase {
    #[must_use]
    pub fn new(local_address: Address, config: LsrConfig) -> Self {
        Self {
            local_address,
            config,
            objects: HashMap::new(),
            grace: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &FsoKey) -> Option<&FlowStateObject> {
        self.objects.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowStateObject> {
        self.objects.values()
    }

    fn arm_grace(&mut self, key: FsoKey) {
        self.grace.entry(key).or_insert_with(|| self.config.grace_ticks());
        if let Some(fso) = self.objects.get_mut(&key) {
            fso.being_erased = true;
        }
    }

    /// **N-1 flow allocated** to `neighbor_address` on `local_port`: add
    /// or refresh the (self, neighbor) FSO.
    pub fn on_flow_allocated(
        &mut self,
        local_port: PortId,
        neighbor_address: Address,
        neighbor_port: Option<PortId>,
    ) {
        let key = (self.local_address, neighbor_address);
        self.grace.remove(&key);
        let entry = self.objects.entry(key).or_insert_with(|| FlowStateObject {
            address: self.local_address,
            port_id: Some(local_port),
            neighbor_address,
            neighbor_port_id: neighbor_port,
            up: false,
            sequence_number: 0,
            age: 0,
            modified: false,
            avoid_port: None,
            being_erased: false,
        });
        entry.port_id = Some(local_port);
        entry.neighbor_port_id = neighbor_port;
        entry.up = true;
        entry.sequence_number += 1;
        entry.age = 0;
        entry.modified = true;
        entry.being_erased = false;
    }

    /// **N-1 flow deallocated** on `local_port`: find the FSO this port
    /// backs and mark it down, arming its grace timer.
    pub fn on_flow_deallocated(&mut self, local_port: PortId) {
        let key = self
            .objects
            .values()
            .find(|fso| fso.port_id == Some(local_port))
            .map(FlowStateObject::key);
        let Some(key) = key else { return };
        if let Some(fso) = self.objects.get_mut(&key) {
            fso.up = false;
            fso.age = self.config.max_age;
            fso.sequence_number += 1;
            fso.avoid_port = None;
            fso.modified = true;
        }
        self.arm_grace(key);
    }

    /// **Periodic age tick:** age every FSO, arm grace timers for any
    /// that just crossed `max_age`, and count down already-armed grace
    /// timers, removing entries whose timer has expired.
    pub fn age_tick(&mut self) {
        let mut newly_stale = Vec::new();
        for fso in self.objects.values_mut() {
            fso.age = fso.age.saturating_add(1);
            if fso.age >= self.config.max_age && !fso.being_erased {
                newly_stale.push(fso.key());
            }
        }
        for key in newly_stale {
            self.arm_grace(key);
        }

        let mut expired = Vec::new();
        for (key, remaining) in &mut self.grace {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                expired.push(*key);
            }
        }
        for key in expired {
            self.grace.remove(&key);
            self.objects.remove(&key);
        }
    }

    /// **Remote update received over N-1 flow `avoid_port`:** applies
    /// each advertised FSO per the sequence-number comparison rules.
    pub fn on_remote_update(&mut self, avoid_port: PortId, advertised: &[FlowStateObject]) {
        for incoming in advertised {
            let key = incoming.key();
            match self.objects.get_mut(&key) {
                None => {
                    if incoming.is_self_advertisement(self.local_address) {
                        continue;
                    }
                    let mut fso = incoming.clone();
                    fso.avoid_port = Some(avoid_port);
                    fso.modified = true;
                    fso.being_erased = false;
                    self.objects.insert(key, fso);
                }
                Some(existing) => {
                    if incoming.sequence_number <= existing.sequence_number {
                        continue;
                    }
                    existing.age = incoming.age;
                    existing.up = incoming.up;
                    existing.sequence_number = incoming.sequence_number;
                    existing.neighbor_port_id = incoming.neighbor_port_id;
                    if incoming.is_self_advertisement(self.local_address) {
                        existing.sequence_number += 1;
                        existing.avoid_port = None;
                    } else {
                        existing.avoid_port = Some(avoid_port);
                    }
                    existing.modified = true;
                }
            }
        }
    }

    /// Every FSO currently marked `modified`, for the propagation pass.
    #[must_use]
    pub fn modified(&self) -> Vec<FlowStateObject> {
        self.objects
            .values()
            .filter(|fso| fso.modified)
            .cloned()
            .collect()
    }

    /// Clears `modified` (and the per-destination `avoid_port`) on a set
    /// of keys that have just been successfully propagated.
    pub fn clear_modified(&mut self, keys: impl IntoIterator<Item = FsoKey>) {
        for key in keys {
            if let Some(fso) = self.objects.get_mut(&key) {
                fso.modified = false;
                fso.avoid_port = None;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn db() -> FsoDatabase {
        FsoDatabase::new(Address::new(1), LsrConfig::default())
    }

    #[test]
    fn flow_allocated_creates_self_fso() {
        let mut db = db();
        db.on_flow_allocated(PortId::new(10).unwrap(), Address::new(2), PortId::new(20));
        let fso = db.get(&(Address::new(1), Address::new(2))).unwrap();
        assert!(fso.up);
        assert_eq!(fso.sequence_number, 1);
        assert_eq!(fso.age, 0);
        assert!(fso.modified);
    }

    #[test]
    fn flow_deallocated_marks_down_and_arms_grace() {
        let mut db = db();
        let port = PortId::new(10).unwrap();
        db.on_flow_allocated(port, Address::new(2), PortId::new(20));
        db.clear_modified([(Address::new(1), Address::new(2))]);

        db.on_flow_deallocated(port);
        let fso = db.get(&(Address::new(1), Address::new(2))).unwrap();
        assert!(!fso.up);
        assert_eq!(fso.age, db.config.max_age);
        assert!(fso.modified);
        assert!(fso.being_erased);
    }

    #[test]
    fn grace_timer_removes_object_after_expiry() {
        let mut config = LsrConfig::default();
        config.wait_until_remove_object = std::time::Duration::from_secs(3);
        config.age_period = std::time::Duration::from_secs(1);
        let mut db = FsoDatabase::new(Address::new(1), config);
        let port = PortId::new(10).unwrap();
        db.on_flow_allocated(port, Address::new(2), PortId::new(20));
        db.on_flow_deallocated(port);

        assert!(db.get(&(Address::new(1), Address::new(2))).is_some());
        for _ in 0..3 {
            db.age_tick();
        }
        assert!(db.get(&(Address::new(1), Address::new(2))).is_none());
    }

    #[test]
    fn self_advertisement_echo_is_discarded() {
        let mut db = db();
        let echoed = FlowStateObject {
            address: Address::new(1),
            port_id: None,
            neighbor_address: Address::new(9),
            neighbor_port_id: None,
            up: true,
            sequence_number: 1,
            age: 0,
            modified: true,
            avoid_port: None,
            being_erased: false,
        };
        db.on_remote_update(PortId::new(3).unwrap(), &[echoed]);
        assert!(db.get(&(Address::new(1), Address::new(9))).is_none());
    }

    #[test]
    fn unknown_foreign_fso_is_installed_with_avoid_port() {
        let mut db = db();
        let foreign = FlowStateObject {
            address: Address::new(5),
            port_id: None,
            neighbor_address: Address::new(6),
            neighbor_port_id: None,
            up: true,
            sequence_number: 1,
            age: 0,
            modified: false,
            avoid_port: None,
            being_erased: false,
        };
        let q = PortId::new(7).unwrap();
        db.on_remote_update(q, &[foreign]);
        let fso = db.get(&(Address::new(5), Address::new(6))).unwrap();
        assert_eq!(fso.avoid_port, Some(q));
        assert!(fso.modified);
    }

    #[test]
    fn stale_sequence_number_is_dropped() {
        let mut db = db();
        let q = PortId::new(7).unwrap();
        let foreign = FlowStateObject {
            address: Address::new(5),
            port_id: None,
            neighbor_address: Address::new(6),
            neighbor_port_id: None,
            up: true,
            sequence_number: 5,
            age: 0,
            modified: false,
            avoid_port: None,
            being_erased: false,
        };
        db.on_remote_update(q, &[foreign.clone()]);
        db.clear_modified([(Address::new(5), Address::new(6))]);

        let mut stale = foreign;
        stale.sequence_number = 3;
        stale.up = false;
        db.on_remote_update(q, &[stale]);

        let fso = db.get(&(Address::new(5), Address::new(6))).unwrap();
        assert!(fso.up);
        assert!(!fso.modified);
    }

    #[test]
    fn self_fso_reasserted_by_peer_bumps_sequence_instead_of_overwriting() {
        let mut db = db();
        let port = PortId::new(10).unwrap();
        db.on_flow_allocated(port, Address::new(2), PortId::new(20));
        let before = db.get(&(Address::new(1), Address::new(2))).unwrap().clone();

        let reassert = FlowStateObject {
            sequence_number: before.sequence_number + 10,
            ..before.clone()
        };
        db.on_remote_update(PortId::new(99).unwrap(), &[reassert]);

        let after = db.get(&(Address::new(1), Address::new(2))).unwrap();
        assert_eq!(after.sequence_number, before.sequence_number + 1);
        assert_eq!(after.avoid_port, None);
    }

    /// Testable property 7: without intervening updates, an FSO's age is
    /// non-decreasing per tick, for any number of ticks.
    #[test]
    fn age_is_monotonic_across_an_arbitrary_number_of_ticks() {
        bolero::check!().with_type::<u8>().for_each(|ticks: &u8| {
            let mut db = db();
            db.on_flow_allocated(PortId::new(10).unwrap(), Address::new(2), PortId::new(20));

            let mut previous_age = 0;
            for _ in 0..*ticks {
                db.age_tick();
                let Some(fso) = db.get(&(Address::new(1), Address::new(2))) else {
                    // grace timer expired and removed the object; age can
                    // no longer regress from here since it no longer exists.
                    return;
                };
                assert!(fso.age >= previous_age);
                previous_age = fso.age;
            }
        });
    }
}
