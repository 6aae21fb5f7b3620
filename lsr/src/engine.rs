// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Wires the FSO database, the routing graph/Dijkstra computation, and
//! forwarding-table publication together into the one type other crates
//! depend on.

use concurrency::slot::Slot;
use concurrency::sync::{Arc, Mutex};
use tracectl::{LevelFilter, trace_target};

use common::{Address, PortId, Result};

use crate::config::LsrConfig;
use crate::database::FsoDatabase;
use crate::dijkstra::{self, ForwardingTable};
use crate::graph::Graph;
use crate::transport::LsrTransport;

trace_target!("lsr", LevelFilter::INFO, &[]);

/// The Link-State Routing Core for one node.
///
/// # Thread Safety
///
/// The FSO database is mutated only under `state`, a single coarse lock
/// shared by every event reaction (spec §5's "mutated only under the LSR
/// lock"). The forwarding table is republished through a lock-free
/// [`Slot`] so [`Lsr::forwarding_table`] never blocks on the event path.
pub struct Lsr {
    local_address: Address,
    config: LsrConfig,
    state: Mutex<FsoDatabase>,
    table: Slot<ForwardingTable>,
    transport: Arc<dyn LsrTransport>,
}

impl Lsr {
    #[must_use]
    pub fn new(local_address: Address, config: LsrConfig, transport: Arc<dyn LsrTransport>) -> Self {
        let state = Mutex::new(FsoDatabase::new(local_address, config.clone()));
        Self {
            local_address,
            config,
            state,
            table: Slot::new(ForwardingTable::default()),
            transport,
        }
    }

    #[must_use]
    pub fn local_address(&self) -> Address {
        self.local_address
    }

    /// **N-1 flow allocated** reaction: refresh the (self, neighbor) FSO
    /// and recompute routes immediately, since a new edge can only grow
    /// reachability.
    pub fn on_flow_allocated(
        &self,
        local_port: PortId,
        neighbor_address: Address,
        neighbor_port: Option<PortId>,
    ) {
        self.state
            .lock()
            .on_flow_allocated(local_port, neighbor_address, neighbor_port);
        tracing::debug!(target: "lsr", port = local_port.get(), neighbor = neighbor_address.get(), "flow allocated");
        self.recompute_routes();
    }

    /// **N-1 flow deallocated** reaction.
    pub fn on_flow_deallocated(&self, local_port: PortId) {
        self.state.lock().on_flow_deallocated(local_port);
        tracing::debug!(target: "lsr", port = local_port.get(), "flow deallocated");
        self.recompute_routes();
    }

    /// **Remote update received** over N-1 flow `avoid_port`.
    pub fn on_remote_update(&self, avoid_port: PortId, advertised: &[crate::fso::FlowStateObject]) {
        self.state.lock().on_remote_update(avoid_port, advertised);
        self.recompute_routes();
    }

    /// **Periodic age tick**, driven externally at `config.age_period`.
    pub fn age_tick(&self) {
        self.state.lock().age_tick();
        self.recompute_routes();
    }

    /// **Periodic propagation**, driven externally at
    /// `config.propagation_period`: floods every `modified` FSO to every
    /// up neighbor, excluding a destination that is itself the FSO's
    /// `avoid_port` (the neighbor that just told us about it).
    ///
    /// # Errors
    ///
    /// Returns the first transport error encountered; FSOs destined for
    /// a neighbor whose send failed remain `modified` and are retried on
    /// the next tick.
    pub fn propagate(&self) -> Result<()> {
        let (modified, neighbors) = {
            let db = self.state.lock();
            let modified = db.modified();
            let neighbors: Vec<(Address, PortId)> = db
                .iter()
                .filter(|fso| fso.address == self.local_address && fso.up)
                .filter_map(|fso| fso.port_id.map(|port| (fso.neighbor_address, port)))
                .collect();
            (modified, neighbors)
        };

        if modified.is_empty() {
            return Ok(());
        }
        tracing::trace!(target: "lsr", count = modified.len(), "propagating modified fsos");

        // An FSO clears `modified` only once every destination it was due
        // to reach has confirmed the send; a failure anywhere keeps it
        // modified so the next periodic pass retries it everywhere (a
        // harmless redundant re-send to destinations that already got it,
        // per spec's "propagation is best-effort" policy).
        let mut failed_keys = std::collections::HashSet::new();
        let mut first_err = None;
        for (_neighbor_address, egress_port) in &neighbors {
            let send_set: Vec<_> = modified
                .iter()
                .filter(|fso| fso.avoid_port != Some(*egress_port))
                .cloned()
                .collect();
            if send_set.is_empty() {
                continue;
            }
            if let Err(err) = self.transport.advertise(*egress_port, &send_set) {
                failed_keys.extend(send_set.iter().map(crate::fso::FlowStateObject::key));
                first_err.get_or_insert(err);
            }
        }

        let cleared: Vec<_> = modified
            .iter()
            .map(crate::fso::FlowStateObject::key)
            .filter(|key| !failed_keys.contains(key))
            .collect();
        self.state.lock().clear_modified(cleared);

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// **Periodic routing recomputation**, driven externally at
    /// `config.routing_period`, or called eagerly after any event that
    /// can change reachability.
    pub fn recompute_routes(&self) {
        let db = self.state.lock();
        let fsos: Vec<_> = db.iter().cloned().collect();
        drop(db);
        let graph = Graph::build(&fsos, self.config.max_age);
        let table = dijkstra::shortest_paths(&graph, self.local_address);
        self.table.store(table);
    }

    #[must_use]
    pub fn forwarding_table(&self) -> Arc<ForwardingTable> {
        self.table.load()
    }
}
