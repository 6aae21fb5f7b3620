// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Builds an undirected routing graph from the FSO database. Mirrors
//! `rinad`'s `Graph`/`Edge`/`CheckedVertex` construction: a vertex per
//! address, an edge only where both directions of a neighbor pair agree
//! the link is up.

use std::collections::{BTreeSet, HashMap};

use common::{Address, PortId};

use crate::fso::{FlowStateObject, FsoKey};

/// One hop out of a vertex: the neighbor reached, the local egress port
/// to use, and the edge weight (always 1 until a metric policy is
/// wired in, matching the teacher's "ok hand-rolled" Dijkstra weight).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub neighbor: Address,
    pub egress_port: PortId,
    pub weight: u32,
}

/// Adjacency-list view of the DIF, built fresh from the FSO database on
/// every routing recomputation.
#[derive(Debug, Default)]
pub struct Graph {
    adjacency: HashMap<Address, Vec<Edge>>,
}

impl Graph {
    /// Builds the graph from every FSO considered routable at `max_age`.
    /// Per spec §3, an edge `a -> b` requires *both* `a`'s FSO to `b` and
    /// `b`'s FSO to `a` to be present and routable; a one-sided
    /// advertisement (the peer hasn't flooded its half yet, or its half
    /// has aged out) contributes no edge.
    #[must_use]
    pub fn build<'a>(fsos: impl IntoIterator<Item = &'a FlowStateObject>, max_age: u32) -> Self {
        let mut by_key: HashMap<FsoKey, &FlowStateObject> = HashMap::new();
        let mut vertices: BTreeSet<Address> = BTreeSet::new();

        let fsos: Vec<&FlowStateObject> = fsos.into_iter().collect();
        for fso in &fsos {
            vertices.insert(fso.address);
            vertices.insert(fso.neighbor_address);
            by_key.insert(fso.key(), fso);
        }

        let mut adjacency: HashMap<Address, Vec<Edge>> = HashMap::new();
        for fso in &fsos {
            let (Some(port), true) = (fso.port_id, fso.is_routable(max_age)) else {
                continue;
            };
            let reverse_routable = by_key
                .get(&(fso.neighbor_address, fso.address))
                .is_some_and(|reverse| reverse.is_routable(max_age));
            if !reverse_routable {
                continue;
            }
            adjacency.entry(fso.address).or_default().push(Edge {
                neighbor: fso.neighbor_address,
                egress_port: port,
                weight: 1,
            });
        }

        for vertex in vertices {
            adjacency.entry(vertex).or_default();
        }

        Self { adjacency }
    }

    #[must_use]
    pub fn vertices(&self) -> impl Iterator<Item = Address> + '_ {
        self.adjacency.keys().copied()
    }

    #[must_use]
    pub fn edges_from(&self, vertex: Address) -> &[Edge] {
        self.adjacency.get(&vertex).map_or(&[], Vec::as_slice)
    }
}
