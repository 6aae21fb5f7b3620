// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Shortest-path computation over a [`Graph`], grounded in `rinad`'s
//! `DijkstraAlgorithm`/`PredecessorInfo`. Produces a forwarding table:
//! destination address to the egress port for the first hop.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use common::{Address, PortId};

use crate::graph::Graph;

/// Destination address -> egress port for the first hop of its shortest
/// path from the local node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingTable {
    routes: HashMap<Address, PortId>,
}

impl ForwardingTable {
    #[must_use]
    pub fn egress_for(&self, destination: Address) -> Option<PortId> {
        self.routes.get(&destination).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (Address, PortId)> + '_ {
        self.routes.iter().map(|(&a, &p)| (a, p))
    }
}

/// Per-vertex predecessor bookkeeping, mirroring `PredecessorInfo`: the
/// neighbor one hop closer to the source, and the egress port to reach
/// it, so the full path can be walked back to the first hop.
#[derive(Debug, Clone, Copy)]
struct Predecessor {
    via: Address,
    first_hop_port: PortId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEntry {
    cost: u32,
    vertex: Address,
}

impl Ord for HeapEntry {
    /// Reversed so `BinaryHeap` (a max-heap) pops the lowest cost first;
    /// ties broken by smaller address first for determinism.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs Dijkstra from `source` over `graph`, producing a forwarding
/// table for every other reachable vertex.
#[must_use]
pub fn shortest_paths(graph: &Graph, source: Address) -> ForwardingTable {
    let mut dist: HashMap<Address, u32> = HashMap::new();
    let mut pred: HashMap<Address, Predecessor> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0);
    heap.push(HeapEntry { cost: 0, vertex: source });

    while let Some(HeapEntry { cost, vertex }) = heap.pop() {
        if cost > *dist.get(&vertex).unwrap_or(&u32::MAX) {
            continue;
        }

        let mut edges: Vec<_> = graph.edges_from(vertex).to_vec();
        // Deterministic relaxation order: smaller neighbor address
        // first, then smaller port, matching the tie-break the
        // forwarding-table construction promises.
        edges.sort_by(|a, b| a.neighbor.cmp(&b.neighbor).then(a.egress_port.cmp(&b.egress_port)));

        for edge in edges {
            let next_cost = cost + edge.weight;
            let better = next_cost < *dist.get(&edge.neighbor).unwrap_or(&u32::MAX);
            let tie_but_smaller = next_cost == *dist.get(&edge.neighbor).unwrap_or(&u32::MAX)
                && pred
                    .get(&edge.neighbor)
                    .is_some_and(|p| (vertex, edge.egress_port) < (p.via, p.first_hop_port));

            if better || tie_but_smaller {
                dist.insert(edge.neighbor, next_cost);
                let first_hop_port = if vertex == source {
                    edge.egress_port
                } else {
                    pred.get(&vertex).map_or(edge.egress_port, |p| p.first_hop_port)
                };
                pred.insert(edge.neighbor, Predecessor { via: vertex, first_hop_port });
                heap.push(HeapEntry { cost: next_cost, vertex: edge.neighbor });
            }
        }
    }

    let mut routes = HashMap::new();
    for (destination, predecessor) in pred {
        routes.insert(destination, predecessor.first_hop_port);
    }
    ForwardingTable { routes }
}
