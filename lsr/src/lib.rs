// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The Link-State Routing Core: floods Flow-State Objects across a DIF's
//! N-1 flows and derives a forwarding table from the resulting topology
//! via Dijkstra's algorithm.

pub mod config;
pub mod database;
pub mod dijkstra;
pub mod engine;
pub mod error;
pub mod fso;
pub mod graph;
pub mod transport;

pub use config::{LsrConfig, LsrConfigBuilder};
pub use dijkstra::ForwardingTable;
pub use engine::Lsr;
pub use error::LsrError;
pub use fso::{FlowStateObject, FsoKey};
pub use graph::{Edge, Graph};
pub use transport::LsrTransport;

#[cfg(test)]
mod test {
    use super::*;
    use common::{Address, PortId, Result};
    use concurrency::sync::{Arc, Mutex};
    use std::collections::HashMap;

    /// Routes an `advertise` call on one egress port straight into the
    /// peer at the other end of that link, as if it were a real N-1
    /// flow. One instance is shared per node, so a single node can carry
    /// several neighbor links behind one transport, matching
    /// `Lsr::new`'s one-transport-per-node shape.
    struct LoopbackNetwork {
        /// egress port on this node -> (ingress port the peer sees it
        /// on, the peer's `Lsr`).
        links: Mutex<HashMap<PortId, (PortId, Arc<Lsr>)>>,
    }

    impl LoopbackNetwork {
        fn new() -> Arc<Self> {
            Arc::new(Self { links: Mutex::new(HashMap::new()) })
        }

        fn link(&self, egress_port: PortId, ingress_port: PortId, peer: Arc<Lsr>) {
            self.links.lock().insert(egress_port, (ingress_port, peer));
        }
    }

    impl LsrTransport for LoopbackNetwork {
        fn advertise(&self, egress_port: PortId, fsos: &[FlowStateObject]) -> Result<()> {
            if let Some((ingress_port, peer)) = self.links.lock().get(&egress_port) {
                peer.on_remote_update(*ingress_port, fsos);
            }
            Ok(())
        }
    }

    /// A three-node chain (1 - 2 - 3) converges on a forwarding table for
    /// 3 at node 1 that routes via node 2, after flow allocation and one
    /// propagation round relaying node 2's FSOs outward.
    #[test]
    fn three_node_chain_converges_on_multi_hop_route() {
        let net1 = LoopbackNetwork::new();
        let net2 = LoopbackNetwork::new();
        let net3 = LoopbackNetwork::new();

        let node1 = Arc::new(Lsr::new(Address::new(1), LsrConfig::default(), net1.clone()));
        let node2 = Arc::new(Lsr::new(Address::new(2), LsrConfig::default(), net2.clone()));
        let node3 = Arc::new(Lsr::new(Address::new(3), LsrConfig::default(), net3.clone()));

        let port_1_to_2 = PortId::new(12).unwrap();
        let port_2_to_1 = PortId::new(21).unwrap();
        let port_2_to_3 = PortId::new(23).unwrap();
        let port_3_to_2 = PortId::new(32).unwrap();

        net1.link(port_1_to_2, port_2_to_1, node2.clone());
        net2.link(port_2_to_1, port_1_to_2, node1.clone());
        net2.link(port_2_to_3, port_3_to_2, node3.clone());
        net3.link(port_3_to_2, port_2_to_3, node2.clone());

        node1.on_flow_allocated(port_1_to_2, Address::new(2), Some(port_2_to_1));
        node2.on_flow_allocated(port_2_to_1, Address::new(1), Some(port_1_to_2));
        node2.on_flow_allocated(port_2_to_3, Address::new(3), Some(port_3_to_2));
        node3.on_flow_allocated(port_3_to_2, Address::new(2), Some(port_2_to_3));

        // An edge only exists once both halves of it are present in a
        // node's FSO set (spec §3), so node1 needs to learn both node2's
        // and node3's side of the 2-3 link before it can route through
        // it: node2 relays its own FSOs outward, node3 relays its own
        // FSO back to node2, then node2 relays that one on to node1.
        node2.propagate().unwrap();
        node3.propagate().unwrap();
        node2.propagate().unwrap();

        assert_eq!(node1.forwarding_table().egress_for(Address::new(3)), Some(port_1_to_2));
    }
}
