// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Loopback fixtures standing in for the N-1 providers, LSR transports,
//! and supplicant control channels a real deployment would wire KFA,
//! LSR, and the Shim-WiFi STA machine against.

use std::collections::HashMap;

use common::{PortId, Result, Sdu};
use concurrency::sync::{Arc, Mutex};

use kfa::{Kfa, IpcpProvider};
use lsr::{FlowStateObject, Lsr, LsrTransport};
use shim_wifi::{DisableTarget, NetworkId, ScanResult, SupplicantControl};

/// An `IpcpProvider` that loops SDUs written on one `Kfa` straight into
/// `sdu_post` on a peer `Kfa`, as if the two ports were opposite ends of
/// one N-1 flow. Mirrors spec §9's "S1 Basic echo" scenario wiring.
pub struct LoopbackProvider {
    peer: Arc<Kfa>,
    peer_port: PortId,
}

impl LoopbackProvider {
    #[must_use]
    pub fn new(peer: Arc<Kfa>, peer_port: PortId) -> Arc<Self> {
        Arc::new(Self { peer, peer_port })
    }
}

impl IpcpProvider for LoopbackProvider {
    fn sdu_write(&self, _port: PortId, sdu: Sdu) -> Result<()> {
        self.peer
            .sdu_post(self.peer_port, sdu)
            .map_err(std::convert::Into::into)
    }
}

/// An `N-1` network of `Lsr` nodes linked the way `rina-kfa` would wire
/// real N-1 flows between IPCPs: `advertise` on one node's egress port
/// delivers straight into `on_remote_update` on the peer at the other
/// end, tagged with the ingress port the peer sees it on.
pub struct LoopbackLsrNetwork {
    links: Mutex<HashMap<PortId, (PortId, Arc<Lsr>)>>,
}

impl LoopbackLsrNetwork {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self { links: Mutex::new(HashMap::new()) })
    }

    pub fn link(&self, egress_port: PortId, ingress_port: PortId, peer: Arc<Lsr>) {
        self.links.lock().insert(egress_port, (ingress_port, peer));
    }
}

impl LsrTransport for LoopbackLsrNetwork {
    fn advertise(&self, egress_port: PortId, fsos: &[FlowStateObject]) -> Result<()> {
        if let Some((ingress_port, peer)) = self.links.lock().get(&egress_port) {
            peer.on_remote_update(*ingress_port, fsos);
        }
        Ok(())
    }
}

/// A scripted supplicant for the Shim-WiFi scenario: `select_network`/
/// `set_bssid` always succeed, and `scan_results` reports one fixed
/// access point for the DIF named in the enrollment request.
pub struct ScriptedSupplicant {
    pub launched_interface: Mutex<Option<String>>,
    pub disabled_all: Mutex<bool>,
}

impl Default for ScriptedSupplicant {
    fn default() -> Self {
        Self {
            launched_interface: Mutex::new(None),
            disabled_all: Mutex::new(false),
        }
    }
}

impl ScriptedSupplicant {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl SupplicantControl for ScriptedSupplicant {
    fn launch(&self, interface: &str) -> Result<()> {
        *self.launched_interface.lock() = Some(interface.to_owned());
        Ok(())
    }
    fn enable_network(&self, _id: NetworkId) -> Result<()> {
        Ok(())
    }
    fn disable_network(&self, target: DisableTarget) -> Result<()> {
        if matches!(target, DisableTarget::All) {
            *self.disabled_all.lock() = true;
        }
        Ok(())
    }
    fn select_network(&self, _id: NetworkId) -> Result<()> {
        Ok(())
    }
    fn set_bssid(&self, _id: NetworkId, _bssid: &str) -> Result<()> {
        Ok(())
    }
    fn reassociate(&self) -> Result<()> {
        Ok(())
    }
    fn disconnect(&self) -> Result<()> {
        Ok(())
    }
    fn scan(&self) -> Result<()> {
        Ok(())
    }
    fn scan_results(&self) -> Result<Vec<(String, ScanResult)>> {
        Ok(Vec::new())
    }
}
