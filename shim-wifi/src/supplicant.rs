// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The downstream surface the STA state machine requires of the
//! supplicant control channel, grounded in `WpaController`'s request
//! vocabulary (`SCAN`, `SCAN_RESULTS`, `ENABLE_NETWORK`, `DISABLE_NETWORK`,
//! `SELECT_NETWORK`, `BSSID`, `REASSOCIATE`, `DISCONNECT`). Mirrors
//! `kfa::IpcpProvider`/`lsr::LsrTransport`'s shape: mechanism only, no
//! retry policy baked in.

use common::Result;

use crate::scan::ScanResult;

/// `wpa_supplicant`'s network-id identifying a pre-provisioned network
/// entry in its config, the target of `ENABLE_NETWORK`/`SELECT_NETWORK`/
/// `BSSID`.
pub type NetworkId = u32;

/// `DISABLE_NETWORK(id|"all")`'s target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableTarget {
    Network(NetworkId),
    All,
}

/// Request/response and asynchronous-event control channel to the
/// external supplicant process (`wpa_supplicant`/`hostapd`), matching the
/// request set spec §6 names.
///
/// The STA state machine never retries a failed request inline, same as
/// [`kfa::IpcpProvider::sdu_write`]: a failed enrollment surfaces as a
/// terminal error to the caller rather than being retried by this crate.
pub trait SupplicantControl: Send + Sync {
    /// Launches the supplicant for `interface` and opens its control and
    /// monitor channels. Called once, from `Disconnected` on
    /// `AssignToDIF`.
    fn launch(&self, interface: &str) -> Result<()>;

    fn enable_network(&self, id: NetworkId) -> Result<()>;

    fn disable_network(&self, target: DisableTarget) -> Result<()>;

    fn select_network(&self, id: NetworkId) -> Result<()>;

    fn set_bssid(&self, id: NetworkId, bssid: &str) -> Result<()>;

    fn reassociate(&self) -> Result<()>;

    fn disconnect(&self) -> Result<()>;

    fn scan(&self) -> Result<()>;

    fn scan_results(&self) -> Result<Vec<(String, ScanResult)>>;
}
