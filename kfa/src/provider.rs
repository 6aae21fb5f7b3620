// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The downstream surface KFA requires of the IPCP that owns a flow's N-1
//! provider side.

use common::{PortId, Result, Sdu};

/// IPCP-side hooks KFA calls into once a flow is bound.
///
/// KFA never retries a failed [`IpcpProvider::sdu_write`]: it is a
/// mechanism, not a policy, and leaves retry decisions to whatever sits
/// above it (the routing core's propagation loop is the one actual
/// retrier in this workspace, and it retries by re-emitting on its own
/// period, not by asking KFA to).
pub trait IpcpProvider: Send + Sync {
    /// Transmits `sdu` on `port`, taking ownership of it.
    fn sdu_write(&self, port: PortId, sdu: Sdu) -> Result<()>;

    /// Optional flow-control notifications; default to no-ops for
    /// providers that never saturate.
    fn on_write_enabled(&self, _port: PortId) {}
    fn on_write_disabled(&self, _port: PortId) {}
}
