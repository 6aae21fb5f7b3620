// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The downstream surface LSR requires to flood FSOs over N-1 flows.
//! Mirrors `kfa::IpcpProvider`'s shape: one method, mechanism only, no
//! retry policy baked in.

use common::{PortId, Result};

use crate::fso::FlowStateObject;

/// Sends FSO advertisements out a bound N-1 flow.
///
/// LSR never retries a failed [`LsrTransport::advertise`] inline; a
/// failed propagation attempt simply leaves the affected FSOs
/// `modified` so the next `propagation_period` tick retries them.
pub trait LsrTransport: Send + Sync {
    fn advertise(&self, egress_port: PortId, fsos: &[FlowStateObject]) -> Result<()>;
}
