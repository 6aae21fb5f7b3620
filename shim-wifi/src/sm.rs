// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The enrollment state machine's states and the events that drive it.
//!
//! Mirrors `rinad`'s `StaEnrollmentSM::StaEnrollmentState`: a linear chain
//! from `Disconnected` to `Enrolled`, driven one step at a time by
//! supplicant events, with a single timeout that can abort the chain from
//! anywhere in the middle back to `Disconnected`.

use std::fmt;

/// A discovered neighbor: the original's `rina::Neighbor`, reduced to the
/// one field the STA machine actually populates (the BSSID named in the
/// enrollment request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub name: String,
    pub enrolled: bool,
}

/// States of one STA's enrollment/association lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StaState {
    Disconnected,
    EnrollmentStarted,
    TryingToAssociate,
    Associated,
    KeyNegotiationCompleted,
    Enrolled,
}

impl StaState {
    /// Whether an enrollment is currently in flight: every state but the
    /// two terminal ones (`Disconnected`, the rest's target `Enrolled`)
    /// is "pending" for the purposes of the `EnrollmentTimeout` transition
    /// that applies "from any pending state".
    #[must_use]
    pub const fn is_enrollment_pending(self) -> bool {
        !matches!(self, StaState::Disconnected | StaState::Enrolled)
    }
}

/// Asynchronous events the supplicant monitor channel delivers, consumed
/// by [`crate::ShimWifiSta::on_supplicant_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SupplicantEvent {
    TryingToAssociate,
    Associated,
    KeyNegotiated,
    Connected,
    Disconnected,
    ScanResultsReady,
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (enrolled={})", self.name, self.enrolled)
    }
}
