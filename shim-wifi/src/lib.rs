// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The Shim-WiFi STA enrollment state machine: couples RINA DIF
//! assignment/enrollment semantics to an external Wi-Fi supplicant
//! driven over a control channel.

pub mod config;
pub mod engine;
pub mod error;
pub mod scan;
pub mod sm;
pub mod supplicant;

pub use config::{StaConfig, StaConfigBuilder};
pub use engine::{EnrollRequest, EnrollmentOutcome, ShimWifiSta, StaUpcalls};
pub use error::StaError;
pub use scan::{AccessPointSecurity, MediaDifInfo, MediaReport, ScanResult};
pub use sm::{Neighbor, StaState, SupplicantEvent};
pub use supplicant::{DisableTarget, NetworkId, SupplicantControl};
