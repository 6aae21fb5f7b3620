// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

use std::time::Duration;

use derive_builder::Builder;

/// Construction-time knobs for a [`crate::ShimWifiSta`] instance. Field
/// names and defaults follow the STA state machine contract's named
/// timers (`EnrollmentTimeout`, `SCAN_INTERVAL`).
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct StaConfig {
    /// How long a pending enrollment may sit in
    /// `EnrollmentStarted`/`TryingToAssociate`/`Associated`/
    /// `KeyNegotiationCompleted` before it is aborted and reported as a
    /// failure to the caller. The original's
    /// `DEFAULT_ENROLLMENT_TIMEOUT_MS` is 10 seconds.
    #[builder(default = "Duration::from_secs(10)")]
    pub enrollment_timeout: Duration,

    /// Period at which the owner should drive `ShimWifiSta::scan_tick`.
    /// Matches the original's `SCAN_INTERVAL` (10 seconds); this crate
    /// does not spawn that worker itself, the same way `rina-lsr`
    /// leaves `age_period`/`propagation_period` as values the owner's
    /// timer reads rather than scheduling them.
    #[builder(default = "Duration::from_secs(10)")]
    pub scan_interval: Duration,
}

impl Default for StaConfig {
    fn default() -> Self {
        StaConfigBuilder::default()
            .build()
            .expect("every field has a default")
    }
}
