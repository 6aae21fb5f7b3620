// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

use std::time::Duration;

use derive_builder::Builder;

/// Construction-time knobs for a [`crate::Lsr`] instance. Field names and
/// defaults follow the routing core contract's named periods/timers.
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct LsrConfig {
    /// An FSO reaching this age (in age-tick units) is no longer
    /// considered `up` for routing purposes, and has its grace timer
    /// armed if it is not armed already.
    #[builder(default = "20")]
    pub max_age: u32,

    /// How often `age_tick` should be driven, in wall-clock terms, by
    /// whatever owns the periodic worker; this crate does not spawn that
    /// worker itself (see `DESIGN.md`).
    #[builder(default = "Duration::from_secs(1)")]
    pub age_period: Duration,

    /// How often modified FSOs should be flooded.
    #[builder(default = "Duration::from_secs(2)")]
    pub propagation_period: Duration,

    /// How often the forwarding table should be recomputed even absent a
    /// `modified` transition.
    #[builder(default = "Duration::from_secs(5)")]
    pub routing_period: Duration,

    /// Grace period between an FSO going down (or reaching `max_age`) and
    /// its removal from the database, giving peers time to learn of the
    /// loss via flooding.
    #[builder(default = "Duration::from_secs(10)")]
    pub wait_until_remove_object: Duration,
}

impl LsrConfig {
    /// `wait_until_remove_object` expressed in `age_tick` units, rounded
    /// up and floored at 1 so an immediate tick always starts counting
    /// down rather than removing instantly.
    #[must_use]
    pub fn grace_ticks(&self) -> u32 {
        let ticks = self.wait_until_remove_object.as_secs_f64() / self.age_period.as_secs_f64();
        (ticks.ceil() as u32).max(1)
    }
}

impl Default for LsrConfig {
    fn default() -> Self {
        LsrConfigBuilder::default()
            .build()
            .expect("every field has a default")
    }
}
