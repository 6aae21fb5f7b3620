// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

use derive_builder::Builder;

/// Construction-time knobs for a [`crate::Kfa`] instance.
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct KfaConfig {
    /// Width of the backing port-id bitmap; forwarded to
    /// `pidm::PortIdManager::with_capacity`.
    #[builder(default = "pidm::DEFAULT_CAPACITY_BITS")]
    pub port_capacity_bits: usize,
}

impl Default for KfaConfig {
    fn default() -> Self {
        KfaConfigBuilder::default()
            .build()
            .expect("every field has a default")
    }
}
