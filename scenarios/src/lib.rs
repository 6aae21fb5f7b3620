// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Cross-crate integration fixtures and the end-to-end scenarios (S1-S6)
//! wiring `rina-kfa`, `rina-lsr`, and `rina-shim-wifi` together, in the
//! style of the teacher's `flow-test`/`intergration-fixtures` crates. Not
//! published: this crate exists to exercise the other crates against each
//! other, not to be depended on.

pub mod fixtures;
