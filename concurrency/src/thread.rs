// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Thread spawning, routed through the same backend selection as
//! [`crate::sync`] so a `#[concurrency::test]` that spawns threads is
//! model-checked end to end rather than only at the lock level.

#[cfg(feature = "loom")]
pub use loom::thread::{Builder, JoinHandle, current, spawn, yield_now};

#[cfg(all(feature = "shuttle", not(feature = "loom")))]
pub use shuttle::thread::{Builder, JoinHandle, current, spawn, yield_now};

#[cfg(not(any(feature = "loom", feature = "shuttle")))]
pub use std::thread::{Builder, JoinHandle, current, spawn, yield_now};
