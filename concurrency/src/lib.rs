// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The sync primitive layer every blocking component in this workspace is
//! built on.
//!
//! Production code never reaches for `std::sync`/`std::thread` directly;
//! it goes through [`sync`] and [`thread`] so that the exact same source
//! can be compiled three ways:
//!
//! - the `parking_lot` feature (default): fast, non-poisoning primitives
//!   for production and plain `cargo test`.
//! - the `loom` feature: `loom`'s model-checked primitives, for
//!   exhaustively exploring small interleavings of a `#[concurrency::test]`.
//! - one of the `shuttle`/`shuttle_pct`/`shuttle_dfs` features: `shuttle`'s
//!   randomized/PCT/DFS schedulers, for larger state spaces than `loom`
//!   can exhaust.
//!
//! [`slot`] is the lock-free single-value publish cell the read-mostly
//! `ForwardingTable` (see `rina-lsr`) is built on.

#![cfg_attr(
    not(any(feature = "loom", feature = "shuttle")),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod slot;
pub mod sync;
pub mod thread;

pub use concurrency_macros::test;

/// Internal re-export surface consumed by the `#[concurrency::test]`
/// expansion; not part of the crate's public API contract.
#[doc(hidden)]
#[cfg(feature = "loom")]
pub mod loom_sys {
    pub use loom::model;
}

#[doc(hidden)]
#[cfg(feature = "shuttle")]
pub mod shuttle_sys {
    /// Default iteration budget for the randomized scheduler. `shuttle_pct`
    /// and `shuttle_dfs` select their scheduler via the `shuttle` crate's
    /// own `check_pct`/`check_dfs` entry points instead of this one; see
    /// the feature-chain note in `Cargo.toml`.
    const ITERATIONS: usize = 1_000;

    pub fn check<F>(f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        #[cfg(feature = "shuttle_dfs")]
        {
            shuttle::check_dfs(f, None);
        }
        #[cfg(all(feature = "shuttle_pct", not(feature = "shuttle_dfs")))]
        {
            shuttle::check_pct(f, ITERATIONS, 3);
        }
        #[cfg(not(feature = "shuttle_pct"))]
        {
            shuttle::check_random(f, ITERATIONS);
        }
    }
}
