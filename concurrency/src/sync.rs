// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! `Arc`, `Mutex`, `RwLock`, `Condvar`: one name, three backends.
//!
//! Precedence mirrors the feature chain in `Cargo.toml`
//! (`loom` > `shuttle*` > `parking_lot`): `loom` and `shuttle` each ship
//! their own model-checked allocator-aware `Arc`, so once either is enabled
//! every primitive in this module — including `Arc` itself — comes from
//! that backend. Mixing a std/parking_lot `Arc` with a loom `Mutex` would
//! silently defeat the model checker, so there is deliberately no way to
//! select backends independently.

#[cfg(feature = "loom")]
mod backend {
    pub use loom::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock, Weak};
}

#[cfg(all(feature = "shuttle", not(feature = "loom")))]
mod backend {
    pub use shuttle::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock, Weak};
}

#[cfg(all(
    feature = "parking_lot",
    not(any(feature = "loom", feature = "shuttle"))
))]
mod backend {
    pub use std::sync::{Arc, Weak};

    pub use parking_lot::{Condvar, Mutex, MutexGuard};
    pub use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

    /// A thin facade over `parking_lot::RwLock` exposing the same
    /// `read`/`write` names `std::sync::RwLock` uses, minus the
    /// `PoisonError` wrapping neither `parking_lot` nor this workspace's
    /// error model wants.
    #[derive(Debug, Default)]
    pub struct RwLock<T>(parking_lot::RwLock<T>);

    impl<T> RwLock<T> {
        pub fn new(value: T) -> Self {
            Self(parking_lot::RwLock::new(value))
        }

        pub fn read(&self) -> RwLockReadGuard<'_, T> {
            self.0.read()
        }

        pub fn write(&self) -> RwLockWriteGuard<'_, T> {
            self.0.write()
        }
    }
}

#[cfg(not(any(feature = "loom", feature = "shuttle", feature = "parking_lot")))]
mod backend {
    pub use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock, Weak};
}

pub use backend::{Arc, Condvar, Mutex, MutexGuard, RwLock, Weak};

// Every backend must hand out a `Mutex`/`Condvar`/`RwLock` that is safely
// shared across the threads this workspace parks readers and writers on;
// a backend swap that silently lost `Send`/`Sync` would only surface as a
// hang or a data race at runtime, not a compile error, without these.
// Scoped to the `parking_lot`/`std` facade: `loom`/`shuttle` wrap these
// primitives in their own model-checker bookkeeping that does not promise
// the same `Send`/`Sync` shape.
#[cfg(not(any(feature = "loom", feature = "shuttle")))]
mod send_sync_assertions {
    use super::{Arc, Condvar, Mutex, RwLock};

    static_assertions::assert_impl_all!(Mutex<u32>: Send, Sync);
    static_assertions::assert_impl_all!(Condvar: Send, Sync);
    static_assertions::assert_impl_all!(RwLock<u32>: Send, Sync);
    static_assertions::assert_impl_all!(Arc<u32>: Send, Sync);
}
