// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! A lock-free single-value publish cell: readers never block a writer
//! and never block each other. This is the primitive the LSR's
//! `ForwardingTable` is built on (spec §5: "published by swap-in under a
//! reader-writer discipline (read-mostly)").

use std::sync::Arc;

#[cfg(not(feature = "_strict_provenance"))]
mod imp {
    use super::Arc;
    use arc_swap::ArcSwap;

    pub struct Slot<T>(ArcSwap<T>);

    impl<T> Slot<T> {
        pub fn new(value: T) -> Self {
            Self(ArcSwap::from_pointee(value))
        }

        pub fn load(&self) -> Arc<T> {
            self.0.load_full()
        }

        pub fn store(&self, value: T) {
            self.0.store(Arc::new(value));
        }
    }
}

#[cfg(feature = "_strict_provenance")]
mod imp {
    use super::Arc;
    use crate::sync::Mutex;

    /// `arc_swap` uses hazard pointers that strict-provenance (and thus
    /// Miri) rejects. This fallback trades the lock-free property for a
    /// plain mutex-guarded `Arc` swap so the *logic* built on top of
    /// `Slot` can still be Miri-checked; the lock-free claim itself is not
    /// something Miri can verify either way.
    pub struct Slot<T>(Mutex<Arc<T>>);

    impl<T> Slot<T> {
        pub fn new(value: T) -> Self {
            Self(Mutex::new(Arc::new(value)))
        }

        pub fn load(&self) -> Arc<T> {
            #[cfg(feature = "parking_lot")]
            {
                Arc::clone(&self.0.lock())
            }
            #[cfg(not(feature = "parking_lot"))]
            {
                Arc::clone(&self.0.lock().unwrap())
            }
        }

        pub fn store(&self, value: T) {
            #[cfg(feature = "parking_lot")]
            {
                *self.0.lock() = Arc::new(value);
            }
            #[cfg(not(feature = "parking_lot"))]
            {
                *self.0.lock().unwrap() = Arc::new(value);
            }
        }
    }
}

pub use imp::Slot;

// `Slot` backs `ForwardingTable` publication across the LSR's propagation
// thread and every reader of the routing table; it must stay `Send`/`Sync`
// for `T: Send + Sync` under either implementation.
static_assertions::assert_impl_all!(Slot<u32>: Send, Sync);
