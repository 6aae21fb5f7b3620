// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The flow object KFA hands out: a port-bound SDU pipe with its own
//! lifecycle, FIFO, and pair of wait-sets.

use std::collections::VecDeque;
use std::sync::Arc;

use common::Sdu;
use concurrency::sync::Condvar;

use crate::provider::IpcpProvider;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FlowOptions: u32 {
        const NONE      = 0;
        const NONBLOCK  = 1 << 0;
    }
}

/// A Flow's place in its lifecycle. Transitions to `Deallocated` are
/// monotonic: nothing moves a flow back out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Pending,
    Allocated,
    Disabled,
    Deallocated,
}

/// The pair of condition variables a blocked reader/writer parks on,
/// bound to the engine's single coarse lock rather than one lock per
/// flow (see the concurrency model notes on `Kfa`).
pub(crate) struct WaitSet {
    pub(crate) read_ready: Condvar,
    pub(crate) write_ready: Condvar,
}

impl WaitSet {
    fn new() -> Self {
        Self {
            read_ready: Condvar::new(),
            write_ready: Condvar::new(),
        }
    }
}

pub(crate) struct FlowEntry {
    pub(crate) state: FlowState,
    pub(crate) options: FlowOptions,
    pub(crate) provider: Arc<dyn IpcpProvider>,
    pub(crate) sdu_ready: VecDeque<Sdu>,
    pub(crate) readers: u32,
    pub(crate) writers: u32,
    pub(crate) enqueuers: u32,
    /// Bumped by `Kfa::interrupt`; a waiter that wakes and finds this
    /// changed from the value it captured before parking treats the wake
    /// as a delivered signal rather than a state change and returns
    /// `Interrupted`.
    pub(crate) cancel_generation: u64,
    pub(crate) wait: Arc<WaitSet>,
}

impl FlowEntry {
    pub(crate) fn new(provider: Arc<dyn IpcpProvider>) -> Self {
        Self {
            state: FlowState::Pending,
            options: FlowOptions::NONE,
            provider,
            sdu_ready: VecDeque::new(),
            readers: 0,
            writers: 0,
            enqueuers: 0,
            cancel_generation: 0,
            wait: Arc::new(WaitSet::new()),
        }
    }

    pub(crate) fn in_flight(&self) -> u32 {
        self.readers + self.writers + self.enqueuers
    }

    pub(crate) fn should_destroy(&self) -> bool {
        self.state == FlowState::Deallocated && self.in_flight() == 0
    }
}
