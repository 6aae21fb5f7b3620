// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The Kernel Flow Allocator engine: one coarse lock guarding a
//! port-to-flow map, a pair of condition variables per flow, and the
//! write/read/post algorithms built on top of them.
//!
//! # Concurrency model
//!
//! Every entry point takes the same [`concurrency::sync::Mutex`] around
//! the port map. Blocking `flow_write`/`flow_read` park on a
//! [`crate::flow::WaitSet`] owned by the flow itself (reached through an
//! `Arc` so it can be waited on after the guard that found it is
//! released and reacquired). A Flow is destroyed by whichever caller's
//! `finish_*` sees the reader/writer/enqueuer counter-triple reach zero
//! while the flow is `Deallocated` — there is no separate
//! deferred-destruction worker thread: IRATI's workqueue exists to get
//! off of the kernel's softirq context, a constraint that does not apply
//! here, so the "last one out" check that it eventually runs is simply
//! run inline by whichever operation notices it can.

use std::collections::HashMap;
use std::sync::Arc;

use common::{PortId, Sdu};
use concurrency::sync::{Mutex, MutexGuard};
use pidm::PortIdManager;
use tracectl::{LevelFilter, trace_target};

use crate::config::KfaConfig;
use crate::error::KfaError;
use crate::flow::{FlowEntry, FlowOptions, FlowState};
use crate::provider::IpcpProvider;

trace_target!("kfa", LevelFilter::INFO, &["kfa-io"]);

type FlowMap = HashMap<PortId, FlowEntry>;

pub struct Kfa {
    pidm: PortIdManager,
    flows: Mutex<FlowMap>,
}

impl Kfa {
    #[must_use]
    pub fn new(config: KfaConfig) -> Self {
        Self {
            pidm: PortIdManager::with_capacity(config.port_capacity_bits),
            flows: Mutex::new(HashMap::new()),
        }
    }

    /// Reserves a `PortId` without creating a flow for it; the owning
    /// IPCP may bind a flow to it later (reservation and binding are
    /// separable operations).
    pub fn reserve_port(&self) -> Result<PortId, KfaError> {
        Ok(self.pidm.allocate()?)
    }

    /// Returns `port` to the PIDM, unless a flow still owns it (in which
    /// case that flow's own destruction will release it once it is torn
    /// down).
    pub fn release_port(&self, port: PortId) -> Result<(), KfaError> {
        let guard = self.flows.lock();
        if guard.contains_key(&port) {
            return Ok(());
        }
        drop(guard);
        Ok(self.pidm.release(port)?)
    }

    /// Installs a `Pending` flow bound to `provider`. Errors if `port`
    /// already owns a flow.
    pub fn flow_create(
        &self,
        port: PortId,
        provider: Arc<dyn IpcpProvider>,
    ) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        if guard.contains_key(&port) {
            return Err(KfaError::PortAlreadyBound(port.get()));
        }
        guard.insert(port, FlowEntry::new(provider));
        tracing::debug!(target: "kfa", port = port.get(), "flow created");
        Ok(())
    }

    /// Transitions `Pending -> Allocated`, also usable to rebind an
    /// existing flow to a new provider instance after a handoff.
    pub fn flow_bind(
        &self,
        port: PortId,
        provider: Arc<dyn IpcpProvider>,
    ) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        entry.provider = provider;
        entry.state = FlowState::Allocated;
        Ok(())
    }

    pub fn set_options(&self, port: PortId, options: FlowOptions) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        entry.options = options;
        Ok(())
    }

    pub fn get_options(&self, port: PortId) -> Result<FlowOptions, KfaError> {
        let guard = self.flows.lock();
        let entry = guard.get(&port).ok_or(KfaError::UnknownFlow(port.get()))?;
        Ok(entry.options)
    }

    #[must_use]
    pub fn flow_state(&self, port: PortId) -> Option<FlowState> {
        self.flows.lock().get(&port).map(|e| e.state)
    }

    /// Marks `port`'s flow `Deallocated`, wakes every parked reader and
    /// writer, and destroys the flow immediately if nothing is currently
    /// in flight.
    ///
    /// Per the map-closure invariant (spec §3: a Flow exists in the map
    /// iff its state is not `Deallocated` or it still has in-flight
    /// readers/writers/enqueuers), an idle flow leaves the map in the
    /// same call that deallocates it. A subsequent `flow_read`/
    /// `flow_write`/`sdu_post` on that port then reports `UnknownFlow`
    /// (step 1 of the read/write algorithm: port miss), not `FlowClosed`
    /// — the latter is only reachable while the port is still present,
    /// i.e. while a reader/writer/enqueuer kept it alive across the
    /// deallocate.
    pub fn flow_deallocate(&self, port: PortId) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        entry.state = FlowState::Deallocated;
        let wait = Arc::clone(&entry.wait);
        let destroy_now = entry.should_destroy();
        wait.read_ready.notify_all();
        wait.write_ready.notify_all();
        tracing::info!(target: "kfa", port = port.get(), "flow deallocated");
        if destroy_now {
            Self::destroy_locked(&self.pidm, &mut guard, port);
        }
        Ok(())
    }

    /// Bumps `port`'s cancellation generation and wakes its wait-sets, so
    /// a thread parked in `flow_write`/`flow_read` observes
    /// `KfaError::Interrupted` rather than re-checking the condition.
    pub fn interrupt(&self, port: PortId) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        entry.cancel_generation += 1;
        let wait = Arc::clone(&entry.wait);
        wait.read_ready.notify_all();
        wait.write_ready.notify_all();
        Ok(())
    }

    /// `disable_write(port)`: `Allocated -> Disabled`. A no-op once the
    /// flow is `Deallocated`; deallocation is sticky and overrides flow
    /// control.
    pub fn disable_write(&self, port: PortId) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        if entry.state != FlowState::Deallocated {
            entry.state = FlowState::Disabled;
        }
        Ok(())
    }

    /// `enable_write(port)`: `Disabled -> Allocated`, waking the writer
    /// wait-set.
    pub fn enable_write(&self, port: PortId) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        if entry.state == FlowState::Disabled {
            entry.state = FlowState::Allocated;
            let wait = Arc::clone(&entry.wait);
            wait.write_ready.notify_all();
        }
        Ok(())
    }

    /// The write algorithm: validate, count, block until writable (or
    /// refuse immediately in non-blocking mode), hand off to the
    /// provider outside the lock, then run the last-one-out check.
    pub fn flow_write(&self, port: PortId, sdu: Sdu, blocking: bool) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();

        {
            let entry = guard.get(&port).ok_or(KfaError::UnknownFlow(port.get()))?;
            if entry.state == FlowState::Deallocated {
                return Err(KfaError::FlowClosed(port.get()));
            }
        }
        guard.get_mut(&port).expect("checked above").writers += 1;

        let outcome = loop {
            let (state, wait, generation) = {
                let Some(entry) = guard.get(&port) else {
                    break Err(KfaError::UnknownFlow(port.get()));
                };
                (entry.state, Arc::clone(&entry.wait), entry.cancel_generation)
            };

            if !blocking {
                if matches!(state, FlowState::Pending | FlowState::Disabled) {
                    break Err(KfaError::WouldBlock);
                }
            } else if !matches!(state, FlowState::Allocated | FlowState::Deallocated) {
                wait.write_ready.wait(&mut guard);
                let Some(entry) = guard.get(&port) else {
                    break Err(KfaError::UnknownFlow(port.get()));
                };
                if entry.cancel_generation != generation {
                    break Err(KfaError::Interrupted);
                }
                continue;
            }

            let entry = guard.get(&port).expect("checked above");
            if entry.state == FlowState::Deallocated {
                break Err(KfaError::FlowClosed(port.get()));
            }

            let provider = Arc::clone(&entry.provider);
            drop(guard);
            let sent = provider.sdu_write(port, sdu);
            tracing::trace!(target: "kfa-io", port = port.get(), ok = sent.is_ok(), "flow_write");
            guard = self.flows.lock();
            break sent.map_err(|e| KfaError::IoError(e.to_string()));
        };

        self.finish_writer(&mut guard, port);
        outcome
    }

    /// The read algorithm, symmetric to [`Self::flow_write`] against the
    /// SDU-ready FIFO.
    pub fn flow_read(&self, port: PortId, blocking: bool) -> Result<Sdu, KfaError> {
        let mut guard = self.flows.lock();

        {
            let entry = guard.get(&port).ok_or(KfaError::UnknownFlow(port.get()))?;
            if entry.state == FlowState::Deallocated {
                return Err(KfaError::FlowClosed(port.get()));
            }
        }
        guard.get_mut(&port).expect("checked above").readers += 1;

        let outcome = loop {
            let (state, empty, wait, generation) = {
                let Some(entry) = guard.get(&port) else {
                    break Err(KfaError::UnknownFlow(port.get()));
                };
                (
                    entry.state,
                    entry.sdu_ready.is_empty(),
                    Arc::clone(&entry.wait),
                    entry.cancel_generation,
                )
            };

            let ready = state == FlowState::Deallocated || !empty;

            if !blocking {
                if state == FlowState::Deallocated && empty {
                    break Err(KfaError::FlowClosed(port.get()));
                }
                if state == FlowState::Pending || empty {
                    break Err(KfaError::WouldBlock);
                }
            } else if !ready {
                wait.read_ready.wait(&mut guard);
                let Some(entry) = guard.get(&port) else {
                    break Err(KfaError::UnknownFlow(port.get()));
                };
                if entry.cancel_generation != generation {
                    break Err(KfaError::Interrupted);
                }
                continue;
            }

            let entry = guard.get_mut(&port).expect("checked above");
            match entry.sdu_ready.pop_front() {
                Some(sdu) => break Ok(sdu),
                None => {
                    if entry.state == FlowState::Deallocated {
                        break Err(KfaError::FlowClosed(port.get()));
                    }
                    continue;
                }
            }
        };

        self.finish_reader(&mut guard, port);
        outcome
    }

    /// The post algorithm: the IPCP provider's entry point for delivering
    /// an inbound SDU.
    pub fn sdu_post(&self, port: PortId, sdu: Sdu) -> Result<(), KfaError> {
        let mut guard = self.flows.lock();
        let entry = guard
            .get_mut(&port)
            .ok_or(KfaError::UnknownFlow(port.get()))?;
        if entry.state == FlowState::Deallocated {
            return Err(KfaError::FlowClosed(port.get()));
        }

        entry.enqueuers += 1;
        entry.sdu_ready.push_back(sdu);
        let wait = Arc::clone(&entry.wait);
        wait.read_ready.notify_all();

        self.finish_enqueuer(&mut guard, port);
        Ok(())
    }

    fn finish_writer(&self, guard: &mut MutexGuard<'_, FlowMap>, port: PortId) {
        if let Some(entry) = guard.get_mut(&port) {
            entry.writers = entry.writers.saturating_sub(1);
            if entry.should_destroy() {
                Self::destroy_locked(&self.pidm, guard, port);
            }
        }
    }

    fn finish_reader(&self, guard: &mut MutexGuard<'_, FlowMap>, port: PortId) {
        if let Some(entry) = guard.get_mut(&port) {
            entry.readers = entry.readers.saturating_sub(1);
            if entry.should_destroy() {
                Self::destroy_locked(&self.pidm, guard, port);
            }
        }
    }

    fn finish_enqueuer(&self, guard: &mut MutexGuard<'_, FlowMap>, port: PortId) {
        if let Some(entry) = guard.get_mut(&port) {
            entry.enqueuers = entry.enqueuers.saturating_sub(1);
            if entry.should_destroy() {
                Self::destroy_locked(&self.pidm, guard, port);
            }
        }
    }

    fn destroy_locked(pidm: &PortIdManager, guard: &mut MutexGuard<'_, FlowMap>, port: PortId) {
        guard.remove(&port);
        let _ = pidm.release(port);
    }
}
