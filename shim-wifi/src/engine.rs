// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The Shim-WiFi STA state machine: couples user-space DIF assignment and
//! enrollment requests to an external supplicant's association/key
//! negotiation events.
//!
//! # Concurrency model
//!
//! One coarse lock guards the machine's state, mirroring `rina-kfa` and
//! `rina-lsr`. `enroll_to_daf` is the workspace's other blocking entry
//! point besides `flow_read`/`flow_write`: it parks the calling thread on
//! a condition variable until the machine reaches `Enrolled` or the
//! pending enrollment's deadline is crossed. The deadline itself is not
//! driven by a timeout baked into the wait: as with `rina-lsr`'s
//! `age_tick`, this crate does not spawn its own timer thread. The owner
//! drives `check_timeout` periodically (or a monitor thread calls it
//! after delivering each supplicant event), and that call is what
//! notifies the condition variable once a deadline has passed.

use std::time::{Duration, Instant};

use concurrency::sync::{Arc, Condvar, Mutex};
use tracectl::{LevelFilter, trace_target};

use crate::config::StaConfig;
use crate::error::StaError;
use crate::scan::MediaReport;
use crate::sm::{Neighbor, StaState, SupplicantEvent};
use crate::supplicant::{DisableTarget, SupplicantControl};

trace_target!("shim-wifi", LevelFilter::INFO, &[]);

/// Upward notifications the STA machine delivers to whatever owns it
/// (the IPC process above the shim), mirroring `kfa::IpcpProvider`'s
/// "optional hooks" shape: both default to no-ops so a caller that only
/// cares about one can ignore the other.
pub trait StaUpcalls: Send + Sync {
    /// The supplicant reported `Disconnected` while `Enrolled`.
    fn on_disconnected(&self) {}

    /// A scan pass completed; this is the DIF-assignment layer's cue to
    /// advertise newly-seen neighbors upward.
    fn on_media_report(&self, _report: MediaReport) {}
}

/// One `EnrollToDAF` request: the DIF (SSID) and neighbor (BSSID) to
/// attach to, plus the supplicant's pre-provisioned network id for that
/// DIF (config/provisioning is out of this crate's scope; the caller is
/// assumed to already know which network id backs a given SSID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollRequest {
    pub dif_name: String,
    pub bssid: String,
    pub network_id: crate::supplicant::NetworkId,
}

/// The successful outcome of an enrollment: the one neighbor (BSSID) now
/// enrolled, matching the original's single-entry `neighbors` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    pub neighbor: Neighbor,
}

struct Pending {
    request: EnrollRequest,
    deadline: Instant,
    outcome: Option<Result<EnrollmentOutcome, StaError>>,
}

struct StaData {
    state: StaState,
    pending: Option<Pending>,
    neighbor: Option<Neighbor>,
    /// Bumped on every new enrollment attempt; lets a late `check_timeout`
    /// call from a stale deadline avoid clobbering a newer attempt,
    /// mirroring `kfa::FlowEntry::cancel_generation`.
    generation: u64,
}

pub struct ShimWifiSta {
    config: StaConfig,
    supplicant: Arc<dyn SupplicantControl>,
    upcalls: Arc<dyn StaUpcalls>,
    data: Mutex<StaData>,
    advanced: Condvar,
}

impl ShimWifiSta {
    #[must_use]
    pub fn new(
        config: StaConfig,
        supplicant: Arc<dyn SupplicantControl>,
        upcalls: Arc<dyn StaUpcalls>,
    ) -> Self {
        Self {
            config,
            supplicant,
            upcalls,
            data: Mutex::new(StaData {
                state: StaState::Disconnected,
                pending: None,
                neighbor: None,
                generation: 0,
            }),
            advanced: Condvar::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> StaState {
        self.data.lock().state
    }

    /// `Disconnected + AssignToDIF -> (stay)`: launches the supplicant,
    /// disables every configured network, and leaves the caller to
    /// schedule `scan_tick` at `config.scan_interval`.
    pub fn assign_to_dif(&self, interface: &str) -> Result<(), StaError> {
        {
            let data = self.data.lock();
            if data.state != StaState::Disconnected {
                return Err(StaError::WrongState(data.state));
            }
        }
        self.supplicant
            .launch(interface)
            .map_err(|e| StaError::SupplicantError(e.to_string()))?;
        self.supplicant
            .disable_network(DisableTarget::All)
            .map_err(|e| StaError::SupplicantError(e.to_string()))?;
        tracing::info!(target: "shim-wifi", interface, "assigned to dif");
        Ok(())
    }

    /// `Disconnected + EnrollToDAF(dif, bssid) -> EnrollmentStarted`,
    /// blocking until the machine reaches `Enrolled` or the enrollment's
    /// deadline is crossed by a `check_timeout` call.
    pub fn enroll_to_daf(&self, request: EnrollRequest) -> Result<EnrollmentOutcome, StaError> {
        let generation = {
            let mut data = self.data.lock();
            if data.state != StaState::Disconnected {
                return Err(StaError::EnrollmentInProgress);
            }
            data.generation += 1;
            data.state = StaState::EnrollmentStarted;
            data.pending = Some(Pending {
                request: request.clone(),
                deadline: Instant::now() + self.config.enrollment_timeout,
                outcome: None,
            });
            data.generation
        };

        let select = self
            .supplicant
            .select_network(request.network_id)
            .and_then(|()| self.supplicant.set_bssid(request.network_id, &request.bssid));

        if let Err(err) = select {
            let mut data = self.data.lock();
            if data.generation == generation {
                data.state = StaState::Disconnected;
                data.pending = None;
            }
            return Err(StaError::SupplicantError(err.to_string()));
        }

        let mut data = self.data.lock();
        loop {
            if data.generation != generation {
                // Superseded by a fresher attempt; this caller's request
                // no longer has a `pending` entry to read an outcome from.
                return Err(StaError::EnrollmentTimeout {
                    dif_name: request.dif_name,
                    bssid: request.bssid,
                });
            }
            if let Some(outcome) = data.pending.as_mut().and_then(|p| p.outcome.take()) {
                data.pending = None;
                return outcome;
            }
            self.advanced.wait(&mut data);
        }
    }

    /// Supplicant monitor-channel delivery: advances the enrollment state
    /// machine, or (for `Disconnected`/`ScanResultsReady`) is handled
    /// outside the strict enrollment chain.
    pub fn on_supplicant_event(&self, event: SupplicantEvent) {
        let mut data = self.data.lock();

        match event {
            SupplicantEvent::TryingToAssociate if data.state == StaState::EnrollmentStarted => {
                data.state = StaState::TryingToAssociate;
                Self::refresh_deadline(&mut data, self.config.enrollment_timeout);
            }
            SupplicantEvent::Associated if data.state == StaState::TryingToAssociate => {
                data.state = StaState::Associated;
                Self::refresh_deadline(&mut data, self.config.enrollment_timeout);
            }
            SupplicantEvent::KeyNegotiated if data.state == StaState::Associated => {
                data.state = StaState::KeyNegotiationCompleted;
                Self::refresh_deadline(&mut data, self.config.enrollment_timeout);
            }
            SupplicantEvent::Connected if data.state == StaState::KeyNegotiationCompleted => {
                let neighbor = data.pending.as_ref().map(|p| Neighbor {
                    name: p.request.bssid.clone(),
                    enrolled: true,
                });
                data.state = StaState::Enrolled;
                data.neighbor = neighbor.clone();
                if let (Some(pending), Some(neighbor)) = (data.pending.as_mut(), neighbor) {
                    pending.outcome = Some(Ok(EnrollmentOutcome { neighbor }));
                }
                tracing::info!(target: "shim-wifi", "enrolled");
                self.advanced.notify_all();
            }
            SupplicantEvent::Disconnected if data.state == StaState::Enrolled => {
                data.state = StaState::Disconnected;
                data.neighbor = None;
                tracing::info!(target: "shim-wifi", "disconnected");
                drop(data);
                self.upcalls.on_disconnected();
                return;
            }
            SupplicantEvent::ScanResultsReady => {
                drop(data);
                self.publish_scan_results();
                return;
            }
            // An event that does not match the current state is dropped:
            // the original's `LOG_IPCP_ERR("... while not in ...")`
            // pattern, reduced to mechanism here, logged at debug so an
            // operator can still see it without paying for it by default.
            _ => {
                tracing::debug!(target: "shim-wifi", state = ?data.state, event = ?event, "event dropped");
            }
        }
    }

    /// `any pending + EnrollmentTimeout -> Disconnected`, driven by
    /// whatever external timer the owner runs; returns whether a pending
    /// enrollment was actually aborted.
    pub fn check_timeout(&self) -> bool {
        let generation = {
            let mut data = self.data.lock();
            let Some(pending) = data.pending.as_ref() else {
                return false;
            };
            if !data.state.is_enrollment_pending() || Instant::now() < pending.deadline {
                return false;
            }
            let request = pending.request.clone();
            data.pending.as_mut().unwrap().outcome =
                Some(Err(StaError::EnrollmentTimeout {
                    dif_name: request.dif_name,
                    bssid: request.bssid,
                }));
            data.state = StaState::Disconnected;
            data.generation
        };
        let _ = self.supplicant.disconnect();
        self.advanced.notify_all();
        let mut data = self.data.lock();
        if data.generation == generation {
            data.pending = None;
        }
        true
    }

    /// `any + ScanTick -> (stay)`: issues a scan; results are published
    /// once `ScanResultsReady` is delivered via `on_supplicant_event`.
    pub fn scan_tick(&self) -> Result<(), StaError> {
        self.supplicant
            .scan()
            .map_err(|e| StaError::SupplicantError(e.to_string()))
    }

    fn publish_scan_results(&self) {
        let Ok(results) = self.supplicant.scan_results() else {
            return;
        };
        let current_dif_name = self.data.lock().pending.as_ref().map(|p| p.request.dif_name.clone());
        let mut report = MediaReport::new(current_dif_name);
        for (dif_name, ap) in results {
            report.record(&dif_name, ap);
        }
        self.upcalls.on_media_report(report);
    }

    fn refresh_deadline(data: &mut StaData, timeout: Duration) {
        if let Some(pending) = data.pending.as_mut() {
            pending.deadline = Instant::now() + timeout;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::StaConfigBuilder;
    use crate::scan::{AccessPointSecurity, ScanResult};
    use concurrency::sync::Mutex as SyncMutex;
    use pretty_assertions::assert_eq;
    use std::thread;

    struct FakeSupplicant {
        launched: SyncMutex<Vec<String>>,
        fail_select: SyncMutex<bool>,
        scans: SyncMutex<u32>,
    }

    impl FakeSupplicant {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                launched: SyncMutex::new(Vec::new()),
                fail_select: SyncMutex::new(false),
                scans: SyncMutex::new(0),
            })
        }
    }

    impl SupplicantControl for FakeSupplicant {
        fn launch(&self, interface: &str) -> common::Result<()> {
            self.launched.lock().push(interface.to_owned());
            Ok(())
        }
        fn enable_network(&self, _id: crate::supplicant::NetworkId) -> common::Result<()> {
            Ok(())
        }
        fn disable_network(&self, _target: DisableTarget) -> common::Result<()> {
            Ok(())
        }
        fn select_network(&self, _id: crate::supplicant::NetworkId) -> common::Result<()> {
            if *self.fail_select.lock() {
                return Err(common::RinaError::IoError("no such network".into()));
            }
            Ok(())
        }
        fn set_bssid(&self, _id: crate::supplicant::NetworkId, _bssid: &str) -> common::Result<()> {
            Ok(())
        }
        fn reassociate(&self) -> common::Result<()> {
            Ok(())
        }
        fn disconnect(&self) -> common::Result<()> {
            Ok(())
        }
        fn scan(&self) -> common::Result<()> {
            *self.scans.lock() += 1;
            Ok(())
        }
        fn scan_results(&self) -> common::Result<Vec<(String, ScanResult)>> {
            Ok(vec![(
                "mydif".to_owned(),
                ScanResult {
                    bssid: "aa:bb:cc:dd:ee:ff".to_owned(),
                    signal_strength: -42,
                    security: AccessPointSecurity::Wpa2,
                },
            )])
        }
    }

    struct RecordingUpcalls {
        disconnected: SyncMutex<u32>,
        reports: SyncMutex<Vec<MediaReport>>,
    }

    impl RecordingUpcalls {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                disconnected: SyncMutex::new(0),
                reports: SyncMutex::new(Vec::new()),
            })
        }
    }

    impl StaUpcalls for RecordingUpcalls {
        fn on_disconnected(&self) {
            *self.disconnected.lock() += 1;
        }
        fn on_media_report(&self, report: MediaReport) {
            self.reports.lock().push(report);
        }
    }

    fn request() -> EnrollRequest {
        EnrollRequest {
            dif_name: "mydif".to_owned(),
            bssid: "aa:bb:cc:dd:ee:ff".to_owned(),
            network_id: 1,
        }
    }

    /// Scenario S6: `AssignToDIF` then `EnrollToDAF` happy path, driven
    /// by the supplicant's event sequence.
    #[test]
    fn s6_enrollment_happy_path() {
        let supplicant = FakeSupplicant::new();
        let upcalls = RecordingUpcalls::new();
        let sta = Arc::new(ShimWifiSta::new(StaConfig::default(), supplicant.clone(), upcalls));

        sta.assign_to_dif("wlan0").unwrap();
        assert_eq!(supplicant.launched.lock()[0], "wlan0");

        let sta2 = Arc::clone(&sta);
        let handle = thread::spawn(move || sta2.enroll_to_daf(request()));

        // Let `enroll_to_daf` reach its blocking wait before feeding events.
        thread::sleep(std::time::Duration::from_millis(20));
        sta.on_supplicant_event(SupplicantEvent::TryingToAssociate);
        sta.on_supplicant_event(SupplicantEvent::Associated);
        sta.on_supplicant_event(SupplicantEvent::KeyNegotiated);
        sta.on_supplicant_event(SupplicantEvent::Connected);

        let outcome = handle.join().unwrap().unwrap();
        assert_eq!(outcome.neighbor.name, "aa:bb:cc:dd:ee:ff");
        assert!(outcome.neighbor.enrolled);
        assert_eq!(sta.state(), StaState::Enrolled);
    }

    #[test]
    fn second_enroll_while_pending_is_rejected() {
        let supplicant = FakeSupplicant::new();
        let upcalls = RecordingUpcalls::new();
        let sta = Arc::new(ShimWifiSta::new(StaConfig::default(), supplicant, upcalls));
        sta.assign_to_dif("wlan0").unwrap();

        let sta2 = Arc::clone(&sta);
        let _handle = thread::spawn(move || sta2.enroll_to_daf(request()));
        thread::sleep(std::time::Duration::from_millis(20));

        let err = sta.enroll_to_daf(request()).unwrap_err();
        assert!(matches!(err, StaError::EnrollmentInProgress));

        sta.on_supplicant_event(SupplicantEvent::TryingToAssociate);
        sta.on_supplicant_event(SupplicantEvent::Associated);
        sta.on_supplicant_event(SupplicantEvent::KeyNegotiated);
        sta.on_supplicant_event(SupplicantEvent::Connected);
        _handle.join().unwrap().unwrap();
    }

    #[test]
    fn select_network_failure_reports_to_caller_without_hanging() {
        let supplicant = FakeSupplicant::new();
        *supplicant.fail_select.lock() = true;
        let upcalls = RecordingUpcalls::new();
        let sta = ShimWifiSta::new(StaConfig::default(), supplicant, upcalls);
        sta.assign_to_dif("wlan0").unwrap();

        let err = sta.enroll_to_daf(request()).unwrap_err();
        assert!(matches!(err, StaError::SupplicantError(_)));
        assert_eq!(sta.state(), StaState::Disconnected);
    }

    /// `check_timeout` aborts a pending enrollment and wakes the blocked
    /// caller with a terminal error, without needing the engine to spawn
    /// its own timer thread.
    #[test]
    fn check_timeout_aborts_pending_enrollment_and_wakes_caller() {
        let supplicant = FakeSupplicant::new();
        let upcalls = RecordingUpcalls::new();
        let config = StaConfigBuilder::default()
            .enrollment_timeout(std::time::Duration::from_millis(1))
            .build()
            .unwrap();
        let sta = Arc::new(ShimWifiSta::new(config, supplicant, upcalls));
        sta.assign_to_dif("wlan0").unwrap();

        let sta2 = Arc::clone(&sta);
        let handle = thread::spawn(move || sta2.enroll_to_daf(request()));
        thread::sleep(std::time::Duration::from_millis(20));

        assert!(sta.check_timeout());
        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(err, StaError::EnrollmentTimeout { .. }));
        assert_eq!(sta.state(), StaState::Disconnected);
    }

    #[test]
    fn enrolled_disconnect_notifies_upcall() {
        let supplicant = FakeSupplicant::new();
        let upcalls = RecordingUpcalls::new();
        let sta = Arc::new(ShimWifiSta::new(StaConfig::default(), supplicant, upcalls.clone()));
        sta.assign_to_dif("wlan0").unwrap();

        let sta2 = Arc::clone(&sta);
        let handle = thread::spawn(move || sta2.enroll_to_daf(request()));
        thread::sleep(std::time::Duration::from_millis(20));
        sta.on_supplicant_event(SupplicantEvent::TryingToAssociate);
        sta.on_supplicant_event(SupplicantEvent::Associated);
        sta.on_supplicant_event(SupplicantEvent::KeyNegotiated);
        sta.on_supplicant_event(SupplicantEvent::Connected);
        handle.join().unwrap().unwrap();

        sta.on_supplicant_event(SupplicantEvent::Disconnected);
        assert_eq!(*upcalls.disconnected.lock(), 1);
        assert_eq!(sta.state(), StaState::Disconnected);
    }

    #[test]
    fn scan_tick_then_results_ready_publishes_media_report() {
        let supplicant = FakeSupplicant::new();
        let upcalls = RecordingUpcalls::new();
        let sta = ShimWifiSta::new(StaConfig::default(), supplicant.clone(), upcalls.clone());
        sta.assign_to_dif("wlan0").unwrap();

        sta.scan_tick().unwrap();
        assert_eq!(*supplicant.scans.lock(), 1);

        sta.on_supplicant_event(SupplicantEvent::ScanResultsReady);
        let reports = upcalls.reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].available_difs["mydif"].access_points.len(), 1);
    }
}
