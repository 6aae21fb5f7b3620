// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The Kernel Flow Allocator: owns every end-point flow on this node,
//! mediates user-to-stack data transfer with blocking and non-blocking
//! semantics, and coordinates flow lifecycle against concurrent readers,
//! writers, enqueuers and deallocators.

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod flow;
pub mod provider;

pub use config::{KfaConfig, KfaConfigBuilder};
pub use device::{KfaFile, PollReadiness};
pub use engine::Kfa;
pub use error::KfaError;
pub use flow::{FlowOptions, FlowState};
pub use provider::IpcpProvider;

#[cfg(test)]
mod test {
    use super::*;
    use common::{PortId, Sdu};
    use concurrency::sync::{Arc, Mutex};
    use pretty_assertions::assert_eq;
    use std::thread;
    use std::time::Duration;

    struct LoopbackProvider {
        delivered: Mutex<Vec<(PortId, Vec<u8>)>>,
        fail_next: Mutex<bool>,
    }

    impl LoopbackProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
                fail_next: Mutex::new(false),
            })
        }
    }

    impl IpcpProvider for LoopbackProvider {
        fn sdu_write(&self, port: PortId, sdu: Sdu) -> common::Result<()> {
            if std::mem::replace(&mut *self.fail_next.lock(), false) {
                return Err(common::RinaError::IoError("injected failure".into()));
            }
            self.delivered.lock().push((port, sdu.into_bytes()));
            Ok(())
        }
    }

    fn bound_flow(kfa: &Kfa) -> (PortId, Arc<LoopbackProvider>) {
        let provider = LoopbackProvider::new();
        let port = kfa.reserve_port().unwrap();
        kfa.flow_create(port, provider.clone()).unwrap();
        kfa.flow_bind(port, provider.clone()).unwrap();
        (port, provider)
    }

    #[test]
    fn pending_write_would_block_nonblocking() {
        let kfa = Kfa::new(KfaConfig::default());
        let provider = LoopbackProvider::new();
        let port = kfa.reserve_port().unwrap();
        kfa.flow_create(port, provider).unwrap();
        let err = kfa.flow_write(port, Sdu::from(&b"hi"[..]), false).unwrap_err();
        assert!(matches!(err, KfaError::WouldBlock));
    }

    #[test]
    fn s1_create_bind_write_read_deallocate() {
        let kfa = Kfa::new(KfaConfig::default());
        let (port, provider) = bound_flow(&kfa);

        kfa.flow_write(port, Sdu::from(&b"hello"[..]), false).unwrap();
        assert_eq!(provider.delivered.lock()[0].1, b"hello".to_vec());

        kfa.sdu_post(port, Sdu::from(&b"world"[..])).unwrap();
        let sdu = kfa.flow_read(port, false).unwrap();
        assert_eq!(sdu.as_slice(), b"world");

        kfa.flow_deallocate(port).unwrap();
        assert!(kfa.flow_state(port).is_none());
    }

    #[test]
    fn write_to_unknown_port_is_unknown_flow() {
        let kfa = Kfa::new(KfaConfig::default());
        let port = PortId::new(1).unwrap();
        let err = kfa.flow_write(port, Sdu::from(&b"x"[..]), false).unwrap_err();
        assert!(matches!(err, KfaError::UnknownFlow(1)));
    }

    #[test]
    fn read_on_deallocated_flow_still_in_flight_is_flow_closed() {
        let kfa = Arc::new(Kfa::new(KfaConfig::default()));
        let (port, _provider) = bound_flow(&kfa);

        // park one blocking reader so the flow has an in-flight reader
        // and survives the upcoming deallocate.
        let kfa2 = Arc::clone(&kfa);
        let parked = thread::spawn(move || kfa2.flow_read(port, true));
        thread::sleep(Duration::from_millis(20));

        kfa.flow_deallocate(port).unwrap();
        assert!(kfa.flow_state(port).is_some());

        let err = kfa.flow_read(port, false).unwrap_err();
        assert!(matches!(err, KfaError::FlowClosed(_)));

        let parked_err = parked.join().unwrap().unwrap_err();
        assert!(matches!(parked_err, KfaError::FlowClosed(_)));
    }

    /// A non-blocking poller must observe closure rather than spin:
    /// `flow_read(port, false)` on a `Deallocated` flow with an empty
    /// FIFO reports `FlowClosed`, not `WouldBlock`.
    #[test]
    fn nonblocking_read_on_deallocated_empty_flow_is_flow_closed() {
        let kfa = Arc::new(Kfa::new(KfaConfig::default()));
        let (port, _provider) = bound_flow(&kfa);

        let kfa2 = Arc::clone(&kfa);
        let parked = thread::spawn(move || kfa2.flow_read(port, true));
        thread::sleep(Duration::from_millis(20));

        kfa.flow_deallocate(port).unwrap();
        assert!(kfa.flow_state(port).is_some());

        for _ in 0..3 {
            let err = kfa.flow_read(port, false).unwrap_err();
            assert!(matches!(err, KfaError::FlowClosed(_)));
        }

        let parked_err = parked.join().unwrap().unwrap_err();
        assert!(matches!(parked_err, KfaError::FlowClosed(_)));
    }

    #[test]
    fn disable_then_enable_write_gates_blocking_writer() {
        let kfa = Arc::new(Kfa::new(KfaConfig::default()));
        let (port, provider) = bound_flow(&kfa);
        kfa.disable_write(port).unwrap();

        let kfa2 = Arc::clone(&kfa);
        let handle = thread::spawn(move || kfa2.flow_write(port, Sdu::from(&b"late"[..]), true));

        thread::sleep(Duration::from_millis(20));
        kfa.enable_write(port).unwrap();

        handle.join().unwrap().unwrap();
        assert_eq!(provider.delivered.lock()[0].1, b"late".to_vec());
    }

    #[test]
    fn interrupt_wakes_blocked_reader_with_interrupted() {
        let kfa = Arc::new(Kfa::new(KfaConfig::default()));
        let (port, _provider) = bound_flow(&kfa);

        let kfa2 = Arc::clone(&kfa);
        let handle = thread::spawn(move || kfa2.flow_read(port, true));

        thread::sleep(Duration::from_millis(20));
        kfa.interrupt(port).unwrap();

        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(err, KfaError::Interrupted));
    }

    #[test]
    fn deallocate_with_in_flight_reader_defers_destruction() {
        let kfa = Arc::new(Kfa::new(KfaConfig::default()));
        let (port, _provider) = bound_flow(&kfa);

        let kfa2 = Arc::clone(&kfa);
        let handle = thread::spawn(move || kfa2.flow_read(port, true));
        thread::sleep(Duration::from_millis(20));

        kfa.flow_deallocate(port).unwrap();
        // flow still present: a reader is in flight.
        assert!(kfa.flow_state(port).is_some());

        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(err, KfaError::FlowClosed(_)));
        // last departing reader performed the destroy.
        assert!(kfa.flow_state(port).is_none());
    }

    #[test]
    fn port_already_bound_is_rejected() {
        let kfa = Kfa::new(KfaConfig::default());
        let (port, provider) = bound_flow(&kfa);
        let err = kfa.flow_create(port, provider).unwrap_err();
        assert!(matches!(err, KfaError::PortAlreadyBound(_)));
    }

    #[test]
    fn device_surface_round_trip() {
        let kfa = Kfa::new(KfaConfig::default());
        let (port, _provider) = bound_flow(&kfa);

        let mut file = KfaFile::open(&kfa, false);
        file.bind(port).unwrap();
        assert!(matches!(file.bind(port), Err(KfaError::Busy)));

        kfa.sdu_post(port, Sdu::from(&b"device"[..])).unwrap();
        let mut buf = [0u8; 16];
        let n = file.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"device");

        let readiness = file.poll();
        assert!(readiness.readable && readiness.writable);
    }

    #[test]
    fn device_read_rejects_undersized_buffer() {
        let kfa = Kfa::new(KfaConfig::default());
        let (port, _provider) = bound_flow(&kfa);
        let mut file = KfaFile::open(&kfa, false);
        file.bind(port).unwrap();

        kfa.sdu_post(port, Sdu::from(&b"too long"[..])).unwrap();
        let mut buf = [0u8; 2];
        assert!(matches!(file.read(&mut buf), Err(KfaError::IoError(_))));
    }
}
