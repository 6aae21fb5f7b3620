// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The per-open character-device surface user-space talks to, mirroring
//! IRATI's `iodev.c`: one file descriptor's worth of private state
//! binding it to exactly one port.

use common::{PortId, Sdu};

use crate::engine::Kfa;
use crate::error::KfaError;
use crate::flow::FlowOptions;

/// Per-`open()` private state.
pub struct KfaFile<'a> {
    kfa: &'a Kfa,
    port: Option<PortId>,
    nonblock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReadiness {
    pub readable: bool,
    pub writable: bool,
}

impl<'a> KfaFile<'a> {
    /// `open()`: a file starts with no bound port.
    #[must_use]
    pub fn open(kfa: &'a Kfa, nonblock: bool) -> Self {
        Self {
            kfa,
            port: None,
            nonblock,
        }
    }

    /// `ioctl(BIND, port)`. `Busy` if this file is already bound.
    pub fn bind(&mut self, port: PortId) -> Result<(), KfaError> {
        if self.port.is_some() {
            return Err(KfaError::Busy);
        }
        if self.nonblock {
            self.kfa.set_options(port, FlowOptions::NONBLOCK)?;
        }
        self.port = Some(port);
        Ok(())
    }

    fn bound_port(&self) -> Result<PortId, KfaError> {
        self.port.ok_or(KfaError::NotBound)
    }

    /// `write(buf, n)`: constructs an SDU from `buf` and submits it.
    /// Ownership of `buf`'s contents passes to the engine once the SDU is
    /// constructed, even on an error return.
    pub fn write(&self, buf: &[u8]) -> Result<(), KfaError> {
        let port = self.bound_port()?;
        self.kfa.flow_write(port, Sdu::from(buf), !self.nonblock)
    }

    /// `read(buf, n)`: reads one SDU and copies it into `buf`. An SDU
    /// longer than `buf` is an error and is discarded rather than
    /// partially delivered; callers must size buffers to the DIF's
    /// MaxSDU.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, KfaError> {
        let port = self.bound_port()?;
        let sdu = self.kfa.flow_read(port, !self.nonblock)?;
        if sdu.len() > buf.len() {
            return Err(KfaError::IoError(format!(
                "{}-byte SDU does not fit in a {}-byte buffer",
                sdu.len(),
                buf.len()
            )));
        }
        let bytes = sdu.into_bytes();
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// `poll(fd)`. Always reports both directions ready in this revision,
    /// a deliberately conservative placeholder; a future revision can
    /// consult the FIFO and the provider instead.
    #[must_use]
    pub fn poll(&self) -> PollReadiness {
        PollReadiness {
            readable: true,
            writable: true,
        }
    }

    /// `release()`: frees this file's private state. Does not itself
    /// deallocate the flow.
    pub fn release(self) {}
}
