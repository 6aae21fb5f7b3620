// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

use thiserror::Error;

use common::PortId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LsrError {
    #[error("no N-1 flow bound on port {0}")]
    UnknownPort(u32),
    #[error("no local FSO found for neighbor at port {0}")]
    NoSuchNeighbor(u32),
    #[error("provider I/O error: {0}")]
    IoError(String),
}

impl From<LsrError> for common::RinaError {
    fn from(err: LsrError) -> Self {
        match err {
            LsrError::UnknownPort(p) | LsrError::NoSuchNeighbor(p) => {
                common::RinaError::UnknownFlow(p)
            }
            LsrError::IoError(msg) => common::RinaError::IoError(msg),
        }
    }
}

impl LsrError {
    #[must_use]
    pub fn unknown_port(port: PortId) -> Self {
        Self::UnknownPort(port.get())
    }
}
