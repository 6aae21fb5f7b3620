// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum KfaError {
    #[error("no flow bound on port {0}")]
    UnknownFlow(u32),
    #[error("this file descriptor is not bound to a port")]
    NotBound,
    #[error("flow closed on port {0}")]
    FlowClosed(u32),
    #[error("operation would block")]
    WouldBlock,
    #[error("operation interrupted")]
    Interrupted,
    #[error("provider I/O error: {0}")]
    IoError(String),
    #[error("resource busy")]
    Busy,
    #[error("port {0} already has a flow")]
    PortAlreadyBound(u32),
    #[error(transparent)]
    Pidm(#[from] pidm::PidmError),
}

impl From<KfaError> for common::RinaError {
    fn from(err: KfaError) -> Self {
        match err {
            KfaError::UnknownFlow(p) => common::RinaError::UnknownFlow(p),
            KfaError::NotBound => common::RinaError::InvalidArgument("file not bound to a port"),
            KfaError::FlowClosed(p) => common::RinaError::FlowClosed(p),
            KfaError::WouldBlock => common::RinaError::WouldBlock,
            KfaError::Interrupted => common::RinaError::Interrupted,
            KfaError::IoError(msg) => common::RinaError::IoError(msg),
            KfaError::Busy | KfaError::PortAlreadyBound(_) => common::RinaError::Busy,
            KfaError::Pidm(err) => err.into(),
        }
    }
}
