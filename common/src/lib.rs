// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Shared primitive types for the RINA core: the node-local flow handle
//! ([`PortId`]), the DIF address type, the owned SDU buffer, and the
//! engine-wide error enum every crate in this workspace returns.

pub mod address;
pub mod error;
pub mod port;
pub mod sdu;

pub use address::Address;
pub use error::RinaError;
pub use port::PortId;
pub use sdu::Sdu;

/// Convenience alias used throughout the workspace.
pub type Result<T> = core::result::Result<T, RinaError>;
