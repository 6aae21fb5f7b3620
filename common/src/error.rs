// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! The engine-wide error enum.
//!
//! `spec.md` §7 describes error kinds by semantics rather than by name
//! (Precondition, Transient, LifecycleClosed, Interrupted, Provider,
//! OutOfResources); §6 names the concrete exit codes surfaced to
//! user-space. `RinaError` is the one flat enum every crate in this
//! workspace converges on, the same way `flow-info::FlowInfoError` and
//! `nat::AllocatorError` are each one `thiserror` enum per crate rather
//! than a hierarchy of wrapper types.

/// Errors returned across every public KFA/PIDM/LSR/Shim-WiFi entry point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RinaError {
    /// Precondition kind: caller passed a malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// OutOfResources kind: an allocator (PIDM, SDU pool, ...) is exhausted.
    #[error("out of memory")]
    OutOfMemory,

    /// OutOfResources kind: the PIDM bitmap has no free bit.
    #[error("out of port ids")]
    OutOfPortIds,

    /// Precondition kind: the port has no associated Flow in the KFA map.
    #[error("unknown flow on port {0}")]
    UnknownFlow(u32),

    /// LifecycleClosed kind: the Flow has been deallocated.
    #[error("flow closed on port {0}")]
    FlowClosed(u32),

    /// Transient kind: non-blocking operation could not complete now.
    #[error("operation would block")]
    WouldBlock,

    /// Interrupted kind: a parked thread observed a cancellation signal.
    #[error("operation interrupted")]
    Interrupted,

    /// Provider kind: the downstream IPCP reported an error, surfaced
    /// verbatim to the caller.
    #[error("provider I/O error: {0}")]
    IoError(String),

    /// Precondition kind: the resource is already owned/bound elsewhere
    /// (e.g. `ioctl(BIND)` on an fd that is already bound).
    #[error("resource busy")]
    Busy,
}

impl RinaError {
    /// `true` for errors a well-behaved caller may retry at its own
    /// discretion (`WouldBlock`), as opposed to terminal errors.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, RinaError::WouldBlock)
    }
}
