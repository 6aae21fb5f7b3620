// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Per-target runtime log level control, layered on top of `tracing`.
//!
//! Modules register a target with [`trace_target!`]; [`get_trace_ctl`]
//! hands back the process-wide [`TracingControl`] that tracks the live
//! level for every target registered anywhere in the final binary, so an
//! operator can turn up `rina_kfa::io` without also paying for `TRACE` on
//! everything else.

pub mod control;
pub mod display;
pub mod targets;

pub use control::DEFAULT_DEFAULT_LOGLEVEL;
pub use control::get_trace_ctl;
pub use control::{TraceCtlError, TracingControl};
pub use tracing_subscriber::filter::LevelFilter;
