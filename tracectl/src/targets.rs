// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Compile-time registration of named logging targets.
//!
//! Each module that wants independently-tunable log verbosity declares one
//! target with [`trace_target!`]. The macro expands to a `const` handle
//! (used at call sites as the first argument to `tracing`'s macros, via
//! `tracing::event!(target: NAME.name(), ...)`-style call sites elsewhere in
//! the workspace) and a [`TraceTarget`] entry pushed into a `linkme`
//! distributed slice, so [`crate::control::TracingControl`] can discover
//! every target that exists in the final binary without a central registry
//! module that everyone has to remember to update.

use tracing_subscriber::filter::LevelFilter;

/// One independently-tunable logging target.
#[derive(Debug, Clone, Copy)]
pub struct TraceTarget {
    /// Dotted name used both as the `tracing` target string and as the key
    /// an operator passes to [`crate::control::TracingControl::set_level`].
    pub name: &'static str,
    /// Level this target runs at until explicitly overridden.
    pub default_level: LevelFilter,
    /// Other targets that should move with this one when its level is
    /// changed at runtime, e.g. a coarse subsystem target that also covers
    /// a handful of finer submodule targets.
    pub downstream: &'static [&'static str],
}

#[linkme::distributed_slice]
pub static TRACE_TARGETS: [TraceTarget] = [..];

/// Declares a [`TraceTarget`] and registers it into [`TRACE_TARGETS`].
///
/// `$name` is any expression yielding a `&'static str`: usually a plain
/// string literal, occasionally a `const` declared just above the call
/// site when the same name is also needed as a value elsewhere in the
/// module.
///
/// ```ignore
/// trace_target!("pidm", LevelFilter::INFO, &[]);
///
/// const KFA_IO: &str = "kfa-io";
/// trace_target!(KFA_IO, LevelFilter::DEBUG, &["kfa-io.read", "kfa-io.write"]);
/// ```
#[macro_export]
macro_rules! trace_target {
    ($name:expr, $level:expr, $downstream:expr) => {
        #[::linkme::distributed_slice($crate::targets::TRACE_TARGETS)]
        #[linkme(crate = ::linkme)]
        static _TRACE_TARGET_REGISTRATION: $crate::targets::TraceTarget =
            $crate::targets::TraceTarget {
                name: $name,
                default_level: $level,
                downstream: $downstream,
            };
    };
}

#[cfg(test)]
mod test {
    use super::*;

    trace_target!("test-target-alpha", LevelFilter::WARN, &["test.target.beta"]);

    #[test]
    fn registered_target_is_discoverable() {
        assert!(
            TRACE_TARGETS
                .iter()
                .any(|t| t.name == "test-target-alpha" && t.default_level == LevelFilter::WARN)
        );
    }
}
