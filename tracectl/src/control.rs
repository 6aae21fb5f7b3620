// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Runtime level control for the targets registered via [`trace_target!`].

use std::sync::OnceLock;

use arc_swap::ArcSwap;
use ordermap::OrderMap;
use tracing_subscriber::filter::LevelFilter;

use crate::targets::TRACE_TARGETS;

/// Level a target runs at if nothing has ever called
/// [`TracingControl::set_level`] for it or for one of its upstreams.
pub const DEFAULT_DEFAULT_LOGLEVEL: LevelFilter = LevelFilter::INFO;

#[derive(Debug, thiserror::Error)]
pub enum TraceCtlError {
    #[error("no trace target registered under {0:?}")]
    UnknownTarget(String),
}

/// Live, swappable view of every target's effective level.
///
/// Reads ([`Self::level_for`]) never block a writer and never block each
/// other; [`Self::set_level`] publishes a whole new snapshot rather than
/// mutating one in place, so a concurrent reader always sees a complete,
/// consistent map.
#[derive(Debug)]
pub struct TracingControl {
    levels: ArcSwap<OrderMap<&'static str, LevelFilter>>,
}

impl Default for TracingControl {
    fn default() -> Self {
        let levels = TRACE_TARGETS
            .iter()
            .map(|t| (t.name, t.default_level))
            .collect();
        Self {
            levels: ArcSwap::from_pointee(levels),
        }
    }
}

impl TracingControl {
    /// The level `target` and everything listed in its `downstream` set
    /// should run at right now.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.levels
            .load()
            .get(target)
            .copied()
            .unwrap_or(DEFAULT_DEFAULT_LOGLEVEL)
    }

    /// Sets `target`'s level, and cascades it to every target listed in
    /// `target`'s `downstream` set, the way enabling a coarse subsystem
    /// target also enables the finer targets nested under it.
    pub fn set_level(&self, target: &str, level: LevelFilter) -> Result<(), TraceCtlError> {
        let entry = TRACE_TARGETS
            .iter()
            .find(|t| t.name == target)
            .ok_or_else(|| TraceCtlError::UnknownTarget(target.to_owned()))?;

        let mut next = (**self.levels.load()).clone();
        next.insert(entry.name, level);
        for &downstream in entry.downstream {
            next.insert(downstream, level);
        }
        self.levels.store(std::sync::Arc::new(next));
        Ok(())
    }

    /// Every target this control knows about, alongside its current level.
    pub fn levels(&self) -> Vec<(&'static str, LevelFilter)> {
        self.levels.load().iter().map(|(&n, &l)| (n, l)).collect()
    }
}

static TRACE_CTL: OnceLock<TracingControl> = OnceLock::new();

/// The process-wide [`TracingControl`] singleton, built from every target
/// registered via [`trace_target!`] at the point this is first called.
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACE_CTL.get_or_init(TracingControl::default)
}
