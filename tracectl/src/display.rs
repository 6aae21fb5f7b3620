// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! `Display` for the current state of a [`crate::control::TracingControl`],
//! used by whatever operator surface (CLI, debug endpoint) wants to print
//! "what level is every target running at right now".

use std::fmt;

use crate::control::TracingControl;

impl fmt::Display for TracingControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut levels = self.levels();
        levels.sort_unstable_by_key(|(name, _)| *name);
        for (name, level) in levels {
            writeln!(f, "{name}: {level}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trace_target;
    use tracing_subscriber::filter::LevelFilter;

    trace_target!("test-display-target", LevelFilter::INFO, &[]);

    #[test]
    fn display_lists_registered_targets() {
        let ctl = TracingControl::default();
        let rendered = ctl.to_string();
        assert!(rendered.contains("test-display-target: INFO"));
    }
}
