// SPDX-License-Identifier: Apache-2.0

//! Run options and their environment-derived defaults.

use std::env;

/// Options governing a run, owned by the registry.
///
/// `skip_death_tests` stays undecided until [`RunOptions::finalize`] so a
/// caller override always wins over the environment-derived default.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    skip_death_tests: Option<bool>,
    stop_on_failure: bool,
}

impl RunOptions {
    /// Resolve any still-undecided option to its default.
    ///
    /// Death tests default to skipped when the process appears to run
    /// under memory-checking instrumentation, where fork-based isolation
    /// is unreliable.
    pub fn finalize(&mut self) {
        if self.skip_death_tests.is_none() {
            self.skip_death_tests = Some(under_memcheck());
        }
    }

    /// Whether death tests are skipped instead of executed.
    pub fn skip_death_tests(&self) -> bool {
        self.skip_death_tests.unwrap_or(false)
    }

    /// Force death tests on or off, overriding the detected default.
    pub fn set_skip_death_tests(&mut self, skip: bool) {
        self.skip_death_tests = Some(skip);
    }

    /// Whether a failure skips the remaining tests of its module.
    pub fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }

    /// Enable or disable skipping the rest of a module after a failure.
    pub fn set_stop_on_failure(&mut self, stop: bool) {
        self.stop_on_failure = stop;
    }
}

/// Detect a memory-checking instrumentation environment.
///
/// Valgrind injects itself through an LD_PRELOAD shim, which is the only
/// environment signal this harness reads.
fn under_memcheck() -> bool {
    match env::var("LD_PRELOAD") {
        Ok(preload) => preload.contains("vgpreload") || preload.contains("valgrind"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_survives_finalize() {
        let mut opts = RunOptions::default();
        opts.set_skip_death_tests(true);
        opts.finalize();
        assert!(opts.skip_death_tests());

        let mut opts = RunOptions::default();
        opts.set_skip_death_tests(false);
        opts.finalize();
        assert!(!opts.skip_death_tests());
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut opts = RunOptions::default();
        opts.finalize();
        let first = opts.skip_death_tests();
        opts.finalize();
        assert_eq!(opts.skip_death_tests(), first);
    }

    #[test]
    fn stop_on_failure_defaults_off() {
        let opts = RunOptions::default();
        assert!(!opts.stop_on_failure());
    }
}
