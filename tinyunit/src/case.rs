// SPDX-License-Identifier: Apache-2.0

//! The per-test handle passed to every test body.

use std::fmt;

use crate::death::{DeathOutcome, ExitPredicate, describe_status};

/// Outcome of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// The default; a body that records nothing passes.
    #[default]
    Pass,
    Fail,
    Skip,
}

/// Handle through which a test body records its outcome.
///
/// Failures are sticky: once a case has failed, nothing within the same
/// run moves it back to passing. Skipping is only possible while the case
/// is still passing, and the skip macro returns from the body immediately,
/// so nothing can follow it.
#[derive(Debug)]
pub struct TestCase {
    status: Status,
    skip_death_tests: bool,
}

impl TestCase {
    pub(crate) fn new(skip_death_tests: bool) -> Self {
        Self {
            status: Status::Pass,
            skip_death_tests,
        }
    }

    /// Current status of the case.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Record a failure.
    pub fn fail(&mut self) {
        self.status = Status::Fail;
    }

    /// Record a voluntary skip, unless the case has already failed.
    pub fn skip(&mut self) {
        if self.status == Status::Pass {
            self.status = Status::Skip;
        }
    }

    /// Whether the run's options force death tests to be skipped.
    pub fn death_tests_skipped(&self) -> bool {
        self.skip_death_tests
    }

    /// Record an assertion failure with its source context.
    #[doc(hidden)]
    pub fn fail_at(&mut self, file: &str, line: u32, detail: fmt::Arguments<'_>) {
        println!("{file}({line}): Assertion failed:\n  {detail}");
        self.fail();
    }

    /// Check a death test outcome against its predicate.
    ///
    /// Returns whether the check passed; on mismatch the case fails and a
    /// diagnostic describes expected versus actual termination and, when
    /// relevant, expected versus actual captured output.
    #[doc(hidden)]
    pub fn check_death(
        &mut self,
        outcome: &DeathOutcome,
        predicate: &ExitPredicate,
        expected_output: Option<&str>,
        file: &str,
        line: u32,
        expr: &str,
    ) -> bool {
        let status_ok = predicate.matches(outcome.status);
        let output_ok = match expected_output {
            Some(want) => want == outcome.output,
            None => true,
        };
        if status_ok && output_ok {
            return true;
        }

        println!("{file}({line}): Death test failed:\n  '{expr}'");
        if !status_ok {
            println!("  expected termination: {}", predicate.describe());
            println!("  actual termination:   {}", describe_status(outcome.status));
        }
        if let Some(want) = expected_output {
            if !output_ok {
                println!("  expected output: {want:?}");
                println!("  actual output:   {:?}", outcome.output);
            }
        }
        self.fail();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pass() {
        let case = TestCase::new(false);
        assert_eq!(case.status(), Status::Pass);
    }

    #[test]
    fn failure_is_sticky() {
        let mut case = TestCase::new(false);
        case.fail();
        case.skip();
        assert_eq!(case.status(), Status::Fail);
    }

    #[test]
    fn skip_only_from_pass() {
        let mut case = TestCase::new(false);
        case.skip();
        assert_eq!(case.status(), Status::Skip);
    }

    #[test]
    fn check_death_classifies_matching_exit() {
        let mut case = TestCase::new(false);
        let outcome = DeathOutcome {
            status: 1 << 8,
            output: "error message".to_string(),
        };
        assert!(case.check_death(
            &outcome,
            &ExitPredicate::Abnormal,
            Some("error message"),
            file!(),
            line!(),
            "my_error()",
        ));
        assert_eq!(case.status(), Status::Pass);
    }

    #[test]
    fn check_death_fails_on_output_mismatch() {
        let mut case = TestCase::new(false);
        let outcome = DeathOutcome {
            status: 1 << 8,
            output: "something else".to_string(),
        };
        assert!(!case.check_death(
            &outcome,
            &ExitPredicate::Abnormal,
            Some("error message"),
            file!(),
            line!(),
            "my_error()",
        ));
        assert_eq!(case.status(), Status::Fail);
    }

    #[test]
    fn check_death_fails_on_clean_exit() {
        let mut case = TestCase::new(false);
        let outcome = DeathOutcome {
            status: 0,
            output: String::new(),
        };
        assert!(!case.check_death(
            &outcome,
            &ExitPredicate::Signal(libc::SIGSEGV),
            None,
            file!(),
            line!(),
            "does_not_crash()",
        ));
        assert_eq!(case.status(), Status::Fail);
    }
}
