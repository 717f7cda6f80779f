// SPDX-License-Identifier: Apache-2.0

//! A small self-registering unit test harness.
//!
//! Tests declare themselves: the `#[def_test]` and `#[def_fixture_test]`
//! attributes plant registration entries in link-time distributed slices,
//! so no master list of tests exists anywhere. The runner groups tests
//! into modules, times each one, and reports aggregated
//! passing/failing/skipped counts. Assertion primitives include
//! ULP-distance float comparison and subprocess-isolated death tests.
//!
//! ```no_run
//! use tinyunit::{def_test, expect_eq};
//!
//! #[def_test(arithmetic)]
//! fn adds_small_numbers(t: &mut tinyunit::TestCase) {
//!     expect_eq!(t, 2 + 2, 4);
//! }
//!
//! fn main() {
//!     std::process::exit(tinyunit::run_all_and_release());
//! }
//! ```

pub mod case;
pub mod death;
pub mod fixture;
pub mod float;
mod macros;
pub mod options;
pub mod registry;
mod report;
pub mod runner;

// The declaration attributes expand to paths through this re-export, so
// downstream crates never depend on linkme directly.
pub use linkme;
// Re-export the declaration attributes from the tinyunit-macros crate.
pub use tinyunit_macros::{def_fixture_test, def_test};

pub use case::{Status, TestCase};
pub use death::{DeathOutcome, DeathTest, ExitPredicate, HarnessError};
pub use fixture::Fixture;
pub use float::{FloatRepr, MAX_ULPS, almost_equal, double_eq, float_eq};
pub use options::RunOptions;
pub use registry::{
    Counts, DISPLAY_NAMES, Module, NameEntry, Registry, TESTS, Test, TestEntry,
};
pub use runner::{RunSummary, run, run_all_and_release, run_module_by_name};
