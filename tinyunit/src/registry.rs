// SPDX-License-Identifier: Apache-2.0

//! Test registration and the caller-owned registry.
//!
//! Declaring a test with `#[def_test]` or `#[def_fixture_test]` plants a
//! [`TestEntry`] in the [`TESTS`] distributed slice; no call site and no
//! master list exist anywhere. [`Registry::collect`] walks the slice once
//! and builds an owned table of modules, so teardown is an ordinary move
//! and a registry cannot be used after release.
//!
//! Entry order within one translation unit is declaration order. Across
//! units it is link order, which is deterministic per build but otherwise
//! implementation-defined.

use std::any::Any;
use std::collections::HashMap;
use std::time::Duration;

use linkme::distributed_slice;

use crate::case::{Status, TestCase};
use crate::fixture::{AnyFixture, Fixture, make_boxed};
use crate::options::RunOptions;

/// Every registered test, populated by the declaration attributes.
#[distributed_slice]
pub static TESTS: [TestEntry];

/// Function-name to human-readable-name translations for reporting.
#[distributed_slice]
pub static DISPLAY_NAMES: [NameEntry];

/// Body of a stateless test.
pub type StatelessFn = fn(&mut TestCase);

/// Body of a fixture-backed test, with its fixture passed type-erased.
pub type FixtureFn = fn(&mut TestCase, &mut dyn Any);

/// Constructor for one module's fixture instance.
pub type FixtureCtor = fn() -> Box<dyn AnyFixture>;

/// One registered test, as planted by the declaration attributes.
pub struct TestEntry {
    pub(crate) module: &'static str,
    pub(crate) name: &'static str,
    pub(crate) kind: EntryKind,
}

pub(crate) enum EntryKind {
    Stateless(StatelessFn),
    Fixture { make: FixtureCtor, run: FixtureFn },
}

impl TestEntry {
    /// Entry for a stateless test under a named module.
    pub const fn stateless(module: &'static str, name: &'static str, body: StatelessFn) -> Self {
        Self {
            module,
            name,
            kind: EntryKind::Stateless(body),
        }
    }

    /// Entry for a fixture-backed test; the fixture type names the module.
    pub const fn fixture<F: Fixture>(
        module: &'static str,
        name: &'static str,
        body: FixtureFn,
    ) -> Self {
        Self {
            module,
            name,
            kind: EntryKind::Fixture {
                make: make_boxed::<F>,
                run: body,
            },
        }
    }
}

/// One function-name to pretty-name translation.
pub struct NameEntry {
    pub(crate) function: &'static str,
    pub(crate) pretty: &'static str,
}

impl NameEntry {
    pub const fn new(function: &'static str, pretty: &'static str) -> Self {
        Self { function, pretty }
    }
}

/// Per-status counters for one module or for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
}

#[derive(Clone, Copy)]
pub(crate) enum TestBody {
    Stateless(StatelessFn),
    Fixture(FixtureFn),
}

/// One test inside a module, mutated exactly once per run.
pub struct Test {
    pub(crate) name: &'static str,
    pub(crate) status: Status,
    pub(crate) runtime: Duration,
    pub(crate) body: TestBody,
}

impl Test {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn runtime(&self) -> Duration {
        self.runtime
    }
}

pub(crate) enum Behavior {
    Stateless,
    Fixture { make: FixtureCtor },
}

/// A named, ordered group of tests sharing one execution style.
pub struct Module {
    pub(crate) name: &'static str,
    pub(crate) behavior: Behavior,
    pub(crate) tests: Vec<Test>,
    pub(crate) counts: Counts,
    pub(crate) elapsed: Duration,
}

impl Module {
    fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            tests: Vec::new(),
            counts: Counts::default(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    /// Counters from the most recent run of this module.
    pub fn counts(&self) -> Counts {
        self.counts
    }

    /// Cumulative runtime from the most recent run of this module.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Owned table of modules, lookup indices, and run options.
pub struct Registry {
    modules: Vec<Module>,
    index: HashMap<&'static str, usize>,
    display: HashMap<&'static str, &'static str>,
    options: RunOptions,
}

impl Registry {
    /// A registry with no tests, to be populated through the
    /// `get_or_create` methods.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
            index: HashMap::new(),
            display: HashMap::new(),
            options: RunOptions::default(),
        }
    }

    /// Build a registry from everything the declaration attributes
    /// registered in this binary.
    pub fn collect() -> Self {
        let mut registry = Self::empty();
        for entry in TESTS {
            match entry.kind {
                EntryKind::Stateless(body) => {
                    let module = registry.get_or_create_module(entry.module);
                    if !matches!(module.behavior, Behavior::Stateless) {
                        log::warn!(
                            "stateless test `{}` clashes with fixture module `{}`, dropped",
                            entry.name,
                            entry.module
                        );
                        continue;
                    }
                    module.tests.push(Test {
                        name: entry.name,
                        status: Status::Pass,
                        runtime: Duration::ZERO,
                        body: TestBody::Stateless(body),
                    });
                }
                EntryKind::Fixture { make, run } => {
                    let module = registry.get_or_create_fixture(entry.module, make);
                    if !matches!(module.behavior, Behavior::Fixture { .. }) {
                        log::warn!(
                            "fixture test `{}` clashes with stateless module `{}`, dropped",
                            entry.name,
                            entry.module
                        );
                        continue;
                    }
                    module.tests.push(Test {
                        name: entry.name,
                        status: Status::Pass,
                        runtime: Duration::ZERO,
                        body: TestBody::Fixture(run),
                    });
                }
            }
        }
        for name in DISPLAY_NAMES {
            registry.set_display_name(name.function, name.pretty);
        }
        registry
    }

    /// Existing module for `name`, or a fresh stateless one appended to
    /// the module list. Idempotent.
    pub fn get_or_create_module(&mut self, name: &'static str) -> &mut Module {
        self.module_slot(name, Behavior::Stateless)
    }

    /// Existing module for `name`, or a fresh fixture-backed one with the
    /// given constructor attached. Idempotent; an existing module keeps
    /// its original behavior.
    pub fn get_or_create_fixture(&mut self, name: &'static str, make: FixtureCtor) -> &mut Module {
        self.module_slot(name, Behavior::Fixture { make })
    }

    fn module_slot(&mut self, name: &'static str, behavior: Behavior) -> &mut Module {
        let next = self.modules.len();
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.modules.push(Module::new(name, behavior));
                self.index.insert(name, next);
                next
            }
        };
        &mut self.modules[idx]
    }

    /// Record a human-readable name for a test function.
    pub fn set_display_name(&mut self, function: &'static str, pretty: &'static str) {
        self.display.insert(function, pretty);
    }

    /// Pretty name for a function, or the fallback when none is recorded.
    pub fn display_name<'a>(&'a self, function: &str, fallback: &'a str) -> &'a str {
        self.display.get(function).copied().unwrap_or(fallback)
    }

    /// Registered modules, in first-seen order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RunOptions {
        &mut self.options
    }

    /// Split borrows for the runner: mutable modules alongside the name
    /// table and options.
    pub(crate) fn run_parts(
        &mut self,
    ) -> (
        &mut [Module],
        &HashMap<&'static str, &'static str>,
        &RunOptions,
    ) {
        (&mut self.modules, &self.display, &self.options)
    }
}
