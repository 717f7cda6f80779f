// SPDX-License-Identifier: Apache-2.0

//! Module execution and the top-level run entry points.
//!
//! Execution is strictly sequential: modules run one at a time in
//! registration order, tests within a module likewise. The only second
//! execution context ever introduced is the forked death test child.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::case::{Status, TestCase};
use crate::options::RunOptions;
use crate::registry::{Behavior, Counts, Module, Registry, TestBody};
use crate::report;

/// Aggregated counters and runtime for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub counts: Counts,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Whether the run had no failing test.
    pub fn success(&self) -> bool {
        self.counts.failed == 0
    }

    fn absorb(&mut self, module: &Module) {
        self.counts.passed += module.counts.passed;
        self.counts.failed += module.counts.failed;
        self.counts.skipped += module.counts.skipped;
        self.elapsed += module.elapsed;
    }
}

/// Run every registered module and print the aggregate report.
///
/// Options are finalized to their defaults first, so an earlier caller
/// override through [`Registry::options_mut`] always wins. The registry
/// stays usable afterwards; releasing it is the caller's decision.
pub fn run(registry: &mut Registry) -> RunSummary {
    registry.options_mut().finalize();
    let (modules, names, options) = registry.run_parts();

    let mut summary = RunSummary::default();
    for module in modules.iter_mut() {
        run_module(module, names, options);
        summary.absorb(module);
    }

    println!("{}", report::summary_line(summary.counts, summary.elapsed));
    summary
}

/// Run a single module by name, or `None` when it does not exist.
pub fn run_module_by_name(registry: &mut Registry, name: &str) -> Option<RunSummary> {
    registry.options_mut().finalize();
    let (modules, names, options) = registry.run_parts();

    let module = modules.iter_mut().find(|module| module.name == name)?;
    run_module(module, names, options);

    let mut summary = RunSummary::default();
    summary.absorb(module);
    Some(summary)
}

/// Collect, run everything, release the registry, and yield a process
/// exit indicator: zero when no test failed.
pub fn run_all_and_release() -> i32 {
    let mut registry = Registry::collect();
    let summary = run(&mut registry);
    drop(registry);
    i32::from(!summary.success())
}

/// Drive one module through `Init -> (RunTest)* -> Clean -> Reported`.
fn run_module(
    module: &mut Module,
    names: &HashMap<&'static str, &'static str>,
    options: &RunOptions,
) {
    module.counts = Counts::default();
    module.elapsed = Duration::ZERO;

    let pretty = names.get(module.name).copied().unwrap_or(module.name);
    println!("  {pretty}");
    log::debug!("running module `{}` ({} tests)", module.name, module.tests.len());

    let mut fixture = match module.behavior {
        Behavior::Stateless => None,
        Behavior::Fixture { make } => {
            let mut instance = make();
            instance.set_up();
            Some(instance)
        }
    };

    for test in &mut module.tests {
        if options.stop_on_failure() && module.counts.failed > 0 {
            test.status = Status::Skip;
            test.runtime = Duration::ZERO;
        } else {
            let mut case = TestCase::new(options.skip_death_tests());
            let start = Instant::now();
            match (test.body, fixture.as_mut()) {
                (TestBody::Stateless(body), _) => body(&mut case),
                (TestBody::Fixture(body), Some(instance)) => {
                    body(&mut case, instance.as_any_mut());
                }
                (TestBody::Fixture(_), None) => {
                    log::warn!(
                        "fixture test `{}` has no fixture in module `{}`",
                        test.name,
                        module.name
                    );
                    case.fail();
                }
            }
            test.runtime = start.elapsed();
            test.status = case.status();
        }

        module.elapsed += test.runtime;
        match test.status {
            Status::Pass => module.counts.passed += 1,
            Status::Fail => module.counts.failed += 1,
            Status::Skip => module.counts.skipped += 1,
        }

        let pretty = names.get(test.name).copied().unwrap_or(test.name);
        println!("    {} {}", report::glyph(test.status), pretty);
    }

    if let Some(mut instance) = fixture {
        instance.tear_down();
    }

    println!("{}\n", report::summary_line(module.counts, module.elapsed));
}
