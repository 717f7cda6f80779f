// SPDX-License-Identifier: Apache-2.0

//! Shared per-module test state.
//!
//! A fixture-backed module owns one instance of its fixture type per run:
//! built from `Default` before the first test, shared by every test of the
//! run, torn down after the last. Per-test isolation, where wanted, is the
//! fixture's own business in `set_up`/`tear_down`.

use std::any::Any;

/// Shared state for a fixture-backed module.
///
/// Register tests against an implementing type with
/// `#[def_fixture_test(TheType)]`; the type name doubles as the module
/// name. Both lifecycle hooks default to no-ops.
pub trait Fixture: Default + Any {
    /// Runs once per module run, before the first test.
    fn set_up(&mut self) {}

    /// Runs once per module run, after the last test.
    fn tear_down(&mut self) {}
}

/// Object-safe view of a fixture, so the runner can drive any fixture type
/// through one code path.
#[doc(hidden)]
pub trait AnyFixture {
    fn set_up(&mut self);
    fn tear_down(&mut self);
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<F: Fixture> AnyFixture for F {
    fn set_up(&mut self) {
        Fixture::set_up(self);
    }

    fn tear_down(&mut self) {
        Fixture::tear_down(self);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Monomorphic constructor stored in a registration entry.
#[doc(hidden)]
pub fn make_boxed<F: Fixture>() -> Box<dyn AnyFixture> {
    Box::new(F::default())
}
