// SPDX-License-Identifier: Apache-2.0

//! Assertion macros.
//!
//! Every macro takes the test handle first. The `expect_*` family records
//! a failure and lets the body continue; the `assert_*` family records a
//! failure and returns from the body at once. Death-test checks always
//! return early on failure. Diagnostics carry file, line, and the failing
//! expression.
//!
//! `assert!`, `assert_eq!`, and `assert_ne!` deliberately shadow the
//! standard macros when imported; call them as `tinyunit::assert!` or
//! bring them in with `use tinyunit::{assert, assert_eq, assert_ne};`.

/// Record a failure when the condition is false; keep running.
#[macro_export]
macro_rules! expect {
    ($t:expr, $cond:expr) => {
        if !$cond {
            $t.fail_at(file!(), line!(), format_args!("'{}'", stringify!($cond)));
        }
    };
}

/// Record a failure when the condition is false; return from the body.
#[macro_export]
macro_rules! assert {
    ($t:expr, $cond:expr) => {
        if !$cond {
            $t.fail_at(file!(), line!(), format_args!("'{}'", stringify!($cond)));
            return;
        }
    };
}

/// Record a failure when the operands differ; keep running.
#[macro_export]
macro_rules! expect_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right) = (&$a, &$b);
        if !(left == right) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} == {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
        }
    }};
}

/// Record a failure when the operands differ; return from the body.
#[macro_export]
macro_rules! assert_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right) = (&$a, &$b);
        if !(left == right) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} == {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
            return;
        }
    }};
}

/// Record a failure when the operands are equal; keep running.
#[macro_export]
macro_rules! expect_ne {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right) = (&$a, &$b);
        if left == right {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} != {}' (both: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left
                ),
            );
        }
    }};
}

/// Record a failure when the operands are equal; return from the body.
#[macro_export]
macro_rules! assert_ne {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right) = (&$a, &$b);
        if left == right {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} != {}' (both: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left
                ),
            );
            return;
        }
    }};
}

/// String equality; keep running on mismatch.
#[macro_export]
macro_rules! expect_str_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (&str, &str) = (&$a, &$b);
        if left != right {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} == {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
        }
    }};
}

/// String equality; return from the body on mismatch.
#[macro_export]
macro_rules! assert_str_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (&str, &str) = (&$a, &$b);
        if left != right {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} == {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
            return;
        }
    }};
}

/// String inequality; keep running on match.
#[macro_export]
macro_rules! expect_str_ne {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (&str, &str) = (&$a, &$b);
        if left == right {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} != {}' (both: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left
                ),
            );
        }
    }};
}

/// String inequality; return from the body on match.
#[macro_export]
macro_rules! assert_str_ne {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (&str, &str) = (&$a, &$b);
        if left == right {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} != {}' (both: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left
                ),
            );
            return;
        }
    }};
}

/// Element-wise slice equality, reporting the first differing index; keep
/// running on mismatch.
#[macro_export]
macro_rules! expect_slice_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right) = (&$a, &$b);
        if left.len() != right.len() {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{}' and '{}' differ in length ({} vs {})",
                    stringify!($a),
                    stringify!($b),
                    left.len(),
                    right.len()
                ),
            );
        } else if let Some(at) = (0..left.len()).find(|&i| left[i] != right[i]) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{}' and '{}' differ at index {}",
                    stringify!($a),
                    stringify!($b),
                    at
                ),
            );
        }
    }};
}

/// Element-wise slice equality; return from the body on mismatch.
#[macro_export]
macro_rules! assert_slice_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right) = (&$a, &$b);
        if left.len() != right.len() {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{}' and '{}' differ in length ({} vs {})",
                    stringify!($a),
                    stringify!($b),
                    left.len(),
                    right.len()
                ),
            );
            return;
        }
        if let Some(at) = (0..left.len()).find(|&i| left[i] != right[i]) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{}' and '{}' differ at index {}",
                    stringify!($a),
                    stringify!($b),
                    at
                ),
            );
            return;
        }
    }};
}

/// Single-precision ULP equality; keep running on mismatch.
#[macro_export]
macro_rules! expect_float_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (f32, f32) = ($a, $b);
        if !$crate::float_eq(left, right) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} ~= {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
        }
    }};
}

/// Single-precision ULP equality; return from the body on mismatch.
#[macro_export]
macro_rules! assert_float_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (f32, f32) = ($a, $b);
        if !$crate::float_eq(left, right) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} ~= {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
            return;
        }
    }};
}

/// Double-precision ULP equality; keep running on mismatch.
#[macro_export]
macro_rules! expect_double_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (f64, f64) = ($a, $b);
        if !$crate::double_eq(left, right) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} ~= {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
        }
    }};
}

/// Double-precision ULP equality; return from the body on mismatch.
#[macro_export]
macro_rules! assert_double_eq {
    ($t:expr, $a:expr, $b:expr) => {{
        let (left, right): (f64, f64) = ($a, $b);
        if !$crate::double_eq(left, right) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{} ~= {}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    stringify!($b),
                    left,
                    right
                ),
            );
            return;
        }
    }};
}

/// Numeric near-equality within a caller-supplied absolute tolerance;
/// keep running on mismatch.
#[macro_export]
macro_rules! expect_near {
    ($t:expr, $a:expr, $b:expr, $tolerance:expr) => {{
        let (left, right, tolerance) = ($a, $b, $tolerance);
        if !((left - right).abs() <= tolerance) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{}' within {:?} of '{}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    tolerance,
                    stringify!($b),
                    left,
                    right
                ),
            );
        }
    }};
}

/// Numeric near-equality within a caller-supplied absolute tolerance;
/// return from the body on mismatch.
#[macro_export]
macro_rules! assert_near {
    ($t:expr, $a:expr, $b:expr, $tolerance:expr) => {{
        let (left, right, tolerance) = ($a, $b, $tolerance);
        if !((left - right).abs() <= tolerance) {
            $t.fail_at(
                file!(),
                line!(),
                format_args!(
                    "'{}' within {:?} of '{}' (left: {:?}, right: {:?})",
                    stringify!($a),
                    tolerance,
                    stringify!($b),
                    left,
                    right
                ),
            );
            return;
        }
    }};
}

/// Mark the test skipped and return from the body at once.
#[macro_export]
macro_rules! skip {
    ($t:expr) => {{
        $t.skip();
        return;
    }};
}

/// Mark the test failed and return from the body at once.
#[macro_export]
macro_rules! fail {
    ($t:expr) => {{
        $t.fail();
        return;
    }};
}

/// Run a statement in a forked child and check its termination against an
/// [`ExitPredicate`](crate::ExitPredicate), optionally also against the
/// exact stderr text the child produced. Fails and returns early on
/// mismatch; skipped entirely (statement never executed) when the run
/// options skip death tests.
#[macro_export]
macro_rules! expect_exit {
    ($t:expr, $stmt:expr, $predicate:expr) => {
        $crate::expect_exit!($t, $stmt, $predicate, @expected ::core::option::Option::None)
    };
    ($t:expr, $stmt:expr, $predicate:expr, $expected:expr) => {
        $crate::expect_exit!($t, $stmt, $predicate, @expected ::core::option::Option::Some($expected))
    };
    ($t:expr, $stmt:expr, $predicate:expr, @expected $expected:expr) => {{
        if $t.death_tests_skipped() {
            $t.skip();
            return;
        }
        let __death = $crate::DeathTest::begin();
        if __death.is_child() {
            { $stmt; }
        }
        let __outcome = __death.end();
        let __expected: ::core::option::Option<&str> = $expected;
        if !$t.check_death(
            &__outcome,
            &$predicate,
            __expected,
            file!(),
            line!(),
            stringify!($stmt),
        ) {
            return;
        }
    }};
}

/// Run a statement expected to die abnormally, checking the exact stderr
/// text it leaves behind. Shorthand for [`expect_exit!`] with the
/// abnormal-exit predicate.
#[macro_export]
macro_rules! expect_death {
    ($t:expr, $stmt:expr) => {
        $crate::expect_exit!($t, $stmt, $crate::ExitPredicate::Abnormal)
    };
    ($t:expr, $stmt:expr, $expected:expr) => {
        $crate::expect_exit!($t, $stmt, $crate::ExitPredicate::Abnormal, $expected)
    };
}
