// SPDX-License-Identifier: Apache-2.0

//! Death tests through the real fork/pipe harness: exit codes, signals,
//! captured stderr, mismatch reporting, and the global skip policy.

use std::sync::atomic::{AtomicUsize, Ordering};

use tinyunit::{ExitPredicate, Registry, Status, TestCase, def_test, expect_death, expect_exit};

#[def_test(death)]
fn dies_with_error_message(t: &mut TestCase) {
    expect_death!(
        t,
        {
            eprint!("error message");
            std::process::exit(1);
        },
        "error message"
    );
}

#[def_test(death)]
fn exits_with_exact_code(t: &mut TestCase) {
    expect_exit!(t, std::process::exit(7), ExitPredicate::Code(7));
}

#[def_test(death)]
fn null_write_raises_sigsegv(t: &mut TestCase) {
    expect_exit!(
        t,
        unsafe { std::ptr::null_mut::<u8>().write_volatile(b'A') },
        ExitPredicate::Signal(libc::SIGSEGV)
    );
}

#[def_test(death)]
fn abort_raises_sigabrt(t: &mut TestCase) {
    expect_exit!(t, std::process::abort(), ExitPredicate::Signal(libc::SIGABRT));
}

#[def_test(death)]
fn whitespace_is_trimmed_from_capture(t: &mut TestCase) {
    expect_death!(
        t,
        {
            eprintln!("  padded  ");
            std::process::exit(2);
        },
        "padded"
    );
}

// A statement that survives must be reported as a mismatch against an
// abnormal-exit expectation; the driver below checks the resulting Fail.
#[def_test(death_mismatch)]
fn surviving_statement_fails_the_check(t: &mut TestCase) {
    expect_death!(t, (), "never printed");
}

static POLICY_STATEMENT_RAN: AtomicUsize = AtomicUsize::new(0);

#[def_test(death_policy)]
fn skipped_under_policy(t: &mut TestCase) {
    expect_exit!(
        t,
        {
            POLICY_STATEMENT_RAN.fetch_add(1, Ordering::SeqCst);
            std::process::abort();
        },
        ExitPredicate::Signal(libc::SIGABRT)
    );
}

#[test]
fn death_suite_passes() {
    let mut registry = Registry::collect();
    registry.options_mut().set_skip_death_tests(false);

    let summary = tinyunit::run_module_by_name(&mut registry, "death").expect("module exists");
    assert_eq!(summary.counts.passed, 5);
    assert_eq!(summary.counts.failed, 0);
    assert_eq!(summary.counts.skipped, 0);
}

#[test]
fn surviving_statement_is_a_recoverable_failure() {
    let mut registry = Registry::collect();
    registry.options_mut().set_skip_death_tests(false);

    let summary =
        tinyunit::run_module_by_name(&mut registry, "death_mismatch").expect("module exists");
    assert_eq!(summary.counts.failed, 1);

    let module = registry
        .modules()
        .iter()
        .find(|module| module.name() == "death_mismatch")
        .expect("module registered");
    assert_eq!(module.tests()[0].status(), Status::Fail);
}

#[test]
fn skip_policy_never_executes_the_statement() {
    let mut registry = Registry::collect();
    registry.options_mut().set_skip_death_tests(true);

    let summary =
        tinyunit::run_module_by_name(&mut registry, "death_policy").expect("module exists");
    assert_eq!(summary.counts.skipped, 1);
    assert_eq!(summary.counts.passed, 0);
    assert_eq!(summary.counts.failed, 0);
    // The statement never ran in this process. (A forked child could not
    // have bumped the parent's counter either way, but under the skip
    // policy there is no child at all.)
    assert_eq!(POLICY_STATEMENT_RAN.load(Ordering::SeqCst), 0);
}
