//! Test-runner binding consumed by the fixture.
//!
//! # Design
//! The fixture never talks to a test framework directly. It consumes the
//! small `Reporter` capability set — query failure state, query verbosity,
//! emit a log line, record an assertion failure — and any runner binding
//! can satisfy it. `TestReporter` is the bundled libtest binding: failures
//! accumulate without aborting the case, so later assertions still run,
//! and undrained failures panic when the reporter drops.
//!
//! Failure locations are captured with `#[track_caller]` in the fixture's
//! assertion methods, so a reported failure points at the test code, not
//! at this harness.

use std::cell::RefCell;
use std::fmt;
use std::panic::Location;

/// One recorded assertion mismatch.
#[derive(Debug, Clone)]
pub struct AssertionFailure {
    pub expected: String,
    pub actual: String,
    pub message: String,
    pub location: &'static Location<'static>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}\n  expected: {}\n  actual:   {}",
            self.location, self.message, self.expected, self.actual
        )
    }
}

/// Capabilities the fixture consumes from the surrounding test runner.
pub trait Reporter {
    /// True once at least one assertion failure has been recorded.
    fn failed(&self) -> bool;

    /// True when the operator asked for diagnostics on success too.
    fn verbose(&self) -> bool;

    /// Emits one diagnostic message through the runner's log channel.
    fn log(&self, message: &str);

    /// Records an assertion mismatch without aborting the test case.
    fn fail(&self, failure: AssertionFailure);
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn failed(&self) -> bool {
        (**self).failed()
    }

    fn verbose(&self) -> bool {
        (**self).verbose()
    }

    fn log(&self, message: &str) {
        (**self).log(message)
    }

    fn fail(&self, failure: AssertionFailure) {
        (**self).fail(failure)
    }
}

/// Libtest binding: soft assertion failures that still fail the case.
///
/// Verbosity is an explicit constructor flag rather than ambient process
/// state, keeping parallel test cases hermetic. Each failure is printed as
/// it is recorded; if any remain undrained when the reporter drops, the
/// drop panics so the surrounding `#[test]` fails.
#[derive(Debug, Default)]
pub struct TestReporter {
    verbose: bool,
    failures: RefCell<Vec<AssertionFailure>>,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            failures: RefCell::new(Vec::new()),
        }
    }

    /// Removes and returns all recorded failures, resetting the failed
    /// state. Used by tests that expect mismatches.
    pub fn take_failures(&self) -> Vec<AssertionFailure> {
        self.failures.borrow_mut().drain(..).collect()
    }
}

impl Reporter for TestReporter {
    fn failed(&self) -> bool {
        !self.failures.borrow().is_empty()
    }

    fn verbose(&self) -> bool {
        self.verbose
    }

    fn log(&self, message: &str) {
        println!("{message}");
    }

    fn fail(&self, failure: AssertionFailure) {
        eprintln!("{failure}");
        self.failures.borrow_mut().push(failure);
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let count = self.failures.get_mut().len();
        if count > 0 {
            panic!("{count} assertion failure(s), see output above");
        }
    }
}
