// SPDX-License-Identifier: Apache-2.0

//! Subprocess isolation for death tests.
//!
//! A death test runs a statement that is expected to crash or exit
//! abnormally. The statement executes in a forked child whose stderr is
//! redirected into a pipe; the parent waits for termination, captures the
//! output, and classifies the wait status against an [`ExitPredicate`].
//!
//! Failures of the harness itself (pipe, fork, wait, read) are not test
//! failures: the process cannot provide a reliable execution environment
//! after one, so they terminate the whole test run.

use std::io;
use std::process;

use thiserror::Error;

/// Upper bound on captured child stderr, in bytes.
const CAPTURE_LIMIT: usize = 4096;

/// Operating-system level failures of the death test machinery.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to create the capture pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("failed to fork the death test child: {0}")]
    Fork(#[source] io::Error),
    #[error("failed to wait for the death test child: {0}")]
    Wait(#[source] io::Error),
    #[error("failed to read captured child output: {0}")]
    Read(#[source] io::Error),
}

/// Expected termination of a death test child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPredicate {
    /// Exited normally with exactly this code.
    Code(i32),
    /// Terminated by exactly this signal.
    Signal(i32),
    /// Exited normally with any nonzero code.
    Abnormal,
}

impl ExitPredicate {
    /// Whether a raw wait status satisfies this predicate.
    pub fn matches(&self, status: i32) -> bool {
        match *self {
            ExitPredicate::Code(code) => {
                libc::WIFEXITED(status) && libc::WEXITSTATUS(status) == code
            }
            ExitPredicate::Signal(signal) => {
                libc::WIFSIGNALED(status) && libc::WTERMSIG(status) == signal
            }
            ExitPredicate::Abnormal => {
                libc::WIFEXITED(status) && libc::WEXITSTATUS(status) != 0
            }
        }
    }

    /// Render the expected termination for diagnostics.
    pub fn describe(&self) -> String {
        match *self {
            ExitPredicate::Code(code) => format!("code({code})"),
            ExitPredicate::Signal(signal) => format!("signal({signal})"),
            ExitPredicate::Abnormal => "abnormal exit".to_string(),
        }
    }
}

/// Render a raw wait status for diagnostics.
pub fn describe_status(status: i32) -> String {
    if libc::WIFEXITED(status) {
        match libc::WEXITSTATUS(status) {
            0 => "exited normally".to_string(),
            code => format!("code({code})"),
        }
    } else if libc::WIFSIGNALED(status) {
        format!("signal({})", libc::WTERMSIG(status))
    } else {
        "unknown".to_string()
    }
}

/// What the parent observed once the child terminated.
#[derive(Debug)]
pub struct DeathOutcome {
    /// Raw wait status, classified by [`ExitPredicate::matches`].
    pub status: i32,
    /// Captured child stderr, trimmed of surrounding whitespace.
    pub output: String,
}

/// One in-flight death test, live in both the parent and the child.
#[derive(Debug)]
pub struct DeathTest {
    pid: libc::pid_t,
    read_fd: libc::c_int,
    write_fd: libc::c_int,
}

impl DeathTest {
    /// Create the capture pipe and fork.
    ///
    /// In the child this returns with stderr redirected into the pipe, so
    /// the caller's statement under test executes in the child. In the
    /// parent it returns a handle to pass to [`DeathTest::end`].
    pub fn begin() -> Self {
        match Self::try_begin() {
            Ok(death) => death,
            Err(err) => fatal(err),
        }
    }

    fn try_begin() -> Result<Self, HarnessError> {
        let mut fds = [0 as libc::c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(HarnessError::Pipe(io::Error::last_os_error()));
        }
        let [read_fd, write_fd] = fds;

        match unsafe { libc::fork() } {
            -1 => {
                unsafe {
                    libc::close(read_fd);
                    libc::close(write_fd);
                }
                Err(HarnessError::Fork(io::Error::last_os_error()))
            }
            0 => {
                // A crashing child must not litter the disk with cores.
                let limit = libc::rlimit {
                    rlim_cur: 0,
                    rlim_max: 0,
                };
                if unsafe { libc::setrlimit(libc::RLIMIT_CORE, &limit) } != 0 {
                    log::warn!(
                        "could not disable core dumps in the death test child: {}",
                        io::Error::last_os_error()
                    );
                }
                unsafe {
                    libc::dup2(write_fd, libc::STDERR_FILENO);
                    libc::close(read_fd);
                }
                Ok(Self {
                    pid: 0,
                    read_fd: -1,
                    write_fd,
                })
            }
            pid => {
                unsafe { libc::close(write_fd) };
                Ok(Self {
                    pid,
                    read_fd,
                    write_fd,
                })
            }
        }
    }

    /// Whether this handle lives on the child side of the fork.
    pub fn is_child(&self) -> bool {
        self.pid == 0
    }

    /// Finish the death test.
    ///
    /// On the child path this is reached only when the statement under
    /// test neither crashed nor exited; the child then closes the
    /// redirected stream and exits with success, which the parent will
    /// report as a predicate mismatch. On the parent path it blocks until
    /// the child terminates and returns the captured outcome.
    pub fn end(self) -> DeathOutcome {
        if self.pid == 0 {
            unsafe {
                libc::close(self.write_fd);
                libc::_exit(0);
            }
        }

        let mut status: libc::c_int = 0;
        loop {
            let rc = unsafe { libc::waitpid(self.pid, &mut status, 0) };
            if rc >= 0 {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                fatal(HarnessError::Wait(err));
            }
        }

        let mut buf = [0u8; CAPTURE_LIMIT];
        let mut filled = 0;
        while filled < buf.len() {
            let n = unsafe {
                libc::read(
                    self.read_fd,
                    buf[filled..].as_mut_ptr().cast(),
                    buf.len() - filled,
                )
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                fatal(HarnessError::Read(err));
            }
            if n == 0 {
                break;
            }
            filled += n as usize;
        }
        unsafe { libc::close(self.read_fd) };

        let output = String::from_utf8_lossy(&buf[..filled]).trim().to_string();
        DeathOutcome { status, output }
    }
}

fn fatal(err: HarnessError) -> ! {
    eprintln!("tinyunit: fatal: {err}");
    process::exit(70);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Synthetic wait statuses in the glibc bit layout: a normal exit puts
    // the code in the second byte, a signal death puts the signal in the
    // low seven bits.
    fn exited(code: i32) -> i32 {
        code << 8
    }

    fn signaled(signal: i32) -> i32 {
        signal
    }

    #[test]
    fn code_predicate_requires_exact_code() {
        let pred = ExitPredicate::Code(42);
        assert!(pred.matches(exited(42)));
        assert!(!pred.matches(exited(41)));
        assert!(!pred.matches(signaled(42 & 0x7f)));
    }

    #[test]
    fn signal_predicate_requires_exact_signal() {
        let pred = ExitPredicate::Signal(libc::SIGSEGV);
        assert!(pred.matches(signaled(libc::SIGSEGV)));
        assert!(!pred.matches(signaled(libc::SIGKILL)));
        assert!(!pred.matches(exited(libc::SIGSEGV)));
    }

    #[test]
    fn abnormal_predicate_means_nonzero_normal_exit() {
        let pred = ExitPredicate::Abnormal;
        assert!(pred.matches(exited(1)));
        assert!(pred.matches(exited(255)));
        assert!(!pred.matches(exited(0)));
        assert!(!pred.matches(signaled(libc::SIGKILL)));
    }

    #[test]
    fn status_rendering() {
        assert_eq!(describe_status(exited(0)), "exited normally");
        assert_eq!(describe_status(exited(3)), "code(3)");
        assert_eq!(describe_status(signaled(9)), "signal(9)");
        // A stopped child is neither an exit nor a signal death.
        assert_eq!(describe_status((19 << 8) | 0x7f), "unknown");
    }

    #[test]
    fn predicate_rendering() {
        assert_eq!(ExitPredicate::Code(7).describe(), "code(7)");
        assert_eq!(ExitPredicate::Signal(11).describe(), "signal(11)");
        assert_eq!(ExitPredicate::Abnormal.describe(), "abnormal exit");
    }
}
