// This file is part of quash, a job-control shell.
// Copyright (C) 2026 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! API declarations for the system-managed parts of the environment
//!
//! The [`System`] trait is the only way the shell touches the operating
//! system. [`RealSystem`](real::RealSystem) performs real system calls.
//! With the `test-helper` feature, [`DummySystem`](dummy::DummySystem)
//! records the calls for inspection instead.

#[cfg(any(test, feature = "test-helper"))]
pub mod dummy;
pub mod real;

use crate::io::Fd;
use nix::fcntl::OFlag;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode;
use nix::sys::wait::WaitStatus;
pub use nix::unistd::ForkResult;
use nix::unistd::Pid;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::fmt::Debug;
use std::path::Path;
use std::path::PathBuf;

/// How a signal is handled by the shell process
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SignalHandling {
    /// Perform the default action for the signal.
    #[default]
    Default,
    /// Ignore the signal.
    Ignore,
    /// Record the signal so that it can be retrieved by
    /// [`System::caught_signals`].
    Catch,
}

/// API to the system-managed parts of the environment.
///
/// The `System` trait defines a collection of methods to access the underlying
/// operating system from the shell as an application program.
pub trait System: Debug {
    /// Creates an unnamed pipe.
    ///
    /// This is a thin wrapper around the `pipe` system call.
    /// If successful, returns the reading and writing ends of the pipe.
    fn pipe(&mut self) -> nix::Result<(Fd, Fd)>;

    /// Duplicates a file descriptor.
    ///
    /// The new FD is the minimum unused FD not less than `to_min`. The
    /// `cloexec` parameter specifies whether the new FD should have the
    /// `CLOEXEC` flag set.
    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> nix::Result<Fd>;

    /// Duplicates a file descriptor.
    ///
    /// This is a thin wrapper around the `dup2` system call. If successful,
    /// returns `Ok(to)`.
    fn dup2(&mut self, from: Fd, to: Fd) -> nix::Result<Fd>;

    /// Closes a file descriptor.
    ///
    /// This function returns `Ok(())` when the FD is already closed.
    fn close(&mut self, fd: Fd) -> nix::Result<()>;

    /// Opens a file.
    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> nix::Result<Fd>;

    /// Writes to the file descriptor.
    ///
    /// This is a thin wrapper around the `write` system call.
    /// If successful, returns the number of bytes written.
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> nix::Result<usize>;

    /// Tests if a file descriptor is associated with a terminal device.
    fn isatty(&self, fd: Fd) -> bool;

    /// Creates a new child process.
    ///
    /// This is a thin wrapper around the `fork` system call. Users of `Env`
    /// should not call it directly. Instead, use
    /// [`Subshell`](crate::subshell::Subshell) so that the child is set up
    /// for job control.
    fn fork(&mut self) -> nix::Result<ForkResult>;

    /// Replaces the current process with an external utility found in
    /// `$PATH`.
    ///
    /// This function returns only on error.
    fn execvp(&mut self, name: &CStr, args: &[CString]) -> nix::Result<Infallible>;

    /// Reports a state change of a child process without blocking.
    ///
    /// This is a wrapper around the `waitpid` system call with the `WNOHANG`,
    /// `WUNTRACED` and `WCONTINUED` options. `None` targets any child.
    /// `Ok(WaitStatus::StillAlive)` means no child has changed its state.
    fn wait(&mut self, target: Option<Pid>) -> nix::Result<WaitStatus>;

    /// Sends a signal to a process or, with a negative `target`, to a
    /// process group.
    ///
    /// `None` checks whether the target exists without sending a signal.
    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> nix::Result<()>;

    /// Returns the process ID of the current process.
    fn getpid(&self) -> Pid;

    /// Returns the process group ID of the current process.
    fn getpgrp(&self) -> Pid;

    /// Modifies the process group ID of a process.
    ///
    /// A zero `pid` means the current process. A zero `pgid` means the
    /// process ID of `pid`.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> nix::Result<()>;

    /// Returns the foreground process group of the terminal.
    fn tcgetpgrp(&self, fd: Fd) -> nix::Result<Pid>;

    /// Makes a process group the foreground of the terminal.
    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> nix::Result<()>;

    /// Gets and/or sets the signal blocking mask.
    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        old_set: Option<&mut SigSet>,
    ) -> nix::Result<()>;

    /// Sets how a signal is handled.
    ///
    /// Returns the previous handling.
    fn sigaction(&mut self, signal: Signal, handling: SignalHandling)
    -> nix::Result<SignalHandling>;

    /// Returns the signals caught since the last call, emptying the record.
    fn caught_signals(&mut self) -> Vec<Signal>;

    /// Waits for a signal with the signal mask temporarily replaced by
    /// `mask`.
    ///
    /// Returns `Ok(())` after a signal was caught.
    fn sigsuspend(&mut self, mask: &SigSet) -> nix::Result<()>;

    /// Returns the current working directory.
    fn getcwd(&self) -> nix::Result<PathBuf>;

    /// Changes the current working directory.
    fn chdir(&mut self, path: &Path) -> nix::Result<()>;

    /// Returns the value of an environment variable.
    ///
    /// Returns `None` if the variable is not set or its value is not valid
    /// UTF-8.
    fn getenv(&self, name: &str) -> Option<String>;

    /// Sets an environment variable.
    ///
    /// Fails with `EINVAL` if the name is empty or contains `=` or a nul
    /// byte, or the value contains a nul byte.
    fn setenv(&mut self, name: &str, value: &str) -> nix::Result<()>;

    /// Returns all environment variables that are valid UTF-8, sorted by
    /// name.
    fn environ(&self) -> Vec<(String, String)>;
}

/// Tests whether `setenv` accepts the name and value.
fn is_valid_env(name: &str, value: &str) -> bool {
    !name.is_empty() && !name.contains(['=', '\0']) && !value.contains('\0')
}
