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

//! Types for command execution results

use nix::sys::signal::Signal;
use std::ffi::c_int;
use std::ops::ControlFlow;

/// Number that summarizes the result of command execution
///
/// An exit status is an integer returned from a utility (or command) when
/// executed. It usually is a summarized result of the execution.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

/// Converts a signal to the exit status of a process terminated or stopped by
/// it.
///
/// The exit status is the signal number.
impl From<Signal> for ExitStatus {
    fn from(signal: Signal) -> Self {
        Self(signal as c_int)
    }
}

impl ExitStatus {
    /// Exit status of 0: success
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Exit status of 1: failure
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Exit status of 2: error severer than failure
    pub const ERROR: ExitStatus = ExitStatus(2);

    /// Exit status of 126: command not executable
    pub const NOEXEC: ExitStatus = ExitStatus(126);

    /// Exit status of 127: command not found
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Returns true if and only if `self` is zero.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.0 == 0
    }
}

/// Result of interrupted command execution
///
/// `Divert` implements `Ord`. Values are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Exit from the current shell execution environment.
    ///
    /// This applies to the shell process itself or to a forked child running
    /// part of a pipeline. The associated exit status, if any, overrides the
    /// current `$?`.
    Exit(Option<ExitStatus>),
}

impl Divert {
    /// Returns the exit status associated with the `Divert`.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Divert::Exit(exit_status) => *exit_status,
        }
    }
}

/// Result of command execution
///
/// If the command was interrupted in the middle of execution, the result value
/// will be a `Break` having a [`Divert`] value which specifies what to execute
/// next.
pub type Result<T = ()> = ControlFlow<Divert, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_of_signal_is_signal_number() {
        assert_eq!(ExitStatus::from(Signal::SIGKILL), ExitStatus(9));
        assert_eq!(ExitStatus::from(Signal::SIGINT), ExitStatus(2));
    }

    #[test]
    fn divert_exit_status() {
        assert_eq!(Divert::Exit(None).exit_status(), None);
        assert_eq!(
            Divert::Exit(Some(ExitStatus(3))).exit_status(),
            Some(ExitStatus(3))
        );
    }

    #[test]
    fn successful_only_for_zero() {
        assert!(ExitStatus::SUCCESS.is_successful());
        assert!(!ExitStatus::FAILURE.is_successful());
        assert!(!ExitStatus(-1).is_successful());
    }
}
