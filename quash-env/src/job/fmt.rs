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

//! Formatting of job status lines
//!
//! A status line shows the job number, a marker for the current or previous
//! job, the state and the job name:
//!
//! ```text
//! [1] + Running              sleep 100 | cat
//! ```
//!
//! With the alternate flag (`{:#}`), the process IDs of the job are listed
//! after the state:
//!
//! ```text
//! [1] + Running              sleep 100 | cat (4101 4102)
//! ```

use super::Job;
use super::JobList;
use super::ProcessState;
use itertools::Itertools as _;
use std::fmt::Display;
use std::fmt::Formatter;

/// Formats the state as shown in job status lines.
///
/// An exit status of zero is shown as `Done` and any other exit status as
/// `Done(n)`. A terminated process is shown as `Killed(SIGNAME)`, with
/// `: core dumped` appended inside the parentheses when a core was dumped.
impl Display for ProcessState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Running => "Running".fmt(f),
            ProcessState::Stopped(signal) => format!("Stopped({})", signal.as_str()).fmt(f),
            ProcessState::Exited(exit_status) if exit_status.is_successful() => "Done".fmt(f),
            ProcessState::Exited(exit_status) => format!("Done({exit_status})").fmt(f),
            ProcessState::Signaled { signal, core_dump } => {
                let suffix = if *core_dump { ": core dumped" } else { "" };
                format!("Killed({}{suffix})", signal.as_str()).fmt(f)
            }
        }
    }
}

/// Marker that indicates the current or previous job
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Marker {
    /// Neither the current nor the previous job
    #[default]
    None,
    /// The current job
    CurrentJob,
    /// The previous job
    PreviousJob,
}

impl Marker {
    /// Returns the marker of the job at the index in the list.
    #[must_use]
    pub fn of(jobs: &JobList, index: usize) -> Self {
        if jobs.current_job() == Some(index) {
            Marker::CurrentJob
        } else if jobs.previous_job() == Some(index) {
            Marker::PreviousJob
        } else {
            Marker::None
        }
    }

    /// Returns the character representing the marker.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Marker::None => ' ',
            Marker::CurrentJob => '+',
            Marker::PreviousJob => '-',
        }
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.as_char().fmt(f)
    }
}

/// Status line of a job
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    /// Index of the job in the job list (the job number minus one)
    pub index: usize,
    pub marker: Marker,
    pub job: &'a Job,
}

impl Report<'_> {
    /// Creates a report of the job at the index in the list.
    ///
    /// Returns `None` if there is no such job.
    #[must_use]
    pub fn new(jobs: &JobList, index: usize) -> Option<Report<'_>> {
        let job = jobs.get(index)?;
        let marker = Marker::of(jobs, index);
        Some(Report { index, marker, job })
    }

    /// Returns the job number.
    #[must_use]
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.job.state().to_string();
        write!(
            f,
            "[{}] {} {:20} {}",
            self.number(),
            self.marker,
            state,
            self.job.name
        )?;
        if f.alternate() {
            write!(f, " ({})", self.job.pids().format(" "))?;
        }
        Ok(())
    }
}
