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

//! Job specifiers accepted by the job-control built-ins
//!
//! | Specifier          | Job             |
//! |--------------------|-----------------|
//! | `%`, `%%` or `%+`  | current job     |
//! | `%-`               | previous job    |
//! | `%N`               | job number `N`  |

use super::JobList;
use std::fmt::Display;
use std::fmt::Formatter;
use std::num::NonZeroUsize;
use thiserror::Error;

/// Parsed job specifier
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum JobId {
    CurrentJob,
    PreviousJob,
    JobNumber(NonZeroUsize),
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobId::CurrentJob => "%+".fmt(f),
            JobId::PreviousJob => "%-".fmt(f),
            JobId::JobNumber(number) => write!(f, "%{number}"),
        }
    }
}

/// Error returned for a string that is not a job specifier
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("{0}: invalid job specification")]
pub struct ParseError(pub String);

/// Parses the part of a job specifier after the `%`.
pub fn parse_tail(tail: &str) -> Option<JobId> {
    match tail {
        "" | "%" | "+" => Some(JobId::CurrentJob),
        "-" => Some(JobId::PreviousJob),
        _ if tail.bytes().all(|b| b.is_ascii_digit()) => {
            tail.parse().ok().map(JobId::JobNumber)
        }
        _ => None,
    }
}

/// Parses a job specifier.
pub fn parse(job_id: &str) -> Result<JobId, ParseError> {
    job_id
        .strip_prefix('%')
        .and_then(parse_tail)
        .ok_or_else(|| ParseError(job_id.to_owned()))
}

impl std::str::FromStr for JobId {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, ParseError> {
        parse(s)
    }
}

/// Error returned when a job specifier does not match a job
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[error("{0}: no such job")]
pub struct FindError(pub JobId);

impl JobId {
    /// Returns the index of the job the specifier refers to.
    pub fn find(self, jobs: &JobList) -> Result<usize, FindError> {
        let index = match self {
            JobId::CurrentJob => jobs.current_job(),
            JobId::PreviousJob => jobs.previous_job(),
            JobId::JobNumber(number) => Some(number.get() - 1),
        };
        index
            .filter(|&index| jobs.get(index).is_some())
            .ok_or(FindError(self))
    }
}
