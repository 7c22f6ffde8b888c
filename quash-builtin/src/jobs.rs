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

//! Jobs built-in
//!
//! The jobs built-in prints the status of jobs:
//!
//! ```text
//! [1] - Running              sleep 100 | cat
//! [2] + Stopped(SIGTSTP)     vi
//! ```
//!
//! With the `-l` option, the process IDs of each job are appended. Operands
//! are [job specifiers](quash_env::job::id) that choose the jobs to print;
//! without operands, all jobs are printed.
//!
//! Jobs that have finished are removed from the job list once printed, and
//! the printed jobs are no longer reported by the shell as changed.

use crate::common::{find_job, output, report_error};
use quash_env::Env;
use quash_env::job::fmt::Report;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;

const NAME: &str = "jobs";

/// Entry point for executing the `jobs` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    let mut long = false;
    let mut operands = args.as_slice();
    while let Some((first, rest)) = operands.split_first() {
        match first.as_str() {
            "-l" => long = true,
            "--" => {
                operands = rest;
                break;
            }
            option if option.starts_with('-') && option != "-" => {
                return report_error(env, NAME, format_args!("{option}: invalid option"));
            }
            _ => break,
        }
        operands = rest;
    }

    env.reap();

    let mut exit_status = ExitStatus::SUCCESS;
    let indices = if operands.is_empty() {
        env.jobs.iter().map(|(index, _)| index).collect()
    } else {
        let mut indices = Vec::new();
        for operand in operands {
            match find_job(env, Some(operand)) {
                Ok(index) => indices.push(index),
                Err(error) => {
                    env.print_error(format_args!("{NAME}: {error}"));
                    exit_status = ExitStatus::FAILURE;
                }
            }
        }
        indices
    };

    let mut text = String::new();
    for &index in &indices {
        if let Some(report) = Report::new(&env.jobs, index) {
            if long {
                text.push_str(&format!("{report:#}\n"));
            } else {
                text.push_str(&format!("{report}\n"));
            }
        }
    }
    let print_status = output(env, &text);

    for index in indices {
        let finished = match env.jobs.get_mut(index) {
            Some(job) => {
                job.state_changed = false;
                job.is_finished()
            }
            None => false,
        };
        if finished {
            env.jobs.remove(index);
        }
    }

    env.exit_status = if print_status.is_successful() {
        exit_status
    } else {
        print_status
    };
    Continue(())
}
