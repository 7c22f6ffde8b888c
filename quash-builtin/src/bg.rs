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

//! Bg built-in
//!
//! The bg built-in resumes jobs in the background by sending them
//! `SIGCONT`. Operands are [job specifiers](quash_env::job::id); without
//! operands, the current job is resumed. For each resumed job, a line of the
//! form `[N] name` is printed to the standard output.

use crate::common::{find_job, output, signal_job};
use quash_env::Env;
use quash_env::job::JobFlags;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_env::signal::Signal;
use std::ops::ControlFlow::Continue;

const NAME: &str = "bg";

fn resume(env: &mut Env, operand: Option<&str>) -> std::result::Result<String, String> {
    let index = find_job(env, operand).map_err(|error| error.to_string())?;
    signal_job(env, index, Signal::SIGCONT)
        .map_err(|errno| format!("cannot resume job [{}]: {errno}", index + 1))?;

    env.jobs.resume(index);
    env.jobs.set_current_job(index);
    let job = env
        .jobs
        .get_mut(index)
        .ok_or_else(|| format!("job [{}] disappeared", index + 1))?;
    job.flags.insert(JobFlags::ASYNC);
    log::debug!("job [{}] resumed in the background", index + 1);
    Ok(format!("[{}] {}\n", index + 1, job.name))
}

/// Entry point for executing the `bg` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    env.reap();

    let operands = if args.is_empty() {
        vec![None]
    } else {
        args.iter().map(|arg| Some(arg.as_str())).collect()
    };

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in operands {
        match resume(env, operand) {
            Ok(line) => {
                if output(env, &line) != ExitStatus::SUCCESS {
                    exit_status = ExitStatus::FAILURE;
                }
            }
            Err(message) => {
                env.print_error(format_args!("{NAME}: {message}"));
                exit_status = ExitStatus::FAILURE;
            }
        }
    }
    env.exit_status = exit_status;
    Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{add_job, args, dummy_env, stderr, stdout};
    use quash_env::job::{Pid, ProcessState};

    #[test]
    fn resuming_current_job() {
        let (mut env, system) = dummy_env();
        let index = add_job(&mut env, "make", &[10, 11]);
        env.jobs.get_mut(index).unwrap().flags.remove(JobFlags::ASYNC);
        env.jobs
            .update_status(Pid::from_raw(10), ProcessState::Stopped(Signal::SIGTSTP));
        env.jobs
            .update_status(Pid::from_raw(11), ProcessState::Stopped(Signal::SIGTSTP));
        assert!(env.jobs.get(index).unwrap().is_suspended());

        assert_eq!(main(&mut env, vec![]), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "[1] make\n");

        let job = env.jobs.get(index).unwrap();
        assert!(job.is_async());
        assert_eq!(job.state(), ProcessState::Running);
        assert_eq!(
            system.state.borrow().signals_sent,
            [
                (Pid::from_raw(10), Some(Signal::SIGCONT)),
                (Pid::from_raw(11), Some(Signal::SIGCONT)),
            ]
        );
    }

    #[test]
    fn resuming_several_jobs() {
        let (mut env, system) = dummy_env();
        add_job(&mut env, "a", &[10]);
        let second = add_job(&mut env, "b", &[11]);
        let first = 0;
        env.jobs.get_mut(first).unwrap().pgid = Some(Pid::from_raw(10));

        assert_eq!(main(&mut env, args(&["%2", "%1"])), Continue(()));
        assert_eq!(stdout(&system), "[2] b\n[1] a\n");
        assert_eq!(env.jobs.current_job(), Some(first));
        assert_eq!(env.jobs.previous_job(), Some(second));
        assert_eq!(
            system.state.borrow().signals_sent,
            [
                (Pid::from_raw(11), Some(Signal::SIGCONT)),
                (Pid::from_raw(-10), Some(Signal::SIGCONT)),
            ]
        );
    }

    #[test]
    fn unknown_jobs_are_reported() {
        let (mut env, system) = dummy_env();
        add_job(&mut env, "a", &[10]);
        assert_eq!(main(&mut env, args(&["%3", "x", "%1"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(stdout(&system), "[1] a\n");
        assert_eq!(
            stderr(&system),
            "quash: bg: %3: no such job\nquash: bg: x: invalid job specification\n"
        );
    }
}
