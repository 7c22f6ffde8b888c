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

//! Common items for implementing built-ins

use nix::errno::Errno;
use nix::sys::signal::Signal;
use quash_env::Env;
use quash_env::job::Pid;
use quash_env::job::id::FindError;
use quash_env::job::id::JobId;
use quash_env::job::id::ParseError;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use std::fmt::Display;
use std::ops::ControlFlow::Continue;
use thiserror::Error;

/// Prints text to the standard output.
///
/// If the text cannot be printed, an error message is printed to the
/// standard error and [`ExitStatus::FAILURE`] is returned.
pub fn output(env: &mut Env, text: &str) -> ExitStatus {
    match env.print(text) {
        Ok(()) => ExitStatus::SUCCESS,
        Err(errno) => {
            env.print_error(format_args!("cannot print to the standard output: {errno}"));
            ExitStatus::FAILURE
        }
    }
}

/// Reports a failure of the built-in.
///
/// The message is printed as `quash: NAME: MESSAGE` and the exit status is
/// set to [`ExitStatus::FAILURE`].
pub fn report_failure<M: Display>(env: &mut Env, name: &str, message: M) -> Result {
    env.print_error(format_args!("{name}: {message}"));
    env.exit_status = ExitStatus::FAILURE;
    Continue(())
}

/// Reports an invalid usage of the built-in.
///
/// This is like [`report_failure`] but the exit status is
/// [`ExitStatus::ERROR`].
pub fn report_error<M: Display>(env: &mut Env, name: &str, message: M) -> Result {
    env.print_error(format_args!("{name}: {message}"));
    env.exit_status = ExitStatus::ERROR;
    Continue(())
}

/// Error in resolving a job operand
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum JobOperandError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Find(#[from] FindError),
}

/// Returns the index of the job specified by the operand.
///
/// Without an operand, the current job is chosen.
pub fn find_job(env: &Env, operand: Option<&str>) -> std::result::Result<usize, JobOperandError> {
    let job_id = match operand {
        Some(operand) => operand.parse()?,
        None => JobId::CurrentJob,
    };
    Ok(job_id.find(&env.jobs)?)
}

/// Sends a signal to the processes of a job.
///
/// The signal is sent to the process group if the job has one, and to each
/// process that has not terminated otherwise.
pub fn signal_job(env: &mut Env, index: usize, signal: Signal) -> nix::Result<()> {
    let Some(job) = env.jobs.get(index) else {
        return Err(Errno::ESRCH);
    };
    if let Some(pgid) = job.pgid {
        return env.system.kill(Pid::from_raw(-pgid.as_raw()), Some(signal));
    }

    let pids = job
        .processes
        .iter()
        .filter(|process| process.state.is_alive())
        .map(|process| process.pid)
        .collect::<Vec<_>>();
    pids.into_iter()
        .try_for_each(|pid| env.system.kill(pid, Some(signal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{add_job, dummy_env};
    use assert_matches::assert_matches;
    use quash_env::job::ProcessState;

    #[test]
    fn find_job_defaults_to_current() {
        let (mut env, _) = dummy_env();
        let first = add_job(&mut env, "a", &[10]);
        let second = add_job(&mut env, "b", &[11]);
        assert_eq!(find_job(&env, None), Ok(second));
        assert_eq!(find_job(&env, Some("%1")), Ok(first));
        assert_eq!(find_job(&env, Some("%-")), Ok(first));
        assert_matches!(find_job(&env, Some("%3")), Err(JobOperandError::Find(_)));
        assert_matches!(find_job(&env, Some("3")), Err(JobOperandError::Parse(_)));
    }

    #[test]
    fn signal_job_without_process_group() {
        let (mut env, system) = dummy_env();
        let index = add_job(&mut env, "a | b", &[10, 11, 12]);
        env.jobs
            .update_status(Pid::from_raw(11), ProcessState::Exited(ExitStatus(0)));

        signal_job(&mut env, index, Signal::SIGTERM).unwrap();
        assert_eq!(
            system.state.borrow().signals_sent,
            [
                (Pid::from_raw(10), Some(Signal::SIGTERM)),
                (Pid::from_raw(12), Some(Signal::SIGTERM)),
            ]
        );
    }

    #[test]
    fn signal_job_with_process_group() {
        let (mut env, system) = dummy_env();
        let index = add_job(&mut env, "a | b", &[10, 11]);
        env.jobs.get_mut(index).unwrap().pgid = Some(Pid::from_raw(10));

        signal_job(&mut env, index, Signal::SIGCONT).unwrap();
        assert_eq!(
            system.state.borrow().signals_sent,
            [(Pid::from_raw(-10), Some(Signal::SIGCONT))]
        );
        assert_eq!(signal_job(&mut env, 5, Signal::SIGCONT), Err(Errno::ESRCH));
    }
}
