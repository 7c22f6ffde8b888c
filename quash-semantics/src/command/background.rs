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

//! Execution of asynchronous commands

use super::pipeline::add_job;
use super::pipeline::start_job;
use quash_env::Env;
use quash_env::io::Fd;
use quash_env::job::Job;
use quash_env::job::JobFlags;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_env::subshell::JobControl;
use quash_syntax::syntax::Node;
use std::ops::ControlFlow::Continue;

/// Starts the command as a background job.
///
/// A pipeline starts one process per stage. Any other command, including
/// a built-in or an and-or list, runs in a single child process. The job
/// number and the process ID of the last process are printed to the
/// standard error as `[N] PID`.
///
/// The exit status is always zero. Errors in starting the job are only
/// printed.
pub fn execute(env: &mut Env, node: &Node) -> Result {
    start(env, node);
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}

fn start(env: &mut Env, node: &Node) {
    let mut job = Job::new(node.to_string());
    job.flags |= JobFlags::ASYNC;
    let Some(index) = add_job(env, job) else {
        return;
    };

    let stages = node.pipeline_stages();
    if !start_job(env, index, &stages, JobControl::Background) {
        log::debug!("not every process of job [{}] started", index + 1);
    }

    let Some(pid) = env.jobs.get(index).and_then(Job::last_pid) else {
        env.jobs.remove(index);
        return;
    };

    log::debug!("background job [{}] started", index + 1);
    let notice = format!("[{}] {pid}\n", index + 1);
    _ = env.write_all(Fd::STDERR, notice.as_bytes());
}

#[cfg(test)]
mod tests {
    use crate::Command;
    use crate::tests::env_with_builtins;
    use quash_env::io::Fd;
    use quash_env::semantics::ExitStatus;
    use std::ops::ControlFlow::Continue;

    #[test]
    fn failure_to_start_background_job_is_success() {
        let (mut env, system) = env_with_builtins();
        env.exit_status = ExitStatus(5);
        let node = quash_syntax::parse_line(
            "sleep 1 &",
            &std::collections::HashMap::<String, String>::new(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(node.execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        let stderr = system.state.borrow().output(Fd::STDERR);
        assert!(stderr.starts_with("quash: cannot start a child process: "), "{stderr}");
        assert!(env.jobs.is_empty());
    }

    #[test]
    fn statements_after_background_still_run() {
        let (mut env, system) = env_with_builtins();
        let node = quash_syntax::parse_line(
            "sleep 1 & echo next",
            &std::collections::HashMap::<String, String>::new(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(node.execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        let state = system.state.borrow();
        assert_eq!(state.output(Fd::STDOUT), "next\n");
        // The dummy system cannot fork.
        assert!(
            state
                .output(Fd::STDERR)
                .starts_with("quash: cannot start a child process: ")
        );
        drop(state);
        assert!(env.jobs.is_empty());
    }
}
