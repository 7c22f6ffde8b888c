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

//! Utility for starting child processes
//!
//! A [`Subshell`] forks the shell and runs a task in the child process. When
//! the shell controls jobs, the child is put in a process group, and a
//! foreground child is given the terminal, before the task starts. The
//! process group is set in both the parent and the child so that it is in
//! effect whichever process runs first.
//!
//! In the child, signals ignored by the shell are reset to the default and
//! the environment forgets the terminal and the parent's jobs. `SIGCHLD`
//! stays caught so that the child can wait for its own children.
//! The child exits with the exit status of the task and never returns to the
//! caller.

use crate::Env;
use crate::semantics;
use crate::system::ForkResult;
use nix::unistd::Pid;

/// Job control setting for a child process
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum JobControl {
    /// The child gets the terminal.
    Foreground,
    /// The child runs in the background.
    Background,
}

/// Builder for a child process
#[must_use = "a subshell is not started unless you call `start`"]
pub struct Subshell<F> {
    task: F,
    job_control: Option<JobControl>,
    process_group: Option<Pid>,
}

impl<F> std::fmt::Debug for Subshell<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subshell")
            .field("job_control", &self.job_control)
            .field("process_group", &self.process_group)
            .finish_non_exhaustive()
    }
}

impl<F> Subshell<F>
where
    F: FnOnce(&mut Env) -> semantics::Result,
{
    /// Creates a subshell that runs the task.
    ///
    /// The child does not take part in job control unless
    /// [`job_control`](Self::job_control) is called.
    pub fn new(task: F) -> Self {
        Subshell {
            task,
            job_control: None,
            process_group: None,
        }
    }

    /// Sets the job control setting.
    ///
    /// The setting is ignored if the shell does not control jobs.
    pub fn job_control<J: Into<Option<JobControl>>>(mut self, job_control: J) -> Self {
        self.job_control = job_control.into();
        self
    }

    /// Makes the child join an existing process group.
    ///
    /// With `None`, the child becomes the leader of a new process group.
    pub fn process_group(mut self, pgid: Option<Pid>) -> Self {
        self.process_group = pgid;
        self
    }

    /// Starts the child process.
    ///
    /// Returns the process ID of the child in the parent.
    pub fn start(self, env: &mut Env) -> nix::Result<Pid> {
        let job_control = self.job_control.filter(|_| env.controls_jobs());

        match env.system.fork()? {
            ForkResult::Parent { child } => {
                if let Some(job_control) = job_control {
                    let pgid = self.process_group.unwrap_or(child);
                    // The child may have already called exec, in which case
                    // it has set its own process group.
                    if let Err(errno) = env.system.setpgid(child, pgid) {
                        log::debug!("setpgid({child}, {pgid}) in parent: {errno}");
                    }
                    if job_control == JobControl::Foreground {
                        env.give_terminal(pgid);
                    }
                }
                log::debug!("started child process {child}");
                Ok(child)
            }

            ForkResult::Child => {
                if let Some(job_control) = job_control {
                    let pgid = self.process_group.unwrap_or(Pid::from_raw(0));
                    if let Err(errno) = env.system.setpgid(Pid::from_raw(0), pgid) {
                        log::warn!("cannot set the process group: {errno}");
                    }
                    if job_control == JobControl::Foreground {
                        let pgid = env.system.getpgrp();
                        env.give_terminal(pgid);
                    }
                }
                env.enter_child();

                let result = (self.task)(env);
                env.apply_result(result);
                std::process::exit(env.exit_status.0)
            }
        }
    }
}
