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

//! Execution of pipelines and other jobs
//!
//! Each stage of a pipeline runs in its own child process. The stages are
//! connected with pipes, and all of them belong to one job. When the shell
//! controls jobs, the first stage becomes the leader of a new process group
//! that the other stages join.
//!
//! The shell closes its copy of the write end of each pipe as soon as the
//! next stage has been started, so a later stage sees the end of input when
//! the earlier stage exits.

use super::execute_in_child;
use nix::errno::Errno;
use quash_env::Env;
use quash_env::io::Fd;
use quash_env::job::Job;
use quash_env::job::Pid;
use quash_env::job::Process;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_env::subshell::JobControl;
use quash_env::subshell::Subshell;
use quash_syntax::syntax::Node;
use std::ops::ControlFlow::Continue;

/// Executes a pipeline in the foreground.
pub fn execute(env: &mut Env, pipeline: &Node) -> Result {
    run_in_foreground(env, &pipeline.pipeline_stages(), pipeline.to_string())
}

/// Starts the stages as a new job and waits for it.
///
/// The exit status is that of the last stage, or the number of the signal
/// that terminated or stopped the job.
pub fn run_in_foreground(env: &mut Env, stages: &[&Node], name: String) -> Result {
    let Some(index) = add_job(env, Job::new(name)) else {
        return Continue(());
    };

    let started = start_job(env, index, stages, JobControl::Foreground);
    if env.jobs.get(index).is_none_or(|job| job.processes.is_empty()) {
        env.jobs.remove(index);
        env.exit_status = ExitStatus::NOEXEC;
        return Continue(());
    }

    env.exit_status = env.wait_for_foreground_job(index);
    if !started {
        env.exit_status = ExitStatus::NOEXEC;
    }
    Continue(())
}

/// Adds the job to the job list, reporting failure.
pub(super) fn add_job(env: &mut Env, job: Job) -> Option<usize> {
    match env.jobs.add(job) {
        Ok(index) => Some(index),
        Err(error) => {
            env.print_error(error);
            env.exit_status = ExitStatus::FAILURE;
            None
        }
    }
}

/// Starts a child process for each stage and adds them to the job.
///
/// Returns false if a pipe or process could not be created. In that case,
/// the stages already started are left running and no more stages are
/// started.
pub(super) fn start_job(
    env: &mut Env,
    index: usize,
    stages: &[&Node],
    job_control: JobControl,
) -> bool {
    let mut pipes = PipeSet::new();
    let mut pgid = None;
    let mut success = true;

    for (i, &stage) in stages.iter().enumerate() {
        let has_next = i + 1 < stages.len();
        if let Err(errno) = pipes.shift(env, has_next) {
            env.print_error(format_args!("cannot connect pipes in the pipeline: {errno}"));
            success = false;
            break;
        }

        let stage_pipes = pipes;
        let subshell = Subshell::new(move |env: &mut Env| {
            if let Err(errno) = stage_pipes.move_to_stdin_stdout(env) {
                env.print_error(format_args!("cannot connect pipes in the pipeline: {errno}"));
                return Env::exit(Some(ExitStatus::NOEXEC));
            }
            execute_in_child(env, stage)
        })
        .job_control(job_control)
        .process_group(pgid);

        match subshell.start(env) {
            Ok(pid) => {
                let pgid = *pgid.get_or_insert(pid);
                env.jobs.add_process(index, Process::new(pid, stage.to_string()));
                if env.controls_jobs() {
                    set_pgid(env, index, pgid);
                }
            }
            Err(errno) => {
                env.print_error(format_args!("cannot start a child process: {errno}"));
                success = false;
                break;
            }
        }
    }

    pipes.close(env);
    success
}

fn set_pgid(env: &mut Env, index: usize, pgid: Pid) {
    if let Some(job) = env.jobs.get_mut(index) {
        job.pgid = Some(pgid);
    }
}

/// Pipe file descriptors held by the shell while starting a pipeline
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct PipeSet {
    /// Reading end of the pipe from the previous stage
    read_previous: Option<Fd>,
    /// Reading and writing ends of the pipe to the next stage
    next: Option<(Fd, Fd)>,
}

impl PipeSet {
    fn new() -> Self {
        Self::default()
    }

    /// Moves to the next stage.
    ///
    /// The reading end from the previous stage and the writing end to the
    /// stage just started are closed. If `has_next` is true, a new pipe to
    /// the next stage is opened.
    fn shift(&mut self, env: &mut Env, has_next: bool) -> std::result::Result<(), Errno> {
        if let Some(fd) = self.read_previous.take() {
            _ = env.system.close(fd);
        }
        if let Some((reader, writer)) = self.next.take() {
            _ = env.system.close(writer);
            self.read_previous = Some(reader);
        }
        if has_next {
            self.next = Some(env.system.pipe()?);
        }
        Ok(())
    }

    /// Closes all the pipe ends held.
    fn close(&mut self, env: &mut Env) {
        let fds = self.read_previous.take().into_iter();
        let fds = fds.chain(self.next.take().into_iter().flat_map(|(r, w)| [r, w]));
        for fd in fds {
            _ = env.system.close(fd);
        }
    }

    /// Connects the pipes to the standard input and output of a stage.
    ///
    /// This is called in the child process of the stage.
    fn move_to_stdin_stdout(self, env: &mut Env) -> std::result::Result<(), Errno> {
        if let Some((reader, writer)) = self.next {
            debug_assert_ne!(reader, Fd::STDIN);
            env.system.close(reader)?;
            if writer != Fd::STDOUT {
                env.system.dup2(writer, Fd::STDOUT)?;
                env.system.close(writer)?;
            }
        }
        if let Some(reader) = self.read_previous {
            if reader != Fd::STDIN {
                env.system.dup2(reader, Fd::STDIN)?;
                env.system.close(reader)?;
            }
        }
        Ok(())
    }
}
