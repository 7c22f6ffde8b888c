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

//! This crate defines the shell execution environment.
//!
//! The environment, [`Env`], is the single context object the shell passes to
//! everything that executes commands. It owns the [`JobList`], the table of
//! built-ins, the exit status of the last command and the [`System`] through
//! which every interaction with the operating system goes.
//!
//! Child processes are reaped synchronously. The shell catches `SIGCHLD`
//! only to wake up from [`System::sigsuspend`]; the actual `waitpid` calls
//! happen in [`Env::reap`], which the shell calls before showing a prompt
//! and while waiting for a foreground job. The only state touched by the
//! signal handler is a small array of flags inside
//! [`RealSystem`](system::real::RealSystem).

pub mod builtin;
pub mod io;
pub mod job;
pub mod semantics;
pub mod signal;
pub mod subshell;
pub mod system;

use self::builtin::Builtin;
use self::io::Fd;
use self::io::MIN_INTERNAL_FD;
use self::job::JobList;
use self::job::ProcessState;
use self::job::fmt::Report;
use self::semantics::Divert;
use self::semantics::ExitStatus;
use self::system::SignalHandling;
use self::system::System;
use nix::errno::Errno;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use quash_syntax::lex::Variables;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::ControlFlow::{Break, Continue};

/// Whole shell execution environment
#[derive(Debug)]
pub struct Env {
    /// Built-in utilities available in the shell
    pub builtins: HashMap<&'static str, Builtin>,

    /// Exit status of the last executed command
    pub exit_status: ExitStatus,

    /// Jobs started by the shell
    pub jobs: JobList,

    /// Whether the shell is interactive
    pub interactive: bool,

    /// File descriptor of the controlling terminal
    ///
    /// This is `Some` only while the shell controls jobs.
    pub tty: Option<Fd>,

    /// Process group of the shell
    pub shell_pgid: Pid,

    /// Interface to the system-managed parts of the environment
    pub system: Box<dyn System>,
}

impl Env {
    /// Creates a non-interactive environment with the given system.
    #[must_use]
    pub fn with_system(system: Box<dyn System>) -> Env {
        let shell_pgid = system.getpgrp();
        Env {
            builtins: HashMap::new(),
            exit_status: ExitStatus::SUCCESS,
            jobs: JobList::new(),
            interactive: false,
            tty: None,
            shell_pgid,
            system,
        }
    }

    /// Whether jobs are put in their own process groups
    #[must_use]
    pub fn controls_jobs(&self) -> bool {
        self.tty.is_some()
    }

    /// Writes the whole buffer to the file descriptor.
    pub fn write_all(&mut self, fd: Fd, mut buffer: &[u8]) -> nix::Result<()> {
        while !buffer.is_empty() {
            match self.system.write(fd, buffer)? {
                0 => return Err(Errno::EIO),
                count => buffer = &buffer[count..],
            }
        }
        Ok(())
    }

    /// Prints text to the standard output.
    ///
    /// Returns the errno if the write fails.
    pub fn print<S: AsRef<str>>(&mut self, text: S) -> nix::Result<()> {
        self.write_all(Fd::STDOUT, text.as_ref().as_bytes())
    }

    /// Prints a message to the standard error.
    ///
    /// The message is prefixed with `quash: ` and followed by a newline.
    pub fn print_error<M: Display>(&mut self, message: M) {
        let line = format!("quash: {message}\n");
        // There is nowhere else to report failure to write the error.
        _ = self.write_all(Fd::STDERR, line.as_bytes());
    }

    /// Updates the exit status from the result of a command.
    pub fn apply_result(&mut self, result: semantics::Result) {
        match result {
            Continue(()) => (),
            Break(divert) => {
                if let Some(exit_status) = divert.exit_status() {
                    self.exit_status = exit_status;
                }
            }
        }
    }

    /// Returns the result that makes the shell exit with the status.
    #[must_use]
    pub fn exit(exit_status: Option<ExitStatus>) -> semantics::Result {
        Break(Divert::Exit(exit_status))
    }

    /// Sets up signal handling for the shell process.
    ///
    /// `SIGCHLD` is caught. If the shell is interactive, the signals the
    /// keyboard generates are ignored.
    pub fn init_signals(&mut self) -> nix::Result<()> {
        self.system.sigaction(Signal::SIGCHLD, SignalHandling::Catch)?;
        if self.interactive {
            for signal in signal::INTERACTIVE_IGNORED {
                self.system.sigaction(signal, SignalHandling::Ignore)?;
            }
        }
        Ok(())
    }

    /// Starts controlling jobs on the terminal connected to the standard
    /// input.
    ///
    /// The shell moves to its own process group and makes it the foreground
    /// process group of the terminal. This should be called after
    /// [`init_signals`](Self::init_signals) so that `SIGTTOU` is ignored.
    /// On failure, the shell keeps running without job control.
    pub fn init_job_control(&mut self) -> nix::Result<()> {
        if !self.system.isatty(Fd::STDIN) {
            return Err(Errno::ENOTTY);
        }
        let tty = self.system.dup(Fd::STDIN, MIN_INTERNAL_FD, true)?;

        let pid = self.system.getpid();
        if self.system.getpgrp() != pid {
            if let Err(errno) = self.system.setpgid(pid, pid) {
                _ = self.system.close(tty);
                return Err(errno);
            }
        }
        self.shell_pgid = pid;

        if let Err(errno) = self.system.tcsetpgrp(tty, pid) {
            _ = self.system.close(tty);
            return Err(errno);
        }
        self.tty = Some(tty);
        log::debug!("job control enabled on fd {tty}");
        Ok(())
    }

    /// Makes the process group the foreground of the terminal.
    ///
    /// Does nothing if the shell does not control jobs.
    pub fn give_terminal(&mut self, pgid: Pid) {
        if let Some(tty) = self.tty {
            if let Err(errno) = self.system.tcsetpgrp(tty, pgid) {
                log::warn!("tcsetpgrp({tty}, {pgid}): {errno}");
            }
        }
    }

    /// Makes the shell the foreground of the terminal again.
    pub fn take_terminal(&mut self) {
        let pgid = self.shell_pgid;
        self.give_terminal(pgid);
    }

    /// Prepares the environment of a newly forked child process.
    ///
    /// Ignored signals are reset to the default, the signal mask is cleared,
    /// and the child forgets the terminal and the jobs of the parent.
    ///
    /// `SIGCHLD` stays caught because the child may run a list that waits
    /// for its own children. `execve` resets the caught disposition to the
    /// default for the utility that replaces the child.
    pub fn enter_child(&mut self) {
        for signal in signal::INTERACTIVE_IGNORED {
            if let Err(errno) = self.system.sigaction(signal, SignalHandling::Default) {
                log::warn!("cannot reset {signal}: {errno}");
            }
        }
        if let Err(errno) = self.system.sigaction(Signal::SIGCHLD, SignalHandling::Catch) {
            log::warn!("cannot catch SIGCHLD: {errno}");
        }
        if let Err(errno) = self
            .system
            .sigmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None)
        {
            log::warn!("cannot clear the signal mask: {errno}");
        }

        if let Some(tty) = self.tty.take() {
            _ = self.system.close(tty);
        }
        self.interactive = false;
        self.jobs = JobList::new();
    }

    /// Collects the state changes of all child processes that are
    /// available without blocking.
    ///
    /// The new states are recorded in the job list. Caught `SIGCHLD`s are
    /// discarded since this function does what they ask for.
    pub fn reap(&mut self) {
        _ = self.system.caught_signals();
        loop {
            match self.system.wait(None) {
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
                Ok(status) => {
                    log::debug!("reaped {status:?}");
                    if let Some((pid, state)) = ProcessState::from_wait_status(status) {
                        if self.jobs.update_status(pid, state).is_none() {
                            log::debug!("process {pid} does not belong to any job");
                        }
                    }
                }
                Err(errno) => {
                    log::warn!("waitpid: {errno}");
                    break;
                }
            }
        }
    }

    /// Waits until the job is no longer running.
    ///
    /// Returns the state of the job when it has finished or stopped.
    /// `SIGCHLD` is blocked while checking the job so that a signal arriving
    /// between the check and [`System::sigsuspend`] is not lost.
    pub fn wait_for_job(&mut self, index: usize) -> nix::Result<ProcessState> {
        let mut sigchld = SigSet::empty();
        sigchld.add(Signal::SIGCHLD);
        let mut old_mask = SigSet::empty();
        self.system
            .sigmask(SigmaskHow::SIG_BLOCK, Some(&sigchld), Some(&mut old_mask))?;

        let result = loop {
            self.reap();
            match self.jobs.get(index) {
                None => break Err(Errno::ECHILD),
                Some(job) if job.state() != ProcessState::Running => break Ok(job.state()),
                Some(_) => (),
            }
            if let Err(errno) = self.system.sigsuspend(&old_mask) {
                break Err(errno);
            }
        };

        self.system
            .sigmask(SigmaskHow::SIG_SETMASK, Some(&old_mask), None)?;
        result
    }

    /// Waits for a foreground job and returns its exit status.
    ///
    /// The terminal is given back to the shell afterwards. A finished job is
    /// removed from the job list, with a status line printed if it was
    /// killed by a signal. A stopped job is kept as the current job and its
    /// status line is printed.
    pub fn wait_for_foreground_job(&mut self, index: usize) -> ExitStatus {
        let result = self.wait_for_job(index);
        self.take_terminal();

        let state = match result {
            Ok(state) => state,
            Err(errno) => {
                self.print_error(format_args!("cannot wait for job [{}]: {errno}", index + 1));
                self.jobs.remove(index);
                return ExitStatus::ERROR;
            }
        };

        match state {
            ProcessState::Stopped(_) => {
                self.jobs.set_current_job(index);
                self.print_report(index);
            }
            ProcessState::Signaled { .. } => {
                self.print_report(index);
                self.jobs.remove(index);
            }
            ProcessState::Exited(_) | ProcessState::Running => {
                self.jobs.remove(index);
            }
        }
        state.exit_status().unwrap_or(ExitStatus::SUCCESS)
    }

    /// Prints the status line of the job to the standard error and clears
    /// its `state_changed` flag.
    fn print_report(&mut self, index: usize) {
        let Some(report) = Report::new(&self.jobs, index) else {
            return;
        };
        let line = format!("{report}\n");
        _ = self.write_all(Fd::STDERR, line.as_bytes());
        if let Some(job) = self.jobs.get_mut(index) {
            job.state_changed = false;
        }
    }

    /// Reports jobs whose state has changed and removes finished jobs.
    ///
    /// The status lines are printed to the standard error.
    pub fn report_jobs(&mut self) {
        let changed = self
            .jobs
            .iter()
            .filter(|(_, job)| job.state_changed || job.is_finished())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for index in changed {
            self.print_report(index);
            if self.jobs.get(index).is_some_and(|job| job.is_finished()) {
                self.jobs.remove(index);
            }
        }
    }
}

/// Variables visible to the lexer
///
/// `$?` is the exit status of the last command. Other variables are those of
/// the process environment.
impl Variables for Env {
    fn get(&self, name: &str) -> Option<String> {
        match name {
            "?" => Some(self.exit_status.to_string()),
            _ => self.system.getenv(name),
        }
    }
}
