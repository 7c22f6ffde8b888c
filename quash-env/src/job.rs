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

//! Type definitions for job management.
//!
//! A [`Job`] is the set of processes started from one pipeline. Jobs are
//! kept in a [`JobList`], which allocates job numbers and maintains a
//! [`JobTable`] so that the job owning a process can be found from the
//! process ID reported by `waitpid`.
//!
//! The job number of a job is its index in the list plus one. A freed index
//! is reused by the next job added.

pub mod fmt;
pub mod id;
pub mod table;

use crate::semantics::ExitStatus;
use bitflags::bitflags;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
pub use nix::unistd::Pid;
use slab::Slab;
pub use table::JobTable;
pub use table::TABLE_BUCKETS;
use thiserror::Error;

/// State of a process
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProcessState {
    /// The process is running.
    Running,
    /// The process has been stopped by a signal.
    Stopped(Signal),
    /// The process has exited.
    Exited(ExitStatus),
    /// The process has been terminated by a signal.
    Signaled { signal: Signal, core_dump: bool },
}

impl ProcessState {
    /// Converts a wait status into a process ID and its new state.
    ///
    /// Returns `None` for statuses that do not describe a state change of a
    /// child process (`StillAlive` and ptrace events).
    #[must_use]
    pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, ProcessState)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, ProcessState::Exited(ExitStatus(code)))),
            WaitStatus::Signaled(pid, signal, core_dump) => {
                Some((pid, ProcessState::Signaled { signal, core_dump }))
            }
            WaitStatus::Stopped(pid, signal) => Some((pid, ProcessState::Stopped(signal))),
            WaitStatus::Continued(pid) => Some((pid, ProcessState::Running)),
            _ => None,
        }
    }

    /// Whether the process has not yet terminated
    #[must_use]
    pub fn is_alive(self) -> bool {
        matches!(self, ProcessState::Running | ProcessState::Stopped(_))
    }

    /// Whether the process is stopped
    #[must_use]
    pub fn is_stopped(self) -> bool {
        matches!(self, ProcessState::Stopped(_))
    }

    /// Returns the exit status the shell reports for a process in this
    /// state.
    ///
    /// A process terminated or stopped by a signal yields the signal number.
    /// A running process has no exit status.
    #[must_use]
    pub fn exit_status(self) -> Option<ExitStatus> {
        match self {
            ProcessState::Running => None,
            ProcessState::Exited(exit_status) => Some(exit_status),
            ProcessState::Stopped(signal) | ProcessState::Signaled { signal, .. } => {
                Some(signal.into())
            }
        }
    }
}

/// Process that belongs to a job
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Process {
    pub pid: Pid,
    /// Command line of the pipeline stage run by the process
    pub command_text: String,
    pub state: ProcessState,
}

impl Process {
    /// Creates a running process.
    #[must_use]
    pub fn new<S: Into<String>>(pid: Pid, command_text: S) -> Self {
        Process {
            pid,
            command_text: command_text.into(),
            state: ProcessState::Running,
        }
    }
}

bitflags! {
    /// Summary of the state of a job
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct JobFlags: u8 {
        /// Some process is running.
        const RUNNING = 1 << 0;
        /// No process is running and some process is stopped.
        const SUSPENDED = 1 << 1;
        /// The shell does not wait for the job.
        const ASYNC = 1 << 2;
        /// Every process has terminated.
        const FINISHED = 1 << 3;
    }
}

/// Set of processes executing a pipeline
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process group of the job
    ///
    /// This is `None` if the job is not in its own process group.
    pub pgid: Option<Pid>,
    /// Processes in the order of pipeline stages
    pub processes: Vec<Process>,
    pub flags: JobFlags,
    /// String representation of the pipeline
    pub name: String,
    /// Whether the state has changed since last reported to the user
    pub state_changed: bool,
}

impl Job {
    /// Creates a job with no processes.
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Job {
            pgid: None,
            processes: Vec::new(),
            flags: JobFlags::RUNNING,
            name: name.into(),
            state_changed: false,
        }
    }

    /// Whether the shell does not wait for the job
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.flags.contains(JobFlags::ASYNC)
    }

    /// Whether every process has terminated
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.flags.contains(JobFlags::FINISHED)
    }

    /// Whether the job is stopped
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.flags.contains(JobFlags::SUSPENDED)
    }

    /// Returns the state of the job as a whole.
    ///
    /// The job is running if any process is running, and stopped if no process
    /// is running but some is stopped. Otherwise, the job has terminated and
    /// its state is that of the last process.
    #[must_use]
    pub fn state(&self) -> ProcessState {
        let states = || self.processes.iter().map(|process| process.state);
        if states().any(|state| state == ProcessState::Running) {
            return ProcessState::Running;
        }
        if let Some(stopped) = states().find(|state| state.is_stopped()) {
            return stopped;
        }
        states().last().unwrap_or(ProcessState::Running)
    }

    /// Recomputes the state flags from the process states.
    pub fn refresh_flags(&mut self) {
        let mut flags = self.flags & JobFlags::ASYNC;
        flags |= match self.state() {
            ProcessState::Running => JobFlags::RUNNING,
            ProcessState::Stopped(_) => JobFlags::SUSPENDED,
            ProcessState::Exited(_) | ProcessState::Signaled { .. } => JobFlags::FINISHED,
        };
        self.flags = flags;
    }

    /// Returns the process IDs of the job.
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.processes.iter().map(|process| process.pid)
    }

    /// Returns the process ID of the last pipeline stage.
    #[must_use]
    pub fn last_pid(&self) -> Option<Pid> {
        self.processes.last().map(|process| process.pid)
    }
}

/// Maximum number of jobs in a [`JobList`]
pub const JOBS_MAX: usize = 64;

/// Error returned when a [`JobList`] has no room for another job
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[error("too many jobs (up to {JOBS_MAX} jobs can exist at a time)")]
pub struct JobListFull;

/// Collection of jobs
#[derive(Clone, Debug, Default)]
pub struct JobList {
    jobs: Slab<Job>,
    table: JobTable,
    current_job: Option<usize>,
    previous_job: Option<usize>,
}

impl JobList {
    /// Creates an empty job list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Tests whether the list contains no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Adds a job and returns its index.
    ///
    /// The processes already in the job are registered in the job table.
    /// An asynchronous job becomes the current job.
    pub fn add(&mut self, job: Job) -> Result<usize, JobListFull> {
        if self.jobs.len() >= JOBS_MAX {
            return Err(JobListFull);
        }
        let is_async = job.is_async();
        let index = self.jobs.insert(job);
        for pid in self.jobs[index].pids().collect::<Vec<_>>() {
            self.table.insert(pid, index);
        }
        if is_async {
            self.set_current_job(index);
        }
        log::debug!("job [{}] added", index + 1);
        Ok(index)
    }

    /// Adds a process to an existing job.
    ///
    /// Returns false if there is no job at the index.
    pub fn add_process(&mut self, index: usize, process: Process) -> bool {
        let Some(job) = self.jobs.get_mut(index) else {
            return false;
        };
        self.table.insert(process.pid, index);
        job.processes.push(process);
        job.refresh_flags();
        true
    }

    /// Removes a job and unregisters its processes from the job table.
    pub fn remove(&mut self, index: usize) -> Option<Job> {
        let job = self.jobs.try_remove(index)?;
        for pid in job.pids() {
            self.table.remove(pid);
        }

        if self.previous_job == Some(index) {
            self.previous_job = None;
        }
        if self.current_job == Some(index) {
            self.current_job = self.previous_job.take();
        }
        if self.current_job.is_none() {
            self.current_job = self.most_recent_job_except(None);
        }
        if self.previous_job.is_none() {
            self.previous_job = self.most_recent_job_except(self.current_job);
        }

        log::debug!("job [{}] removed", index + 1);
        Some(job)
    }

    fn most_recent_job_except(&self, excluded: Option<usize>) -> Option<usize> {
        self.jobs
            .iter()
            .map(|(index, _)| index)
            .filter(|&index| Some(index) != excluded)
            .max()
    }

    /// Returns the job at the index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    /// Returns the job at the index.
    ///
    /// Do not add or remove processes through the returned reference; use
    /// [`add_process`](Self::add_process) so that the job table stays
    /// consistent.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Job> {
        self.jobs.get_mut(index)
    }

    /// Returns the index of the job containing the process.
    #[must_use]
    pub fn find_by_pid(&self, pid: Pid) -> Option<usize> {
        self.table.get(pid)
    }

    /// Returns the job table.
    #[must_use]
    pub fn table(&self) -> &JobTable {
        &self.table
    }

    /// Iterates over the jobs with their indices in ascending order of the
    /// index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> + '_ {
        self.jobs.iter()
    }

    /// Updates the state of a process.
    ///
    /// Returns the index of the job containing the process, or `None` if the
    /// process does not belong to any job. A job that becomes stopped is made
    /// the current job.
    pub fn update_status(&mut self, pid: Pid, state: ProcessState) -> Option<usize> {
        let index = self.table.get(pid)?;
        let job = self.jobs.get_mut(index)?;
        let process = job.processes.iter_mut().find(|process| process.pid == pid)?;
        if process.state != state {
            process.state = state;
            job.state_changed = true;
        }
        let was_suspended = job.is_suspended();
        job.refresh_flags();
        if job.is_suspended() && !was_suspended {
            self.set_current_job(index);
        }
        Some(index)
    }

    /// Marks the stopped processes of a job as running.
    ///
    /// This should be called when the job is sent `SIGCONT`.
    pub fn resume(&mut self, index: usize) {
        if let Some(job) = self.jobs.get_mut(index) {
            for process in &mut job.processes {
                if process.state.is_stopped() {
                    process.state = ProcessState::Running;
                }
            }
            job.refresh_flags();
        }
    }

    /// Returns the index of the current job.
    #[must_use]
    pub fn current_job(&self) -> Option<usize> {
        self.current_job
    }

    /// Returns the index of the previous job.
    #[must_use]
    pub fn previous_job(&self) -> Option<usize> {
        self.previous_job
    }

    /// Makes the job at the index the current job.
    ///
    /// The former current job becomes the previous job. Does nothing if there
    /// is no job at the index.
    pub fn set_current_job(&mut self, index: usize) {
        if !self.jobs.contains(index) || self.current_job == Some(index) {
            return;
        }
        self.previous_job = self.current_job.replace(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    fn job_with(name: &str, pids: &[i32]) -> Job {
        let mut job = Job::new(name);
        job.processes = pids.iter().map(|&raw| Process::new(pid(raw), name)).collect();
        job
    }

    #[test]
    fn process_state_from_wait_status() {
        assert_eq!(
            ProcessState::from_wait_status(WaitStatus::Exited(pid(5), 3)),
            Some((pid(5), ProcessState::Exited(ExitStatus(3))))
        );
        assert_eq!(
            ProcessState::from_wait_status(WaitStatus::Stopped(pid(5), Signal::SIGTSTP)),
            Some((pid(5), ProcessState::Stopped(Signal::SIGTSTP)))
        );
        assert_eq!(
            ProcessState::from_wait_status(WaitStatus::Continued(pid(5))),
            Some((pid(5), ProcessState::Running))
        );
        assert_eq!(ProcessState::from_wait_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn exit_status_of_states() {
        assert_eq!(ProcessState::Running.exit_status(), None);
        assert_eq!(
            ProcessState::Exited(ExitStatus(4)).exit_status(),
            Some(ExitStatus(4))
        );
        let killed = ProcessState::Signaled {
            signal: Signal::SIGKILL,
            core_dump: false,
        };
        assert_eq!(killed.exit_status(), Some(ExitStatus(9)));
        assert_eq!(
            ProcessState::Stopped(Signal::SIGTSTP).exit_status(),
            Some(ExitStatus(Signal::SIGTSTP as i32))
        );
    }

    #[test]
    fn job_state_aggregation() {
        let mut job = job_with("a | b", &[10, 11]);
        assert_eq!(job.state(), ProcessState::Running);

        job.processes[0].state = ProcessState::Exited(ExitStatus(1));
        assert_eq!(job.state(), ProcessState::Running);

        job.processes[1].state = ProcessState::Stopped(Signal::SIGTSTP);
        assert_eq!(job.state(), ProcessState::Stopped(Signal::SIGTSTP));
        job.refresh_flags();
        assert_eq!(job.flags, JobFlags::SUSPENDED);

        job.processes[1].state = ProcessState::Exited(ExitStatus(0));
        assert_eq!(job.state(), ProcessState::Exited(ExitStatus(0)));
        job.flags |= JobFlags::ASYNC;
        job.refresh_flags();
        assert_eq!(job.flags, JobFlags::FINISHED | JobFlags::ASYNC);
    }

    #[test]
    fn job_numbers_are_limited_and_reused() {
        let mut list = JobList::new();
        for i in 0..JOBS_MAX {
            let index = list.add(job_with("sleep", &[100 + i as i32])).unwrap();
            assert_eq!(index, i);
        }
        assert_eq!(list.add(Job::new("one too many")), Err(JobListFull));

        let freed = list.remove(17).unwrap();
        assert_eq!(freed.processes[0].pid, pid(117));
        assert_eq!(list.find_by_pid(pid(117)), None);
        assert_eq!(list.add(job_with("again", &[999])), Ok(17));
        assert_eq!(list.find_by_pid(pid(999)), Some(17));
        assert_eq!(list.add(Job::new("full again")), Err(JobListFull));
    }

    #[test]
    fn most_recently_freed_number_is_reused_first() {
        let mut list = JobList::new();
        for i in 0..4 {
            list.add(job_with("sleep", &[100 + i])).unwrap();
        }
        list.remove(0);
        list.remove(2);
        assert_eq!(list.add(Job::new("a")), Ok(2));
        assert_eq!(list.add(Job::new("b")), Ok(0));
        assert_eq!(list.add(Job::new("c")), Ok(4));
    }

    #[test]
    fn add_process_registers_pid() {
        let mut list = JobList::new();
        let index = list.add(Job::new("a | b")).unwrap();
        assert!(list.add_process(index, Process::new(pid(20), "a")));
        assert!(list.add_process(index, Process::new(pid(21), "b")));
        assert!(!list.add_process(index + 1, Process::new(pid(22), "c")));
        assert_eq!(list.find_by_pid(pid(21)), Some(index));
        assert_eq!(list.table().len(), 2);

        list.remove(index);
        assert!(list.table().is_empty());
    }

    #[test]
    fn update_status_marks_changes() {
        let mut list = JobList::new();
        let index = list.add(job_with("a | b", &[30, 31])).unwrap();

        assert_eq!(
            list.update_status(pid(30), ProcessState::Exited(ExitStatus(0))),
            Some(index)
        );
        let job = list.get(index).unwrap();
        assert!(job.state_changed);
        assert!(!job.is_finished());

        list.update_status(pid(31), ProcessState::Exited(ExitStatus(2)));
        let job = list.get(index).unwrap();
        assert!(job.is_finished());
        assert_eq!(job.state(), ProcessState::Exited(ExitStatus(2)));

        assert_eq!(list.update_status(pid(99), ProcessState::Running), None);
    }

    #[test]
    fn stopped_job_becomes_current_and_resumes() {
        let mut list = JobList::new();
        let mut background = job_with("sleep 100", &[40]);
        background.flags |= JobFlags::ASYNC;
        let first = list.add(background).unwrap();
        let second = list.add(job_with("vi", &[41])).unwrap();
        assert_eq!(list.current_job(), Some(first));

        list.update_status(pid(41), ProcessState::Stopped(Signal::SIGTSTP));
        assert_eq!(list.current_job(), Some(second));
        assert_eq!(list.previous_job(), Some(first));
        assert!(list.get(second).unwrap().is_suspended());

        list.resume(second);
        let job = list.get(second).unwrap();
        assert_matches!(job.state(), ProcessState::Running);
        assert!(job.flags.contains(JobFlags::RUNNING));
    }

    #[test]
    fn removing_current_job_promotes_previous() {
        let mut list = JobList::new();
        let a = list.add(job_with("a", &[50])).unwrap();
        let b = list.add(job_with("b", &[51])).unwrap();
        let c = list.add(job_with("c", &[52])).unwrap();
        list.set_current_job(a);
        list.set_current_job(c);
        assert_eq!(list.previous_job(), Some(a));

        list.remove(c);
        assert_eq!(list.current_job(), Some(a));
        assert_eq!(list.previous_job(), Some(b));

        list.remove(a);
        assert_eq!(list.current_job(), Some(b));
        assert_eq!(list.previous_job(), None);
    }
}
