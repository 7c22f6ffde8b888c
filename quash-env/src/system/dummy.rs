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

//! Scripted `System` for tests
//!
//! [`DummySystem`] does not touch the operating system. Output written to a
//! file descriptor is appended to an in-memory buffer (one per open file, or
//! one per file descriptor that is not a file), wait statuses are
//! taken from a queue prepared by the test, and signals sent are recorded.
//! The state is shared through an `Rc` so that the test can inspect it after
//! the system has been moved into an [`Env`](crate::Env).
//!
//! Creating processes is not supported: [`fork`](System::fork) and
//! [`execvp`](System::execvp) fail with `ENOSYS`.

use super::ForkResult;
use super::SignalHandling;
use super::System;
use super::is_valid_env;
use crate::io::Fd;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

/// State of a [`DummySystem`]
#[derive(Clone, Debug)]
pub struct DummyState {
    /// Bytes written to each file descriptor not associated with a file
    pub outputs: BTreeMap<Fd, Vec<u8>>,
    /// Contents of the files that exist
    pub files: BTreeMap<PathBuf, Vec<u8>>,
    /// Open file descriptors and the path they were opened with, if any
    pub open_fds: BTreeMap<Fd, Option<PathBuf>>,
    /// Results returned by successive calls to [`System::wait`]
    ///
    /// When the queue is empty, `wait` fails with `ECHILD`.
    pub wait_statuses: VecDeque<WaitStatus>,
    /// Signals sent with [`System::kill`]
    pub signals_sent: Vec<(Pid, Option<Signal>)>,
    /// Current signal handling settings
    pub signal_handling: HashMap<Signal, SignalHandling>,
    /// Foreground process group of the terminal
    pub foreground: Option<Pid>,
    /// Whether file descriptors are terminals
    pub terminals: Vec<Fd>,
    pub cwd: PathBuf,
    /// Environment variables
    pub variables: BTreeMap<String, String>,
    pub pid: Pid,
    pub pgid: Pid,
}

impl Default for DummyState {
    fn default() -> Self {
        let open_fds = [Fd::STDIN, Fd::STDOUT, Fd::STDERR]
            .into_iter()
            .map(|fd| (fd, None))
            .collect();
        DummyState {
            outputs: BTreeMap::new(),
            files: BTreeMap::new(),
            open_fds,
            wait_statuses: VecDeque::new(),
            signals_sent: Vec::new(),
            signal_handling: HashMap::new(),
            foreground: None,
            terminals: Vec::new(),
            cwd: PathBuf::from("/"),
            variables: BTreeMap::new(),
            pid: Pid::from_raw(2),
            pgid: Pid::from_raw(2),
        }
    }
}

impl DummyState {
    /// Returns the text written to the file descriptor.
    #[must_use]
    pub fn output(&self, fd: Fd) -> String {
        self.outputs
            .get(&fd)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    /// Returns the content of the file.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<String> {
        self.files
            .get(Path::new(path))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn lowest_free_fd(&self, min: Fd) -> Fd {
        let mut fd = min;
        while self.open_fds.contains_key(&fd) {
            fd.0 += 1;
        }
        fd
    }
}

/// Implementation of [`System`] that records its use
#[derive(Clone, Debug, Default)]
pub struct DummySystem {
    pub state: Rc<RefCell<DummyState>>,
}

impl DummySystem {
    /// Creates a system with the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for DummySystem {
    fn pipe(&mut self) -> nix::Result<(Fd, Fd)> {
        let mut state = self.state.borrow_mut();
        let reader = state.lowest_free_fd(Fd(3));
        state.open_fds.insert(reader, None);
        let writer = state.lowest_free_fd(Fd(3));
        state.open_fds.insert(writer, None);
        Ok((reader, writer))
    }

    fn dup(&mut self, from: Fd, to_min: Fd, _cloexec: bool) -> nix::Result<Fd> {
        let mut state = self.state.borrow_mut();
        let path = state.open_fds.get(&from).ok_or(Errno::EBADF)?.clone();
        let fd = state.lowest_free_fd(to_min);
        state.open_fds.insert(fd, path);
        if state.terminals.contains(&from) {
            state.terminals.push(fd);
        }
        Ok(fd)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> nix::Result<Fd> {
        let mut state = self.state.borrow_mut();
        let path = state.open_fds.get(&from).ok_or(Errno::EBADF)?.clone();
        state.open_fds.insert(to, path);
        Ok(to)
    }

    fn close(&mut self, fd: Fd) -> nix::Result<()> {
        self.state.borrow_mut().open_fds.remove(&fd);
        Ok(())
    }

    fn open(&mut self, path: &CStr, flags: OFlag, _mode: Mode) -> nix::Result<Fd> {
        let path = PathBuf::from(path.to_str().map_err(|_| Errno::EILSEQ)?);
        let mut state = self.state.borrow_mut();
        if flags.contains(OFlag::O_TRUNC) {
            state.files.insert(path.clone(), Vec::new());
        } else if flags.contains(OFlag::O_CREAT) {
            state.files.entry(path.clone()).or_default();
        } else if !state.files.contains_key(&path) {
            return Err(Errno::ENOENT);
        }
        let fd = state.lowest_free_fd(Fd(0));
        state.open_fds.insert(fd, Some(path));
        Ok(fd)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> nix::Result<usize> {
        let mut state = self.state.borrow_mut();
        let path = state.open_fds.get(&fd).ok_or(Errno::EBADF)?.clone();
        let output = match path {
            Some(path) => state.files.entry(path).or_default(),
            None => state.outputs.entry(fd).or_default(),
        };
        output.extend_from_slice(buffer);
        Ok(buffer.len())
    }

    fn isatty(&self, fd: Fd) -> bool {
        self.state.borrow().terminals.contains(&fd)
    }

    fn fork(&mut self) -> nix::Result<ForkResult> {
        Err(Errno::ENOSYS)
    }

    fn execvp(&mut self, _name: &CStr, _args: &[CString]) -> nix::Result<Infallible> {
        Err(Errno::ENOSYS)
    }

    fn wait(&mut self, _target: Option<Pid>) -> nix::Result<WaitStatus> {
        self.state
            .borrow_mut()
            .wait_statuses
            .pop_front()
            .ok_or(Errno::ECHILD)
    }

    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> nix::Result<()> {
        self.state.borrow_mut().signals_sent.push((target, signal));
        Ok(())
    }

    fn getpid(&self) -> Pid {
        self.state.borrow().pid
    }

    fn getpgrp(&self) -> Pid {
        self.state.borrow().pgid
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> nix::Result<()> {
        let mut state = self.state.borrow_mut();
        if pid.as_raw() == 0 || pid == state.pid {
            state.pgid = if pgid.as_raw() == 0 { state.pid } else { pgid };
        }
        Ok(())
    }

    fn tcgetpgrp(&self, fd: Fd) -> nix::Result<Pid> {
        let state = self.state.borrow();
        if !state.terminals.contains(&fd) {
            return Err(Errno::ENOTTY);
        }
        state.foreground.ok_or(Errno::ENOTTY)
    }

    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> nix::Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.terminals.contains(&fd) {
            return Err(Errno::ENOTTY);
        }
        state.foreground = Some(pgid);
        Ok(())
    }

    fn sigmask(
        &mut self,
        _how: SigmaskHow,
        _set: Option<&SigSet>,
        old_set: Option<&mut SigSet>,
    ) -> nix::Result<()> {
        if let Some(old_set) = old_set {
            *old_set = SigSet::empty();
        }
        Ok(())
    }

    fn sigaction(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> nix::Result<SignalHandling> {
        let mut state = self.state.borrow_mut();
        Ok(state
            .signal_handling
            .insert(signal, handling)
            .unwrap_or_default())
    }

    fn caught_signals(&mut self) -> Vec<Signal> {
        Vec::new()
    }

    /// Returns immediately if a wait status is queued. Otherwise, no child
    /// could ever wake the caller, so `EDEADLK` is returned.
    fn sigsuspend(&mut self, _mask: &SigSet) -> nix::Result<()> {
        if self.state.borrow().wait_statuses.is_empty() {
            Err(Errno::EDEADLK)
        } else {
            Ok(())
        }
    }

    fn getcwd(&self) -> nix::Result<PathBuf> {
        Ok(self.state.borrow().cwd.clone())
    }

    fn chdir(&mut self, path: &Path) -> nix::Result<()> {
        let mut state = self.state.borrow_mut();
        let path = state.cwd.join(path);
        state.cwd = path;
        Ok(())
    }

    fn getenv(&self, name: &str) -> Option<String> {
        self.state.borrow().variables.get(name).cloned()
    }

    fn setenv(&mut self, name: &str, value: &str) -> nix::Result<()> {
        if !is_valid_env(name, value) {
            return Err(Errno::EINVAL);
        }
        let mut state = self.state.borrow_mut();
        state.variables.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn environ(&self) -> Vec<(String, String)> {
        let state = self.state.borrow();
        state
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
