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

//! Implementation of `System` that actually interacts with the system.

use super::ForkResult;
use super::SignalHandling;
use super::System;
use super::is_valid_env;
use crate::io::Fd;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::SaFlags;
use nix::sys::signal::SigAction;
use nix::sys::signal::SigHandler;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::c_int;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicIsize;
use std::sync::atomic::Ordering;
use std::sync::atomic::compiler_fence;

/// Slots for signals caught but not yet retrieved
///
/// A zero slot is empty. Filled slots are always contiguous from the start.
static CAUGHT_SIGNALS: [AtomicIsize; 8] = [const { AtomicIsize::new(0) }; 8];

/// Signal catching function
///
/// Only async-signal-safe operations are allowed here, so the function does
/// nothing but record the signal number in [`CAUGHT_SIGNALS`].
extern "C" fn catch_signal(signal: c_int) {
    let signal = signal as isize;
    for slot in &CAUGHT_SIGNALS {
        match slot.compare_exchange(0, signal, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            // Already recorded
            Err(recorded) if recorded == signal => break,
            Err(_) => continue,
        }
    }
    // If all slots are in use, the signal is dropped.
}

/// Implementation of `System` that actually interacts with the system.
///
/// `RealSystem` is an empty `struct` because the underlying operating system
/// manages the system's internal state.
#[derive(Debug)]
pub struct RealSystem(());

impl RealSystem {
    /// Returns an instance of `RealSystem`.
    ///
    /// # Safety
    ///
    /// Signal dispositions, file descriptors and child processes are
    /// process-wide. The caller must make sure only one `RealSystem` is used
    /// in the process and that the process does not run other threads that
    /// depend on them.
    pub unsafe fn new() -> Self {
        RealSystem(())
    }
}

/// Retries a system call while it fails with `EINTR`.
fn retry<T, F: FnMut() -> nix::Result<T>>(mut f: F) -> nix::Result<T> {
    loop {
        match f() {
            Err(Errno::EINTR) => continue,
            result => return result,
        }
    }
}

impl System for RealSystem {
    fn pipe(&mut self) -> nix::Result<(Fd, Fd)> {
        let mut fds: [c_int; 2] = [-1; 2];
        Errno::result(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
        Ok((Fd(fds[0]), Fd(fds[1])))
    }

    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> nix::Result<Fd> {
        let command = if cloexec {
            libc::F_DUPFD_CLOEXEC
        } else {
            libc::F_DUPFD
        };
        Errno::result(unsafe { libc::fcntl(from.0, command, to_min.0) }).map(Fd)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> nix::Result<Fd> {
        retry(|| Errno::result(unsafe { libc::dup2(from.0, to.0) })).map(Fd)
    }

    fn close(&mut self, fd: Fd) -> nix::Result<()> {
        match retry(|| Errno::result(unsafe { libc::close(fd.0) })) {
            Ok(_) | Err(Errno::EBADF) => Ok(()),
            Err(errno) => Err(errno),
        }
    }

    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> nix::Result<Fd> {
        let mode = mode.bits() as libc::c_uint;
        retry(|| Errno::result(unsafe { libc::open(path.as_ptr(), flags.bits(), mode) })).map(Fd)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> nix::Result<usize> {
        retry(|| {
            Errno::result(unsafe { libc::write(fd.0, buffer.as_ptr().cast(), buffer.len()) })
        })
        .map(|count| count as usize)
    }

    fn isatty(&self, fd: Fd) -> bool {
        unsafe { libc::isatty(fd.0) == 1 }
    }

    fn fork(&mut self) -> nix::Result<ForkResult> {
        // SAFETY: As stated on RealSystem::new, the process is
        // single-threaded, so the child can safely continue running Rust code.
        unsafe { nix::unistd::fork() }
    }

    fn execvp(&mut self, name: &CStr, args: &[CString]) -> nix::Result<Infallible> {
        retry(|| nix::unistd::execvp(name, args))
    }

    fn wait(&mut self, target: Option<Pid>) -> nix::Result<WaitStatus> {
        let options = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        nix::sys::wait::waitpid(target, Some(options))
    }

    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> nix::Result<()> {
        nix::sys::signal::kill(target, signal)
    }

    fn getpid(&self) -> Pid {
        nix::unistd::getpid()
    }

    fn getpgrp(&self) -> Pid {
        nix::unistd::getpgrp()
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> nix::Result<()> {
        nix::unistd::setpgid(pid, pgid)
    }

    fn tcgetpgrp(&self, fd: Fd) -> nix::Result<Pid> {
        Errno::result(unsafe { libc::tcgetpgrp(fd.0) }).map(Pid::from_raw)
    }

    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> nix::Result<()> {
        retry(|| Errno::result(unsafe { libc::tcsetpgrp(fd.0, pgid.as_raw()) })).map(drop)
    }

    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        old_set: Option<&mut SigSet>,
    ) -> nix::Result<()> {
        nix::sys::signal::sigprocmask(how, set, old_set)
    }

    fn sigaction(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> nix::Result<SignalHandling> {
        let (handler, flags) = match handling {
            SignalHandling::Default => (SigHandler::SigDfl, SaFlags::empty()),
            SignalHandling::Ignore => (SigHandler::SigIgn, SaFlags::empty()),
            // Reads of the next command line must not fail with EINTR.
            SignalHandling::Catch => (SigHandler::Handler(catch_signal), SaFlags::SA_RESTART),
        };
        let new_action = SigAction::new(handler, flags, SigSet::empty());
        // SAFETY: The `catch_signal` function only accesses atomic variables.
        let old_action = unsafe { nix::sys::signal::sigaction(signal, &new_action) }?;
        Ok(match old_action.handler() {
            SigHandler::SigDfl => SignalHandling::Default,
            SigHandler::SigIgn => SignalHandling::Ignore,
            SigHandler::Handler(_) | SigHandler::SigAction(_) => SignalHandling::Catch,
        })
    }

    fn caught_signals(&mut self) -> Vec<Signal> {
        let mut signals = Vec::new();
        for slot in &CAUGHT_SIGNALS {
            // Examine the slots in order.
            compiler_fence(Ordering::Acquire);

            let signal = slot.swap(0, Ordering::Relaxed);
            if signal == 0 {
                break;
            }
            if let Ok(signal) = Signal::try_from(signal as c_int) {
                signals.push(signal);
            }
        }
        signals
    }

    fn sigsuspend(&mut self, mask: &SigSet) -> nix::Result<()> {
        let mask: &libc::sigset_t = mask.as_ref();
        let result = unsafe { libc::sigsuspend(mask) };
        match Errno::result(result) {
            Err(Errno::EINTR) => Ok(()),
            Err(errno) => Err(errno),
            Ok(_) => Ok(()),
        }
    }

    fn getcwd(&self) -> nix::Result<PathBuf> {
        nix::unistd::getcwd()
    }

    fn chdir(&mut self, path: &Path) -> nix::Result<()> {
        nix::unistd::chdir(path)
    }

    fn getenv(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn setenv(&mut self, name: &str, value: &str) -> nix::Result<()> {
        if !is_valid_env(name, value) {
            return Err(Errno::EINVAL);
        }
        // SAFETY: As stated on RealSystem::new, no other thread reads the
        // environment concurrently.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }

    fn environ(&self) -> Vec<(String, String)> {
        let mut variables = std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect::<Vec<_>>();
        variables.sort();
        variables
    }
}
