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

//! Redirection
//!
//! A redirection opens a file or copies a file descriptor and makes the
//! target file descriptor refer to it. [`RedirGuard`] performs redirections
//! while remembering the file descriptors they overwrite, so that a built-in
//! run in the shell process leaves the shell's own file descriptors as they
//! were. The saved copies are kept at [`MIN_INTERNAL_FD`] or above with the
//! close-on-exec flag set.
//!
//! | Operator | Open mode                      | Target         |
//! |----------|--------------------------------|----------------|
//! | `<`      | read-only                      | fd 0           |
//! | `>`      | write, create, truncate        | fd 1           |
//! | `>>`     | write, create, append          | fd 1           |
//! | `<>`     | read-write, create             | fd 0           |
//! | `>&N`    | copy of fd `N`                 | fd 1           |
//! | `>&`     | write, create, truncate        | fds 1 and 2    |
//! | `>>&`    | write, create, append          | fds 1 and 2    |
//!
//! Files are created with mode `rw-r--r--`.

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use quash_env::Env;
use quash_env::io::Fd;
use quash_env::io::MIN_INTERNAL_FD;
use quash_syntax::syntax::Redir;
use quash_syntax::syntax::RedirOp;
use std::ffi::CString;
use std::ffi::NulError;
use std::ops::Deref;
use std::ops::DerefMut;
use thiserror::Error;

/// Reason a redirection failed
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorCause {
    /// Pathname containing a nul byte
    #[error("nul byte found in the pathname")]
    NulByte(#[from] NulError),
    /// The file could not be opened.
    #[error("{}: {}", .0.to_string_lossy(), .1)]
    OpenFile(CString, Errno),
    /// Operand of `>&` that is not a file descriptor
    #[error("{0}: not a valid file descriptor")]
    MalformedFd(String),
    /// The target file descriptor could not be modified.
    #[error("cannot redirect file descriptor {0}: {1}")]
    FdNotOverwritten(Fd, Errno),
}

/// Error in a redirection
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    /// Redirection that failed
    pub redir: Redir,
}

/// Creation mode of files opened by redirections: `rw-r--r--`
const FILE_MODE: Mode = Mode::from_bits_truncate(0o644);

fn open_flags(op: RedirOp) -> OFlag {
    use RedirOp::*;
    match op {
        FileIn => OFlag::O_RDONLY,
        FileOut | FileOutAll => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        FileAppend | FileAppendAll => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
        FileInOut => OFlag::O_RDWR | OFlag::O_CREAT,
        FdDup => OFlag::empty(),
    }
}

/// Returns the file descriptors a redirection overwrites.
#[must_use]
pub fn target_fds(redir: &Redir) -> Vec<Fd> {
    match redir.op {
        RedirOp::FileOutAll | RedirOp::FileAppendAll if redir.fd.is_none() => {
            vec![Fd::STDOUT, Fd::STDERR]
        }
        _ => vec![redir.fd_or_default()],
    }
}

/// Record of a file descriptor overwritten by a redirection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SavedFd {
    /// File descriptor that was overwritten
    original: Fd,
    /// Copy of the original open file description, or `None` if the file
    /// descriptor was not open
    save: Option<Fd>,
}

/// Performs redirections and undoes them when dropped.
///
/// `RedirGuard` dereferences to the [`Env`] it wraps, so commands can be
/// executed through the guard while the redirections are in effect.
#[derive(Debug)]
pub struct RedirGuard<'e> {
    env: &'e mut Env,
    saved_fds: Vec<SavedFd>,
}

impl Deref for RedirGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for RedirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for RedirGuard<'_> {
    fn drop(&mut self) {
        self.undo_redirs()
    }
}

impl<'e> RedirGuard<'e> {
    /// Creates a guard with no redirections performed yet.
    pub fn new(env: &'e mut Env) -> Self {
        RedirGuard {
            env,
            saved_fds: Vec::new(),
        }
    }

    fn save(&mut self, original: Fd) -> Result<(), Errno> {
        let save = match self.env.system.dup(original, MIN_INTERNAL_FD, true) {
            Ok(save) => Some(save),
            Err(Errno::EBADF) => None,
            Err(errno) => return Err(errno),
        };
        self.saved_fds.push(SavedFd { original, save });
        Ok(())
    }

    /// Performs a redirection.
    ///
    /// The overwritten file descriptors are saved before the file is opened
    /// so that a file opened at a closed target file descriptor is still
    /// undone correctly.
    pub fn perform_redir(&mut self, redir: &Redir) -> Result<(), Error> {
        let error = |cause| Error {
            cause,
            redir: redir.clone(),
        };
        let targets = target_fds(redir);
        for &target in &targets {
            self.save(target)
                .map_err(|errno| error(ErrorCause::FdNotOverwritten(target, errno)))?;
        }

        let (source, opened) = if redir.op == RedirOp::FdDup {
            let source = redir
                .target
                .to_fd()
                .ok_or_else(|| error(ErrorCause::MalformedFd(redir.target.value.clone())))?;
            (source, false)
        } else {
            let path = CString::new(redir.target.value.as_str())
                .map_err(|e| error(ErrorCause::NulByte(e)))?;
            let fd = self
                .env
                .system
                .open(&path, open_flags(redir.op) | OFlag::O_CLOEXEC, FILE_MODE)
                .map_err(|errno| error(ErrorCause::OpenFile(path, errno)))?;
            (fd, true)
        };

        let mut result = Ok(());
        for &target in &targets {
            if target == source {
                continue;
            }
            log::trace!("dup2({source}, {target})");
            if let Err(errno) = self.env.system.dup2(source, target) {
                result = Err(error(ErrorCause::FdNotOverwritten(target, errno)));
                break;
            }
        }

        if opened && !targets.contains(&source) {
            log::trace!("close({source})");
            _ = self.env.system.close(source);
        }
        result
    }

    /// Performs redirections in order.
    ///
    /// A later redirection to the same file descriptor overrides an earlier
    /// one. Stops at the first error.
    pub fn perform_redirs<'a, I>(&mut self, redirs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a Redir>,
    {
        redirs
            .into_iter()
            .try_for_each(|redir| self.perform_redir(redir))
    }

    /// Restores the file descriptors overwritten by the redirections.
    ///
    /// This is called when the guard is dropped.
    pub fn undo_redirs(&mut self) {
        for SavedFd { original, save } in self.saved_fds.drain(..).rev() {
            match save {
                Some(save) => {
                    _ = self.env.system.dup2(save, original);
                    _ = self.env.system.close(save);
                }
                None => {
                    _ = self.env.system.close(original);
                }
            }
        }
    }

    /// Makes the redirections permanent.
    ///
    /// The saved copies of the overwritten file descriptors are closed.
    pub fn preserve_redirs(&mut self) {
        for SavedFd { save, .. } in self.saved_fds.drain(..) {
            if let Some(save) = save {
                _ = self.env.system.close(save);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use quash_env::system::dummy::DummySystem;
    use quash_syntax::syntax::Word;
    use quash_syntax::token::TokenFlags;
    use std::path::PathBuf;

    fn dummy_env() -> (Env, DummySystem) {
        let system = DummySystem::new();
        let env = Env::with_system(Box::new(system.clone()));
        (env, system)
    }

    fn redir(fd: Option<i32>, op: RedirOp, target: &str) -> Redir {
        Redir {
            fd: fd.map(Fd),
            op,
            target: Word::new(target),
        }
    }

    fn path_of(system: &DummySystem, fd: Fd) -> Option<Option<PathBuf>> {
        system.state.borrow().open_fds.get(&fd).cloned()
    }

    #[test]
    fn file_out_creates_and_undoes() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileOut, "out"))
            .unwrap();
        guard.print("hello\n").unwrap();
        assert_eq!(path_of(&system, Fd::STDOUT), Some(Some("out".into())));
        drop(guard);

        assert_eq!(path_of(&system, Fd::STDOUT), Some(None));
        assert_eq!(system.state.borrow().file("out").unwrap(), "hello\n");
        let state = system.state.borrow();
        assert_eq!(state.open_fds.len(), 3, "{:?}", state.open_fds);
    }

    #[test]
    fn file_out_truncates_and_append_appends() {
        let (mut env, system) = dummy_env();
        system
            .state
            .borrow_mut()
            .files
            .insert("f".into(), b"old\n".to_vec());

        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileOut, "f"))
            .unwrap();
        guard.print("A\n").unwrap();
        drop(guard);
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileAppend, "f"))
            .unwrap();
        guard.print("B\n").unwrap();
        drop(guard);

        assert_eq!(system.state.borrow().file("f").unwrap(), "A\nB\n");
    }

    #[test]
    fn file_in_requires_existing_file() {
        let (mut env, _) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        let missing = redir(None, RedirOp::FileIn, "missing");
        let error = guard.perform_redir(&missing).unwrap_err();
        assert_matches!(&error.cause, ErrorCause::OpenFile(path, Errno::ENOENT) => {
            assert_eq!(path.to_str(), Ok("missing"));
        });
        assert_eq!(error.redir, missing);
        assert_eq!(error.to_string(), format!("missing: {}", Errno::ENOENT));
    }

    #[test]
    fn in_out_defaults_to_stdin() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileInOut, "rw"))
            .unwrap();
        assert_eq!(path_of(&system, Fd::STDIN), Some(Some("rw".into())));
        assert_eq!(system.state.borrow().file("rw").unwrap(), "");
    }

    #[test]
    fn io_number_selects_target() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(Some(2), RedirOp::FileOut, "err"))
            .unwrap();
        guard.print_error("oops");
        assert_eq!(path_of(&system, Fd::STDOUT), Some(None));
        drop(guard);
        assert_eq!(system.state.borrow().file("err").unwrap(), "quash: oops\n");
    }

    #[test]
    fn both_streams_to_one_file() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileOutAll, "all"))
            .unwrap();
        guard.print("out\n").unwrap();
        guard.print_error("err");
        drop(guard);
        assert_eq!(system.state.borrow().file("all").unwrap(), "out\nquash: err\n");
        assert_eq!(path_of(&system, Fd::STDERR), Some(None));
    }

    #[test]
    fn fd_dup_copies_descriptor() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileOut, "log"))
            .unwrap();
        let mut target = Word::new("1");
        target.flags = TokenFlags::IS_NUMBER;
        let dup = Redir {
            fd: Some(Fd::STDERR),
            op: RedirOp::FdDup,
            target,
        };
        guard.perform_redir(&dup).unwrap();
        assert_eq!(path_of(&system, Fd::STDERR), Some(Some("log".into())));
        drop(guard);
        assert_eq!(path_of(&system, Fd::STDERR), Some(None));
        assert_eq!(path_of(&system, Fd::STDOUT), Some(None));
    }

    #[test]
    fn fd_dup_of_closed_descriptor_fails() {
        let (mut env, _) = dummy_env();
        let mut target = Word::new("7");
        target.flags = TokenFlags::IS_NUMBER;
        let dup = Redir {
            fd: None,
            op: RedirOp::FdDup,
            target,
        };
        let mut guard = RedirGuard::new(&mut env);
        let error = guard.perform_redir(&dup).unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::FdNotOverwritten(Fd::STDOUT, Errno::EBADF)
        );
    }

    #[test]
    fn fd_dup_with_non_number_operand() {
        let (mut env, _) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        let error = guard
            .perform_redir(&redir(None, RedirOp::FdDup, "x"))
            .unwrap_err();
        assert_eq!(error.cause, ErrorCause::MalformedFd("x".to_owned()));
        assert_eq!(error.to_string(), "x: not a valid file descriptor");
    }

    #[test]
    fn nul_byte_in_pathname() {
        let (mut env, _) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        let error = guard
            .perform_redir(&redir(None, RedirOp::FileOut, "a\0b"))
            .unwrap_err();
        assert_matches!(error.cause, ErrorCause::NulByte(_));
    }

    #[test]
    fn later_redirection_wins() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        let redirs = [
            redir(None, RedirOp::FileOut, "first"),
            redir(None, RedirOp::FileOut, "second"),
        ];
        guard.perform_redirs(&redirs).unwrap();
        guard.print("text\n").unwrap();
        drop(guard);

        let state = system.state.borrow();
        assert_eq!(state.file("first").unwrap(), "");
        assert_eq!(state.file("second").unwrap(), "text\n");
        assert_eq!(state.open_fds.get(&Fd::STDOUT), Some(&None));
    }

    #[test]
    fn preserved_redirections_stay() {
        let (mut env, system) = dummy_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(None, RedirOp::FileOut, "kept"))
            .unwrap();
        guard.preserve_redirs();
        drop(guard);
        assert_eq!(path_of(&system, Fd::STDOUT), Some(Some("kept".into())));
        assert_eq!(system.state.borrow().open_fds.len(), 3);
    }
}
