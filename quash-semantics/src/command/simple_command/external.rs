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

//! Execution of external utilities

use crate::Handle;
use crate::redir::RedirGuard;
use nix::errno::Errno;
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_syntax::syntax::SimpleCommand;
use std::ffi::CString;

/// Replaces the current process with the external utility.
///
/// This should be called in a child process. The utility is searched for in
/// `$PATH`. On failure, an error message is printed and the result tells the
/// child to exit with status 127 if the utility was not found, or 126
/// otherwise.
pub fn replace_current_process(env: &mut Env, command: &SimpleCommand) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(&command.redirs) {
        return error.handle(&mut env);
    }
    env.preserve_redirs();

    let argv = command.argv();
    let name = argv.first().cloned().unwrap_or_default();
    let args = argv.into_iter().map(CString::new);
    let args = match args.collect::<std::result::Result<Vec<_>, _>>() {
        Ok(args) => args,
        Err(error) => {
            env.print_error(format_args!("{name}: {error}"));
            return Env::exit(Some(ExitStatus::NOEXEC));
        }
    };
    let Some(path) = args.first() else {
        return Env::exit(Some(ExitStatus::SUCCESS));
    };

    log::debug!("exec {args:?}");
    let Err(errno) = env.system.execvp(path, &args);
    let exit_status = if errno == Errno::ENOENT {
        env.print_error(format_args!("{name}: command not found"));
        ExitStatus::NOT_FOUND
    } else {
        env.print_error(format_args!("{name}: {errno}"));
        ExitStatus::NOEXEC
    };
    Env::exit(Some(exit_status))
}
