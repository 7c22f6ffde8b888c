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

//! Exit built-in
//!
//! The exit built-in (also available as `quit`) makes the shell exit. The
//! optional operand is the exit status; without it, the shell exits with the
//! status of the last command.
//!
//! The built-in returns [`Divert::Exit`](quash_env::semantics::Divert::Exit)
//! rather than exiting the process directly, so that the read-eval loop can
//! unwind. In a subshell, the divert ends the child process.

use crate::common::report_error;
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;

const NAME: &str = "exit";

/// Entry point for executing the `exit` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    match args.as_slice() {
        [] => Env::exit(None),
        [operand] => match operand.parse() {
            Ok(status) => Env::exit(Some(ExitStatus(status))),
            Err(_) => report_error(env, NAME, format_args!("{operand}: not a valid exit status")),
        },
        [_, extra, ..] => report_error(env, NAME, format_args!("{extra}: unexpected operand")),
    }
}
