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

//! Execution of built-ins

use crate::Handle;
use crate::redir::RedirGuard;
use quash_env::Env;
use quash_env::builtin::Builtin;
use quash_env::semantics::Result;
use quash_syntax::syntax::SimpleCommand;

/// Runs the built-in with the command's redirections in effect.
pub fn execute(env: &mut Env, builtin: Builtin, command: &SimpleCommand) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(&command.redirs) {
        return error.handle(&mut env);
    }
    let mut args = command.argv();
    let operands = args.split_off(1);
    log::debug!("running built-in {:?}", args[0]);
    (builtin.execute)(&mut env, operands)
}
