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

//! Execution of simple commands that have no words

use crate::Handle;
use crate::redir::RedirGuard;
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_syntax::syntax::Redir;
use std::ops::ControlFlow::Continue;

/// Performs the redirections and undoes them.
///
/// The redirections still create and truncate files, so `> file` empties
/// `file`.
pub fn execute(env: &mut Env, redirs: &[Redir]) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(redirs) {
        return error.handle(&mut env);
    }
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}
