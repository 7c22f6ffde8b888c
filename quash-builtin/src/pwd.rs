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

//! Pwd built-in
//!
//! The pwd built-in prints the working directory path obtained with
//! [`System::getcwd`](quash_env::system::System::getcwd).

use crate::common::{output, report_error, report_failure};
use quash_env::Env;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;

/// Entry point for executing the `pwd` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    if let Some(arg) = args.first() {
        return report_error(env, "pwd", format_args!("{arg}: unexpected operand"));
    }
    match env.system.getcwd() {
        Ok(path) => {
            let line = format!("{}\n", path.display());
            env.exit_status = output(env, &line);
            Continue(())
        }
        Err(errno) => report_failure(
            env,
            "pwd",
            format_args!("cannot get the working directory: {errno}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{args, dummy_env, stderr, stdout};
    use quash_env::semantics::ExitStatus;
    use std::path::PathBuf;

    #[test]
    fn printing_working_directory() {
        let (mut env, system) = dummy_env();
        system.state.borrow_mut().cwd = PathBuf::from("/usr/local");
        assert_eq!(main(&mut env, vec![]), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "/usr/local\n");
    }

    #[test]
    fn operand_is_rejected() {
        let (mut env, system) = dummy_env();
        assert_eq!(main(&mut env, args(&["-P"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_eq!(stderr(&system), "quash: pwd: -P: unexpected operand\n");
    }
}
