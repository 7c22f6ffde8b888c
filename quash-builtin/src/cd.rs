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

//! Cd built-in
//!
//! The cd built-in changes the working directory of the shell.
//!
//! - Without an operand, the directory is `$HOME`.
//! - With the operand `-`, the directory is `$OLDPWD`, and the new working
//!   directory is printed to the standard output.
//!
//! On success, `$OLDPWD` is set to the previous working directory and `$PWD`
//! to the new one.

use crate::common::{output, report_error, report_failure};
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;
use std::path::Path;

const NAME: &str = "cd";

/// Entry point for executing the `cd` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    let (target, print) = match args.as_slice() {
        [] => match env.system.getenv("HOME") {
            Some(home) => (home, false),
            None => return report_failure(env, NAME, "HOME not set"),
        },
        [dash] if dash == "-" => match env.system.getenv("OLDPWD") {
            Some(old) => (old, true),
            None => return report_failure(env, NAME, "OLDPWD not set"),
        },
        [dir] => (dir.clone(), false),
        [_, extra, ..] => {
            return report_error(env, NAME, format_args!("{extra}: unexpected operand"));
        }
    };

    let old = env.system.getcwd().ok();
    if let Err(errno) = env.system.chdir(Path::new(&target)) {
        return report_failure(env, NAME, format_args!("{target}: {errno}"));
    }

    let new = match env.system.getcwd() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(errno) => {
            log::warn!("getcwd after chdir: {errno}");
            target
        }
    };
    if let Some(old) = old {
        set_variable(env, "OLDPWD", &old.to_string_lossy());
    }
    set_variable(env, "PWD", &new);

    env.exit_status = if print {
        output(env, &format!("{new}\n"))
    } else {
        ExitStatus::SUCCESS
    };
    Continue(())
}

fn set_variable(env: &mut Env, name: &str, value: &str) {
    if let Err(errno) = env.system.setenv(name, value) {
        log::warn!("cannot set {name}: {errno}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{args, dummy_env, stderr, stdout};
    use std::path::PathBuf;

    #[test]
    fn changing_to_operand() {
        let (mut env, system) = dummy_env();
        system.state.borrow_mut().cwd = PathBuf::from("/home");
        assert_eq!(main(&mut env, args(&["user"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);

        let state = system.state.borrow();
        assert_eq!(state.cwd, Path::new("/home/user"));
        assert_eq!(state.variables["PWD"], "/home/user");
        assert_eq!(state.variables["OLDPWD"], "/home");
        assert_eq!(state.output(quash_env::io::Fd::STDOUT), "");
    }

    #[test]
    fn changing_to_home() {
        let (mut env, system) = dummy_env();
        system
            .state
            .borrow_mut()
            .variables
            .insert("HOME".to_owned(), "/root".to_owned());
        assert_eq!(main(&mut env, vec![]), Continue(()));
        assert_eq!(system.state.borrow().cwd, Path::new("/root"));
    }

    #[test]
    fn home_not_set() {
        let (mut env, system) = dummy_env();
        assert_eq!(main(&mut env, vec![]), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(stderr(&system), "quash: cd: HOME not set\n");
        assert_eq!(system.state.borrow().cwd, Path::new("/"));
    }

    #[test]
    fn changing_back_to_previous_directory() {
        let (mut env, system) = dummy_env();
        system.state.borrow_mut().cwd = PathBuf::from("/tmp");
        system
            .state
            .borrow_mut()
            .variables
            .insert("OLDPWD".to_owned(), "/var/log".to_owned());
        assert_eq!(main(&mut env, args(&["-"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "/var/log\n");
        assert_eq!(system.state.borrow().variables["OLDPWD"], "/tmp");
    }

    #[test]
    fn too_many_operands() {
        let (mut env, system) = dummy_env();
        assert_eq!(main(&mut env, args(&["a", "b"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_eq!(stderr(&system), "quash: cd: b: unexpected operand\n");
    }
}
