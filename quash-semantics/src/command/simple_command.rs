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

//! Execution of simple commands
//!
//! The first word of a simple command names a built-in or an external
//! utility. A simple command without words only performs its redirections.
//!
//! A built-in runs in the shell process with its redirections undone
//! afterwards. An external utility runs in a new foreground job. Inside a
//! child process that is already running a pipeline stage or background
//! job, the external utility replaces the child process instead.

mod absent;
mod builtin;
mod external;

use super::Command;
use super::pipeline::run_in_foreground;
use quash_env::Env;
use quash_env::semantics::Result;
use quash_syntax::syntax::Node;
use quash_syntax::syntax::SimpleCommand;

pub use external::replace_current_process;

impl Command for SimpleCommand {
    fn execute(&self, env: &mut Env) -> Result {
        let Some(name) = self.words.first() else {
            return absent::execute(env, &self.redirs);
        };

        if let Some(&builtin) = env.builtins.get(name.value.as_str()) {
            return builtin::execute(env, builtin, self);
        }

        let node = Node::Command(self.clone());
        run_in_foreground(env, &[&node], self.to_string())
    }
}

/// Executes a simple command in a child process.
pub fn execute_in_child(env: &mut Env, command: &SimpleCommand) -> Result {
    let Some(name) = command.words.first() else {
        return absent::execute(env, &command.redirs);
    };

    match env.builtins.get(name.value.as_str()) {
        Some(&builtin) => builtin::execute(env, builtin, command),
        None => replace_current_process(env, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{env_with_builtins, stdout};
    use quash_env::io::Fd;
    use quash_env::semantics::Divert;
    use quash_env::semantics::ExitStatus;
    use std::ops::ControlFlow::{Break, Continue};

    fn parse(line: &str) -> SimpleCommand {
        let variables = std::collections::HashMap::<String, String>::new();
        let node = quash_syntax::parse_line(line, &variables).unwrap().unwrap();
        match node {
            Node::Command(command) => command,
            other => panic!("not a simple command: {other:?}"),
        }
    }

    #[test]
    fn builtin_output_redirected_and_restored() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("echo hello > out").execute(&mut env), Continue(()));
        assert_eq!(parse("echo world").execute(&mut env), Continue(()));

        let state = system.state.borrow();
        assert_eq!(state.file("out").unwrap(), "hello\n");
        assert_eq!(state.output(Fd::STDOUT), "world\n");
        assert_eq!(state.open_fds.len(), 3);
    }

    #[test]
    fn builtin_not_run_when_redirection_fails() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("echo X < missing").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(stdout(&system), "");
        let stderr = system.state.borrow().output(Fd::STDERR);
        assert!(stderr.starts_with("quash: missing: "), "{stderr}");
    }

    #[test]
    fn builtin_exit_status() {
        let (mut env, _) = env_with_builtins();
        assert_eq!(parse("return 7").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus(7));
    }

    #[test]
    fn redirection_only_creates_file() {
        let (mut env, system) = env_with_builtins();
        env.exit_status = ExitStatus(5);
        assert_eq!(parse("> empty").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        let state = system.state.borrow();
        assert_eq!(state.file("empty").unwrap(), "");
        assert_eq!(state.open_fds.get(&Fd::STDOUT), Some(&None));
    }

    #[test]
    fn external_utility_without_fork() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("ls -l").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::NOEXEC);
        assert!(env.jobs.is_empty());
        let stderr = system.state.borrow().output(Fd::STDERR);
        assert!(stderr.starts_with("quash: cannot start a child process: "), "{stderr}");
    }

    #[test]
    fn registered_builtins_receive_operands_only() {
        let (mut env, system) = env_with_builtins();
        env.builtins.extend(quash_builtin::BUILTINS.iter().copied());

        assert_eq!(parse("echo hello world").execute(&mut env), Continue(()));
        assert_eq!(stdout(&system), "hello world\n");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);

        let result = parse("exit 5").execute(&mut env);
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus(5)))));
    }

    #[test]
    fn builtin_in_child_runs_in_place() {
        let (mut env, system) = env_with_builtins();
        let result = execute_in_child(&mut env, &parse("echo child"));
        assert_eq!(result, Continue(()));
        assert_eq!(stdout(&system), "child\n");
    }
}
