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

//! Execution of and-or lists

use super::Command;
use quash_env::Env;
use quash_env::semantics::Result;
use quash_syntax::syntax::Node;
use std::ops::ControlFlow::Continue;

/// Executes `left && right`.
///
/// `right` is executed only if `left` succeeds. When `right` is skipped,
/// the exit status of `left` remains.
pub fn execute_and(env: &mut Env, left: &Node, right: &Node) -> Result {
    left.execute(env)?;
    if env.exit_status.is_successful() {
        right.execute(env)
    } else {
        Continue(())
    }
}

/// Executes `left || right`.
///
/// `right` is executed only if `left` fails.
pub fn execute_or(env: &mut Env, left: &Node, right: &Node) -> Result {
    left.execute(env)?;
    if env.exit_status.is_successful() {
        Continue(())
    } else {
        right.execute(env)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{env_with_builtins, stdout};
    use crate::Command;
    use quash_env::semantics::ExitStatus;
    use quash_syntax::syntax::Node;
    use std::ops::ControlFlow::Continue;

    fn parse(line: &str) -> Node {
        quash_syntax::parse_line(line, &std::collections::HashMap::<String, String>::new())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn true_and_true() {
        let (mut env, system) = env_with_builtins();
        let result = parse("echo one && echo two").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "one\ntwo\n");
    }

    #[test]
    fn false_and_skips_right() {
        let (mut env, system) = env_with_builtins();
        let result = parse("return 3 && echo X").execute(&mut env);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus(3));
        assert_eq!(stdout(&system), "");
    }

    #[test]
    fn true_or_skips_right() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("return 0 || echo X").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "");
    }

    #[test]
    fn false_or_runs_right() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("return 1 || echo X").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "X\n");
    }

    #[test]
    fn chained_conditionals_are_left_associative() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("return 1 && echo A || echo B && echo C").execute(&mut env), Continue(()));
        assert_eq!(stdout(&system), "B\nC\n");
    }

    #[test]
    fn sequence_runs_both() {
        let (mut env, system) = env_with_builtins();
        assert_eq!(parse("return 4; echo after").execute(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(stdout(&system), "after\n");
    }
}
