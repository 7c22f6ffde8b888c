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

//! Read-eval loop

use crate::Command;
use crate::Handle;
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;

/// Prompt shown when `$PS1` is not set
pub const DEFAULT_PROMPT: &str = "$ ";

/// Source of command lines
pub trait LineSource {
    /// Reads the next line.
    ///
    /// The prompt is shown to the user if the source is interactive.
    /// Returns `Ok(None)` at the end of input.
    fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
}

/// Returns the prompt for the next line.
#[must_use]
pub fn prompt(env: &Env) -> String {
    if env.interactive {
        env.system
            .getenv("PS1")
            .unwrap_or_else(|| DEFAULT_PROMPT.to_owned())
    } else {
        String::new()
    }
}

/// Reads and executes lines until the end of input.
///
/// Before each line is read, state changes of child processes are collected
/// and reported. A line that fails to parse is reported and skipped. The
/// loop ends early when a command returns `Break`, which is passed on to the
/// caller.
pub fn read_eval_loop(env: &mut Env, source: &mut dyn LineSource) -> Result {
    loop {
        env.reap();
        env.report_jobs();

        let line = match source.next_line(&prompt(env)) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                env.print_error(format_args!("cannot read commands: {error}"));
                env.exit_status = ExitStatus::ERROR;
                break;
            }
        };

        match quash_syntax::parse_line(&line, &*env) {
            Ok(Some(node)) => node.execute(env)?,
            Ok(None) => (),
            Err(error) => error.handle(env)?,
        }
    }

    env.reap();
    env.report_jobs();
    Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{env_with_builtins, stdout};
    use quash_env::io::Fd;
    use quash_env::job::Job;
    use quash_env::job::JobFlags;
    use quash_env::job::Pid;
    use quash_env::job::Process;
    use quash_env::semantics::Divert;
    use std::collections::VecDeque;
    use std::ops::ControlFlow::Break;

    struct Lines(VecDeque<&'static str>);

    impl LineSource for Lines {
        fn next_line(&mut self, _prompt: &str) -> std::io::Result<Option<String>> {
            Ok(self.0.pop_front().map(str::to_owned))
        }
    }

    fn lines(lines: &[&'static str]) -> Lines {
        Lines(lines.iter().copied().collect())
    }

    #[test]
    fn executes_lines_in_order() {
        let (mut env, system) = env_with_builtins();
        let result = read_eval_loop(&mut env, &mut lines(&["echo a; echo b", "", "return 3"]));
        assert_eq!(result, Continue(()));
        assert_eq!(stdout(&system), "a\nb\n");
        assert_eq!(env.exit_status, ExitStatus(3));
    }

    #[test]
    fn exit_status_variable_expands() {
        let (mut env, system) = env_with_builtins();
        let result = read_eval_loop(&mut env, &mut lines(&["return 4", "echo $?", "echo $?"]));
        assert_eq!(result, Continue(()));
        assert_eq!(stdout(&system), "4\n0\n");
    }

    #[test]
    fn syntax_error_skips_line_only() {
        let (mut env, system) = env_with_builtins();
        let result = read_eval_loop(&mut env, &mut lines(&["echo X |", "echo $?"]));
        assert_eq!(result, Continue(()));
        assert_eq!(stdout(&system), "2\n");
        let stderr = system.state.borrow().output(Fd::STDERR);
        assert!(stderr.starts_with("quash: syntax error: "), "{stderr}");
    }

    #[test]
    fn lexical_error_executes_nothing() {
        let (mut env, system) = env_with_builtins();
        let result = read_eval_loop(&mut env, &mut lines(&["echo 'unclosed"]));
        assert_eq!(result, Continue(()));
        assert_eq!(stdout(&system), "");
        assert_eq!(env.exit_status, ExitStatus::ERROR);
    }

    #[test]
    fn exit_stops_loop() {
        let (mut env, system) = env_with_builtins();
        let result = read_eval_loop(&mut env, &mut lines(&["exit 9", "echo unreachable"]));
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus(9)))));
        assert_eq!(stdout(&system), "");
    }

    #[test]
    fn finished_jobs_reported_before_next_line() {
        let (mut env, system) = env_with_builtins();
        let mut job = Job::new("sleep 1");
        job.flags |= JobFlags::ASYNC;
        job.processes.push(Process::new(Pid::from_raw(20), "sleep 1"));
        env.jobs.add(job).unwrap();
        system
            .state
            .borrow_mut()
            .wait_statuses
            .push_back(nix::sys::wait::WaitStatus::Exited(Pid::from_raw(20), 0));

        let result = read_eval_loop(&mut env, &mut lines(&["echo hi"]));
        assert_eq!(result, Continue(()));
        assert_eq!(stdout(&system), "hi\n");
        assert_eq!(
            system.state.borrow().output(Fd::STDERR),
            "[1] + Done                 sleep 1\n"
        );
        assert!(env.jobs.is_empty());
    }

    #[test]
    fn prompt_is_empty_unless_interactive() {
        let (mut env, _) = env_with_builtins();
        assert_eq!(prompt(&env), "");
        env.interactive = true;
        assert_eq!(prompt(&env), DEFAULT_PROMPT);
        env.system.setenv("PS1", "quash> ").unwrap();
        assert_eq!(prompt(&env), "quash> ");
    }
}
