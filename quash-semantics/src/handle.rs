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

//! Error handlers

use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;

/// Error handler
pub trait Handle {
    /// Reports the error and updates the exit status.
    ///
    /// The result tells whether the caller should continue executing the
    /// command line.
    fn handle(&self, env: &mut Env) -> Result;
}

/// Prints the error and sets the exit status to [`ExitStatus::ERROR`].
///
/// Nothing in the line has been executed when the line fails to parse.
impl Handle for quash_syntax::Error {
    fn handle(&self, env: &mut Env) -> Result {
        env.print_error(format_args!("syntax error: {self}"));
        env.exit_status = ExitStatus::ERROR;
        Continue(())
    }
}

/// Prints the error and sets the exit status to [`ExitStatus::FAILURE`].
///
/// The command whose redirection failed is not executed, but the rest of
/// the command line is.
impl Handle for crate::redir::Error {
    fn handle(&self, env: &mut Env) -> Result {
        env.print_error(self);
        env.exit_status = ExitStatus::FAILURE;
        Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redir::Error;
    use crate::redir::ErrorCause;
    use quash_env::io::Fd;
    use quash_env::system::dummy::DummySystem;
    use quash_syntax::syntax::Redir;
    use quash_syntax::syntax::RedirOp;
    use quash_syntax::syntax::Word;
    use std::collections::HashMap;

    #[test]
    fn syntax_error_handling() {
        let system = DummySystem::new();
        let mut env = Env::with_system(Box::new(system.clone()));
        let error = quash_syntax::parse_line("echo |", &HashMap::<String, String>::new())
            .unwrap_err();
        assert_eq!(error.handle(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        let stderr = system.state.borrow().output(Fd::STDERR);
        assert!(stderr.starts_with("quash: syntax error: "), "{stderr}");
    }

    #[test]
    fn redirection_error_handling() {
        let system = DummySystem::new();
        let mut env = Env::with_system(Box::new(system.clone()));
        let error = Error {
            cause: ErrorCause::MalformedFd("x".to_owned()),
            redir: Redir {
                fd: None,
                op: RedirOp::FdDup,
                target: Word::new("x"),
            },
        };
        assert_eq!(error.handle(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(
            system.state.borrow().output(Fd::STDERR),
            "quash: x: not a valid file descriptor\n"
        );
    }
}
