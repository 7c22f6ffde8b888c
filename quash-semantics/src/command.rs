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

//! Command execution
//!
//! The [`Command`] trait is implemented for the nodes of the syntax tree.
//! Executing a node updates [`Env::exit_status`] and may start child
//! processes, which are tracked as jobs in [`Env::jobs`].

mod and_or;
mod background;
mod pipeline;
pub mod simple_command;

use quash_env::Env;
use quash_env::semantics::Result;
use quash_syntax::syntax::Node;

/// Syntactic construct that can be executed
pub trait Command {
    /// Executes this command.
    ///
    /// The exit status of the command is stored in [`Env::exit_status`]. A
    /// `Break` result means the shell should stop executing commands and
    /// exit.
    fn execute(&self, env: &mut Env) -> Result;
}

impl Command for Node {
    fn execute(&self, env: &mut Env) -> Result {
        match self {
            Node::Command(command) => command.execute(env),
            Node::Pipe(_, _) => pipeline::execute(env, self),
            Node::And(left, right) => and_or::execute_and(env, left, right),
            Node::Or(left, right) => and_or::execute_or(env, left, right),
            Node::Background(node) => background::execute(env, node),
            Node::Sequence(first, second) => {
                first.execute(env)?;
                second.execute(env)
            }
        }
    }
}

/// Executes a command in a child process.
///
/// An external utility replaces the child process instead of being started
/// in yet another child process. Other commands are executed as usual.
pub(crate) fn execute_in_child(env: &mut Env, node: &Node) -> Result {
    match node {
        Node::Command(command) => simple_command::execute_in_child(env, command),
        _ => node.execute(env),
    }
}
