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

//! Semantics of the quash command language
//!
//! This crate evaluates the syntax trees produced by `quash-syntax`. The
//! [`Command`] trait executes a tree in an [`Env`](quash_env::Env), and
//! [`read_eval_loop`] drives the shell by reading lines from a
//! [`LineSource`], parsing them and executing the results.

pub mod command;
mod handle;
pub mod redir;
mod runner;

pub use self::command::Command;
pub use self::handle::Handle;
pub use self::runner::DEFAULT_PROMPT;
pub use self::runner::LineSource;
pub use self::runner::prompt;
pub use self::runner::read_eval_loop;
