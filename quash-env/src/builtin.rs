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

//! Type definitions for built-in utilities
//!
//! This module provides the data types shared between the evaluator, which
//! looks built-ins up in [`Env::builtins`](crate::Env::builtins), and the
//! `quash-builtin` crate, which implements them.

use crate::Env;
use crate::semantics;

/// Type of the function that implements a built-in
///
/// The function takes the environment and the operands of the command line,
/// that is, the words after the name of the built-in. The exit status of the built-in is
/// stored in [`Env::exit_status`](crate::Env::exit_status) before the
/// function returns. A `Break` result tells the caller to stop executing
/// the current command line.
pub type Main = fn(&mut Env, Vec<String>) -> semantics::Result;

/// Built-in utility definition
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    /// Function that implements the built-in
    pub execute: Main,
}

impl Builtin {
    /// Creates a built-in definition.
    #[must_use]
    pub const fn new(execute: Main) -> Self {
        Builtin { execute }
    }
}
