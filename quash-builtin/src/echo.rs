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

//! Echo built-in
//!
//! The echo built-in prints its operands separated by spaces and followed
//! by a newline. No options or escape sequences are recognized.

use crate::common::output;
use quash_env::Env;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;

/// Entry point for executing the `echo` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    let mut text = args.join(" ");
    text.push('\n');
    env.exit_status = output(env, &text);
    Continue(())
}
