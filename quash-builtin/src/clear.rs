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

//! Clear built-in
//!
//! The clear built-in moves the cursor home and erases the screen with ANSI
//! escape sequences.

use crate::common::{output, report_error};
use quash_env::Env;
use quash_env::semantics::Result;
use std::ops::ControlFlow::Continue;

/// Escape sequence written by the built-in
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Entry point for executing the `clear` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    if let Some(arg) = args.first() {
        return report_error(env, "clear", format_args!("{arg}: unexpected operand"));
    }
    env.exit_status = output(env, CLEAR_SCREEN);
    Continue(())
}
