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

//! Implementation of the built-in utilities of quash
//!
//! Each module implements one built-in with a `main` function of the
//! [`Main`] type. [`BUILTINS`] lists them all; the shell registers the list
//! in [`Env::builtins`](quash_env::Env::builtins).
//!
//! | Built-in | Operation                                          |
//! |----------|----------------------------------------------------|
//! | `bg`     | resumes a job in the background                    |
//! | `cd`     | changes the working directory                      |
//! | `clear`  | clears the terminal screen                         |
//! | `echo`   | prints the operands                                |
//! | `exit`   | exits the shell                                    |
//! | `export` | sets environment variables                         |
//! | `fg`     | resumes a job in the foreground                    |
//! | `jobs`   | lists jobs                                         |
//! | `kill`   | sends a signal to processes or lists signal names  |
//! | `pwd`    | prints the working directory                       |
//! | `quit`   | same as `exit`                                     |

pub mod bg;
pub mod cd;
pub mod clear;
pub mod common;
pub mod echo;
pub mod exit;
pub mod export;
pub mod fg;
pub mod jobs;
pub mod kill;
pub mod pwd;

#[doc(no_inline)]
pub use quash_env::builtin::*;

/// Array of all the implemented built-in utilities
///
/// The array items are ordered alphabetically.
pub const BUILTINS: &[(&str, Builtin)] = &[
    ("bg", Builtin::new(bg::main)),
    ("cd", Builtin::new(cd::main)),
    ("clear", Builtin::new(clear::main)),
    ("echo", Builtin::new(echo::main)),
    ("exit", Builtin::new(exit::main)),
    ("export", Builtin::new(export::main)),
    ("fg", Builtin::new(fg::main)),
    ("jobs", Builtin::new(jobs::main)),
    ("kill", Builtin::new(kill::main)),
    ("pwd", Builtin::new(pwd::main)),
    ("quit", Builtin::new(exit::main)),
];

#[cfg(test)]
pub(crate) mod tests;
