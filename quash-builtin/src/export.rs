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

//! Export built-in
//!
//! `export NAME=VALUE...` sets environment variables, which are inherited by
//! the commands the shell starts afterwards. An operand that is a bare
//! variable name is accepted and ignored since every variable the shell knows
//! is already exported. Without operands, the built-in prints the
//! environment in a form that can be read back by the shell.

use crate::common::{output, report_failure};
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_syntax::lex::is_name;
use std::ops::ControlFlow::Continue;

const NAME: &str = "export";

/// Quotes a value so that the shell reads it back unchanged.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

fn print_environment(env: &mut Env) -> ExitStatus {
    let text = env
        .system
        .environ()
        .into_iter()
        .map(|(name, value)| format!("export {name}={}\n", quote(&value)))
        .collect::<String>();
    output(env, &text)
}

/// Entry point for executing the `export` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    if args.is_empty() {
        env.exit_status = print_environment(env);
        return Continue(());
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for arg in &args {
        let result = match arg.split_once('=') {
            Some((name, value)) if is_name(name) => env.system.setenv(name, value),
            None if is_name(arg) => Ok(()),
            _ => {
                let message = format!("`{arg}`: not a valid assignment");
                _ = report_failure(env, NAME, message);
                exit_status = ExitStatus::FAILURE;
                continue;
            }
        };
        if let Err(errno) = result {
            _ = report_failure(env, NAME, format_args!("{arg}: {errno}"));
            exit_status = ExitStatus::FAILURE;
        }
    }
    env.exit_status = exit_status;
    Continue(())
}
