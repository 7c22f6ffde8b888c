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

//! This is an internal library crate for the quash shell. Currently, you
//! should not use this crate as a library in other programs.
//!
//! The [`main`] function parses the command line, prepares the [`Env`] with
//! the built-ins of `quash-builtin`, and runs the read-eval loop of
//! `quash-semantics` until the input ends or the shell is told to exit.

pub mod startup;

use self::startup::args::{Parse, Run};
use self::startup::input::prepare_input;
use quash_builtin::common::output;
use quash_env::Env;
use quash_env::semantics::ExitStatus;
use quash_env::signal::Signal;
use quash_env::system::SignalHandling;
use quash_env::system::real::RealSystem;
use quash_semantics::read_eval_loop;

const HELP: &str = "\
Usage: quash [-i] [FILE]
       quash [-i] -c COMMAND
       quash -h | -V

Options:
  -c COMMAND     run COMMAND and exit
  -i             force interactive mode
  -h, --help     print this help and exit
  -V, --version  print the version and exit
";

fn print_version(env: &mut Env) {
    let version = env!("CARGO_PKG_VERSION");
    env.exit_status = output(env, &format!("quash {version}\n"));
}

fn print_help(env: &mut Env) {
    env.exit_status = output(env, HELP);
}

/// Sets up the shell according to the command line and runs the commands.
fn run_as_shell_process(env: &mut Env, run: Run) {
    env.interactive = run.interactive || startup::auto_interactive(&*env.system, &run);
    if let Err(errno) = env.init_signals() {
        log::warn!("cannot initialize signal handling: {errno}");
    }
    if env.interactive {
        if let Err(errno) = env.init_job_control() {
            log::warn!("job control disabled: {errno}");
        }
    }

    let mut input = match prepare_input(&run.source, env.interactive) {
        Ok(input) => input,
        Err(error) => {
            env.print_error(&error);
            env.exit_status = error.exit_status();
            return;
        }
    };

    let result = read_eval_loop(env, &mut *input);
    env.apply_result(result);
}

/// Entry point of the shell
pub fn main() -> ! {
    startup::logging::init();

    // SAFETY: This is the only instance of RealSystem we create in the whole
    // process.
    let system = unsafe { RealSystem::new() };
    let mut env = Env::with_system(Box::new(system));
    env.builtins.extend(quash_builtin::BUILTINS.iter().copied());

    // Rust sets SIGPIPE to SIG_IGN, which would be inherited by commands.
    _ = env.system.sigaction(Signal::SIGPIPE, SignalHandling::Default);

    match startup::args::parse(std::env::args()) {
        Ok(Parse::Help) => print_help(&mut env),
        Ok(Parse::Version) => print_version(&mut env),
        Ok(Parse::Run(run)) => run_as_shell_process(&mut env, run),
        Err(error) => {
            env.print_error(&error);
            env.exit_status = ExitStatus::ERROR;
        }
    }

    log::debug!("exiting with {}", env.exit_status);
    std::process::exit(env.exit_status.0)
}
