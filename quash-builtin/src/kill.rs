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

//! Kill built-in
//!
//! The kill built-in sends a signal to processes or jobs.
//!
//! # Synopsis
//!
//! ```sh
//! kill [-s SIGNAL | -SIGNAL] [--] TARGET...
//! kill SIGNAL TARGET...
//! kill -l [SIGNAL...]
//! ```
//!
//! A signal is a number or a name with or without the `SIG` prefix. The
//! default signal is `SIGTERM`. A target is a process ID or a
//! [job specifier](quash_env::job::id). When the first operand names a
//! signal and is followed by at least one target, it is taken as the signal.
//!
//! With `-l`, the built-in prints the names of all signals, or converts the
//! operands between signal names and numbers. A number greater than 128 is
//! taken as the exit status of a process killed by a signal.

use crate::common::{find_job, output, report_error, signal_job};
use itertools::Itertools as _;
use quash_env::Env;
use quash_env::job::Pid;
use quash_env::semantics::ExitStatus;
use quash_env::semantics::Result;
use quash_env::signal::{self, Signal, UnknownSignal};
use std::ops::ControlFlow::Continue;
use thiserror::Error;

const NAME: &str = "kill";

/// Parsed command line of the built-in
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Print signal names or numbers
    Print { signals: Vec<String> },
    /// Send a signal to targets
    Send { signal: Signal, targets: Vec<String> },
}

/// Error in the command line
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    UnknownSignal(#[from] UnknownSignal),
    #[error("-s: missing signal name")]
    MissingSignal,
    #[error("missing operand")]
    MissingOperand,
}

/// Parses the arguments to the built-in.
pub fn parse(args: Vec<String>) -> std::result::Result<Command, SyntaxError> {
    let mut args = args.into_iter().peekable();
    let mut signal = None;

    match args.peek().map(String::as_str) {
        Some("-l") => {
            args.next();
            let signals = args.collect();
            return Ok(Command::Print { signals });
        }
        Some("-s") => {
            args.next();
            let name = args.next().ok_or(SyntaxError::MissingSignal)?;
            signal = Some(signal::parse(&name)?);
        }
        Some(option) if option.len() > 1 && option.starts_with('-') && option != "--" => {
            signal = Some(signal::parse(&option[1..])?);
            args.next();
        }
        _ => (),
    }
    if args.peek().is_some_and(|arg| arg == "--") {
        args.next();
    }

    let mut targets = args.collect::<Vec<_>>();
    if signal.is_none() && targets.len() >= 2 {
        if let Ok(first) = signal::parse(&targets[0]) {
            signal = Some(first);
            targets.remove(0);
        }
    }
    if targets.is_empty() {
        return Err(SyntaxError::MissingOperand);
    }

    let signal = signal.unwrap_or(Signal::SIGTERM);
    Ok(Command::Send { signal, targets })
}

/// Converts an operand of `kill -l` between a signal name and number.
fn convert(operand: &str) -> std::result::Result<String, UnknownSignal> {
    match operand.parse::<i32>() {
        Ok(number) => {
            let number = if number > 128 { number - 128 } else { number };
            let signal =
                Signal::try_from(number).map_err(|_| UnknownSignal(operand.to_owned()))?;
            Ok(signal::short_name(signal).to_owned())
        }
        Err(_) => Ok((signal::parse(operand)? as i32).to_string()),
    }
}

fn print(env: &mut Env, signals: &[String]) -> ExitStatus {
    if signals.is_empty() {
        let text = signal::all()
            .into_iter()
            .map(|signal| format!("{}\n", signal::short_name(signal)))
            .join("");
        return output(env, &text);
    }

    let mut exit_status = ExitStatus::SUCCESS;
    let mut text = String::new();
    for operand in signals {
        match convert(operand) {
            Ok(converted) => {
                text.push_str(&converted);
                text.push('\n');
            }
            Err(error) => {
                env.print_error(format_args!("{NAME}: {error}"));
                exit_status = ExitStatus::FAILURE;
            }
        }
    }
    let print_status = output(env, &text);
    if print_status.is_successful() {
        exit_status
    } else {
        print_status
    }
}

/// Sends the signal to one target.
fn send(env: &mut Env, signal: Signal, target: &str) -> std::result::Result<(), String> {
    if target.starts_with('%') {
        let index = find_job(env, Some(target)).map_err(|error| error.to_string())?;
        signal_job(env, index, signal).map_err(|errno| format!("{target}: {errno}"))?;
        if signal == Signal::SIGCONT {
            env.jobs.resume(index);
        }
        return Ok(());
    }

    let pid = target
        .parse()
        .map_err(|_| format!("{target}: not a valid process ID or job"))?;
    env.system
        .kill(Pid::from_raw(pid), Some(signal))
        .map_err(|errno| format!("{target}: {errno}"))
}

/// Entry point for executing the `kill` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> Result {
    let command = match parse(args) {
        Ok(command) => command,
        Err(error) => return report_error(env, NAME, error),
    };

    env.exit_status = match command {
        Command::Print { signals } => print(env, &signals),
        Command::Send { signal, targets } => {
            log::debug!("sending {signal} to {targets:?}");
            let mut exit_status = ExitStatus::SUCCESS;
            for target in &targets {
                if let Err(message) = send(env, signal, target) {
                    env.print_error(format_args!("{NAME}: {message}"));
                    exit_status = ExitStatus::FAILURE;
                }
            }
            exit_status
        }
    };
    Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{add_job, args, dummy_env, stderr, stdout};
    use assert_matches::assert_matches;
    use quash_env::job::ProcessState;

    #[test]
    fn parsing_signal_forms() {
        let forms: [&[&str]; 6] = [
            &["-s", "KILL", "1"],
            &["-KILL", "1"],
            &["-9", "1"],
            &["-sigkill", "--", "1"],
            &["KILL", "1"],
            &["9", "1"],
        ];
        for form in forms {
            assert_eq!(
                parse(args(form)),
                Ok(Command::Send {
                    signal: Signal::SIGKILL,
                    targets: args(&["1"]),
                }),
                "{form:?}"
            );
        }
    }

    #[test]
    fn default_signal_is_term() {
        assert_eq!(
            parse(args(&["100", "200"])),
            Ok(Command::Send {
                signal: Signal::SIGTERM,
                targets: args(&["100", "200"]),
            })
        );
        assert_eq!(
            parse(args(&["--", "%1"])),
            Ok(Command::Send {
                signal: Signal::SIGTERM,
                targets: args(&["%1"]),
            })
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse(vec![]), Err(SyntaxError::MissingOperand));
        assert_eq!(parse(args(&["-9"])), Err(SyntaxError::MissingOperand));
        assert_eq!(parse(args(&["-s"])), Err(SyntaxError::MissingSignal));
        assert_matches!(parse(args(&["-FOO", "1"])), Err(SyntaxError::UnknownSignal(_)));
    }

    #[test]
    fn sending_to_process_and_job() {
        let (mut env, system) = dummy_env();
        add_job(&mut env, "a | b", &[10, 11]);
        assert_eq!(main(&mut env, args(&["-INT", "42", "%1"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(
            system.state.borrow().signals_sent,
            [
                (Pid::from_raw(42), Some(Signal::SIGINT)),
                (Pid::from_raw(10), Some(Signal::SIGINT)),
                (Pid::from_raw(11), Some(Signal::SIGINT)),
            ]
        );
    }

    #[test]
    fn continuing_job_marks_it_running() {
        let (mut env, _) = dummy_env();
        let index = add_job(&mut env, "vi", &[10]);
        env.jobs
            .update_status(Pid::from_raw(10), ProcessState::Stopped(Signal::SIGTSTP));
        assert_eq!(main(&mut env, args(&["-CONT", "%1"])), Continue(()));
        assert_eq!(env.jobs.get(index).unwrap().state(), ProcessState::Running);
    }

    #[test]
    fn bad_targets_are_reported() {
        let (mut env, system) = dummy_env();
        assert_eq!(main(&mut env, args(&["%4", "abc", "7"])), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(
            stderr(&system),
            "quash: kill: %4: no such job\n\
             quash: kill: abc: not a valid process ID or job\n"
        );
        assert_eq!(
            system.state.borrow().signals_sent,
            [(Pid::from_raw(7), Some(Signal::SIGTERM))]
        );
    }

    #[test]
    fn usage_error() {
        let (mut env, system) = dummy_env();
        assert_eq!(main(&mut env, vec![]), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_eq!(stderr(&system), "quash: kill: missing operand\n");
    }

    #[test]
    fn listing_all_signals() {
        let (mut env, system) = dummy_env();
        assert_eq!(main(&mut env, args(&["-l"])), Continue(()));
        let listed = stdout(&system);
        let lines = listed.lines().collect::<Vec<_>>();
        assert!(lines.contains(&"HUP"), "{listed}");
        assert!(lines.contains(&"KILL"), "{listed}");
        assert_eq!(lines.first(), Some(&"HUP"));
    }

    #[test]
    fn converting_signals() {
        let (mut env, system) = dummy_env();
        let result = main(&mut env, args(&["-l", "9", "TERM", "137", "NOPE"]));
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(stdout(&system), "KILL\n15\nKILL\n");
        assert_eq!(stderr(&system), "quash: kill: NOPE: invalid signal specification\n");
    }
}
