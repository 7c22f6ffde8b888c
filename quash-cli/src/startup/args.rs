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

//! Command-line argument parser of the shell
//!
//! The [`parse`] function parses the command-line arguments and returns a
//! [`Parse`] that tells the shell what to do.

use thiserror::Error;

/// Where the shell reads commands from
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Source {
    /// Standard input
    #[default]
    Stdin,
    /// File
    File { path: String },
    /// Command string given with the `-c` option
    String(String),
}

/// Configuration of the shell process
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Run {
    pub source: Source,
    /// Whether the `-i` option was given
    pub interactive: bool,
}

/// Result of command-line argument parsing
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parse {
    /// Print the usage and exit
    Help,
    /// Print the version and exit
    Version,
    /// Run the shell
    Run(Run),
}

/// Error in command-line parsing
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The option is not supported.
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    /// The `-c` option is not followed by a command string.
    #[error("the -c option requires a command string")]
    MissingCommandString,

    /// More than one source of commands is given.
    #[error("unexpected operand `{0}`")]
    UnexpectedOperand(String),
}

/// Parses command-line arguments.
///
/// The first item of `args` is the name of the shell and is ignored.
pub fn parse<I>(args: I) -> Result<Parse, Error>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().skip(1);
    let mut run = Run::default();
    let mut operands = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Parse::Help),
            "-V" | "--version" => return Ok(Parse::Version),
            "-i" => run.interactive = true,
            "-c" => {
                let command = args.next().ok_or(Error::MissingCommandString)?;
                run.source = Source::String(command);
            }
            "--" => {
                operands.extend(args.by_ref());
                break;
            }
            // A lone hyphen stands for the standard input.
            "-" => (),
            option if option.starts_with('-') => {
                return Err(Error::UnknownOption(option.to_owned()));
            }
            _ => operands.push(arg),
        }
    }

    let mut operands = operands.into_iter();
    if run.source == Source::Stdin {
        if let Some(path) = operands.next() {
            run.source = Source::File { path };
        }
    }
    match operands.next() {
        Some(operand) => Err(Error::UnexpectedOperand(operand)),
        None => Ok(Parse::Run(run)),
    }
}
