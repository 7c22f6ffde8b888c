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

//! Preparing the input for the read-eval loop
//!
//! The [`prepare_input`] function chooses a [`LineSource`] for the
//! [`Source`] given on the command line:
//!
//! - An interactive shell reading a terminal edits lines with `rustyline`
//!   ([`Editor`]).
//! - Otherwise, the standard input is read without buffering
//!   ([`StdinLines`]) so that commands started by the shell can read the
//!   rest of it.
//! - A script file and a command string are read into memory at once
//!   ([`Memory`]).

use super::args::Source;
use quash_env::semantics::ExitStatus;
use quash_semantics::LineSource;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{ErrorKind, IsTerminal as _, Read as _, Write as _};
use std::os::fd::AsFd as _;
use thiserror::Error;

/// Error returned by [`prepare_input`]
#[derive(Debug, Error)]
pub enum PrepareInputError {
    #[error("cannot open script file '{path}': {error}")]
    File { path: String, error: std::io::Error },
    #[error("cannot read the standard input: {0}")]
    Stdin(std::io::Error),
}

impl PrepareInputError {
    /// Returns the exit status of the shell that failed to start.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            PrepareInputError::File { error, .. } if error.kind() == ErrorKind::NotFound => {
                ExitStatus::NOT_FOUND
            }
            _ => ExitStatus::NOEXEC,
        }
    }
}

/// Line editor for interactive use
pub struct Editor(DefaultEditor);

impl Editor {
    pub fn new() -> rustyline::Result<Self> {
        DefaultEditor::new().map(Editor)
    }
}

impl LineSource for Editor {
    fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        match self.0.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(error) = self.0.add_history_entry(line.as_str()) {
                        log::debug!("cannot add history entry: {error}");
                    }
                }
                Ok(Some(line))
            }
            // Ctrl-C discards the line being edited.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(error)) => Err(error),
            Err(error) => Err(std::io::Error::other(error.to_string())),
        }
    }
}

/// Unbuffered reader of the standard input
///
/// Bytes are read one at a time so that no input after the current line is
/// consumed.
#[derive(Debug)]
pub struct StdinLines {
    file: File,
}

impl StdinLines {
    /// Creates a reader of a duplicate of the standard input.
    pub fn new() -> std::io::Result<Self> {
        let fd = std::io::stdin().as_fd().try_clone_to_owned()?;
        Ok(StdinLines {
            file: File::from(fd),
        })
    }
}

impl LineSource for StdinLines {
    fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        if !prompt.is_empty() {
            let mut stderr = std::io::stderr();
            stderr.write_all(prompt.as_bytes())?;
            stderr.flush()?;
        }

        let mut line = Vec::new();
        let mut byte = [0; 1];
        loop {
            match self.file.read(&mut byte) {
                Ok(0) if line.is_empty() => return Ok(None),
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => line.push(byte[0]),
                Err(error) if error.kind() == ErrorKind::Interrupted => (),
                Err(error) => return Err(error),
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

/// Lines held in memory
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Memory {
    lines: VecDeque<String>,
}

impl Memory {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let lines = text.lines().map(str::to_owned).collect();
        Memory { lines }
    }
}

impl LineSource for Memory {
    fn next_line(&mut self, _prompt: &str) -> std::io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Prepares the line source for the shell.
pub fn prepare_input(
    source: &Source,
    interactive: bool,
) -> Result<Box<dyn LineSource>, PrepareInputError> {
    match source {
        Source::Stdin => {
            if interactive && std::io::stdin().is_terminal() {
                match Editor::new() {
                    Ok(editor) => return Ok(Box::new(editor)),
                    Err(error) => log::warn!("line editing disabled: {error}"),
                }
            }
            let lines = StdinLines::new().map_err(PrepareInputError::Stdin)?;
            Ok(Box::new(lines))
        }

        Source::File { path } => {
            let text = std::fs::read_to_string(path).map_err(|error| PrepareInputError::File {
                path: path.clone(),
                error,
            })?;
            Ok(Box::new(Memory::new(&text)))
        }

        Source::String(command) => Ok(Box::new(Memory::new(command))),
    }
}
