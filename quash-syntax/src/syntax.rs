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

//! Abstract syntax tree
//!
//! A parsed line is a [`Node`] tree. Leaves are [`SimpleCommand`]s, each
//! holding the words of one command and the redirections applied to it.
//! Inner nodes combine commands into pipelines, and/or lists, background
//! jobs and sequences.
//!
//! Every node implements [`Display`](std::fmt::Display), which produces a
//! normalized text of the command line. The text is used as the name of jobs.

use crate::token::TokenFlags;
use std::fmt;
use std::os::unix::io::RawFd;

/// File descriptor
///
/// This is the `newtype` pattern applied to [`RawFd`], which is merely a type
/// alias.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub RawFd);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

impl From<RawFd> for Fd {
    fn from(raw_fd: RawFd) -> Fd {
        Fd(raw_fd)
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Word after expansion and quote removal
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Word {
    pub value: String,
    /// Flags of the token the word was made from
    pub flags: TokenFlags,
}

impl Word {
    /// Creates a word without flags.
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Word {
            value: value.into(),
            flags: TokenFlags::empty(),
        }
    }

    /// Parses the word as a file descriptor.
    ///
    /// Returns `None` unless the word is an unquoted decimal number that fits
    /// in a [`RawFd`].
    #[must_use]
    pub fn to_fd(&self) -> Option<Fd> {
        if !self.flags.contains(TokenFlags::IS_NUMBER) {
            return None;
        }
        self.value.parse().ok().map(Fd)
    }
}

impl From<&str> for Word {
    fn from(value: &str) -> Self {
        Word::new(value)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Redirection operator
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RedirOp {
    /// `<` (open a file for input)
    FileIn,
    /// `>` (open a file for output, truncating it)
    FileOut,
    /// `>>` (open a file for output, appending to it)
    FileAppend,
    /// `<>` (open a file for input and output)
    FileInOut,
    /// `>&` with a numeric operand (duplicate a file descriptor)
    FdDup,
    /// `>&` with a file operand (send standard output and error to a file)
    FileOutAll,
    /// `>>&` (append standard output and error to a file)
    FileAppendAll,
}

impl RedirOp {
    /// Returns the file descriptor redirected when no I/O number is given.
    #[must_use]
    pub const fn default_fd(self) -> Fd {
        use RedirOp::*;
        match self {
            FileIn | FileInOut => Fd::STDIN,
            FileOut | FileAppend | FdDup | FileOutAll | FileAppendAll => Fd::STDOUT,
        }
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RedirOp::*;
        f.write_str(match self {
            FileIn => "<",
            FileOut => ">",
            FileAppend => ">>",
            FileInOut => "<>",
            FdDup | FileOutAll => ">&",
            FileAppendAll => ">>&",
        })
    }
}

/// Redirection
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Redir {
    /// File descriptor given as an I/O number
    pub fd: Option<Fd>,
    pub op: RedirOp,
    /// Pathname or, for [`RedirOp::FdDup`], file descriptor number
    pub target: Word,
}

impl Redir {
    /// Computes the file descriptor that is modified by this redirection.
    ///
    /// If `self.fd` is `Some(_)`, the value is returned intact. Otherwise, the
    /// default file descriptor of the operator is returned.
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        self.fd.unwrap_or_else(|| self.op.default_fd())
    }
}

impl fmt::Display for Redir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{fd}")?;
        }
        write!(f, "{}{}", self.op, self.target)
    }
}

/// Command that is executed as a single process or builtin
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SimpleCommand {
    /// Command name and arguments
    pub words: Vec<Word>,
    /// Redirections in the order of appearance
    pub redirs: Vec<Redir>,
}

impl SimpleCommand {
    /// Returns true if the command has neither words nor redirections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.redirs.is_empty()
    }

    /// Returns the word values as an argument vector.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        self.words.iter().map(|word| word.value.clone()).collect()
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.words.iter().map(|word| word as &dyn fmt::Display);
        let redirs = self.redirs.iter().map(|redir| redir as &dyn fmt::Display);
        for (index, item) in words.chain(redirs).enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            item.fmt(f)?;
        }
        Ok(())
    }
}

/// Node of the syntax tree
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Node {
    /// Simple command
    Command(SimpleCommand),
    /// `left | right`
    Pipe(Box<Node>, Box<Node>),
    /// `left && right`
    And(Box<Node>, Box<Node>),
    /// `left || right`
    Or(Box<Node>, Box<Node>),
    /// `node &`
    Background(Box<Node>),
    /// `left ; right`, or `left & right` if `left` is a background node
    Sequence(Box<Node>, Box<Node>),
}

impl Node {
    /// Returns the pipeline stages from left to right.
    ///
    /// A node that is not a pipe is a pipeline of one stage.
    #[must_use]
    pub fn pipeline_stages(&self) -> Vec<&Node> {
        let mut stages = Vec::new();
        let mut node = self;
        while let Node::Pipe(left, right) = node {
            stages.push(&**right);
            node = left;
        }
        stages.push(node);
        stages.reverse();
        stages
    }
}

impl From<SimpleCommand> for Node {
    fn from(command: SimpleCommand) -> Self {
        Node::Command(command)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Command(command) => command.fmt(f),
            Node::Pipe(left, right) => write!(f, "{left} | {right}"),
            Node::And(left, right) => write!(f, "{left} && {right}"),
            Node::Or(left, right) => write!(f, "{left} || {right}"),
            Node::Background(node) => write!(f, "{node} &"),
            Node::Sequence(left, right) => match **left {
                Node::Background(_) => write!(f, "{left} {right}"),
                _ => write!(f, "{left}; {right}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(words: &[&str]) -> Node {
        Node::Command(SimpleCommand {
            words: words.iter().copied().map(Word::from).collect(),
            redirs: vec![],
        })
    }

    #[test]
    fn word_to_fd() {
        let mut word = Word::new("12");
        assert_eq!(word.to_fd(), None);
        word.flags = TokenFlags::IS_NUMBER;
        assert_eq!(word.to_fd(), Some(Fd(12)));
        word.value = "99999999999999".to_string();
        assert_eq!(word.to_fd(), None);
    }

    #[test]
    fn redir_default_fds() {
        let redir = Redir {
            fd: None,
            op: RedirOp::FileInOut,
            target: Word::new("f"),
        };
        assert_eq!(redir.fd_or_default(), Fd::STDIN);
        let redir = Redir {
            fd: Some(Fd(2)),
            op: RedirOp::FileOut,
            target: Word::new("f"),
        };
        assert_eq!(redir.fd_or_default(), Fd::STDERR);
        assert_eq!(redir.to_string(), "2>f");
    }

    #[test]
    fn simple_command_display() {
        let command = SimpleCommand {
            words: vec![Word::new("cat")],
            redirs: vec![
                Redir {
                    fd: None,
                    op: RedirOp::FileIn,
                    target: Word::new("in"),
                },
                Redir {
                    fd: Some(Fd(2)),
                    op: RedirOp::FdDup,
                    target: Word::new("1"),
                },
            ],
        };
        assert_eq!(command.to_string(), "cat <in 2>&1");
        assert_eq!(command.argv(), ["cat"]);
    }

    #[test]
    fn node_display() {
        let pipe = Node::Pipe(Box::new(command(&["a"])), Box::new(command(&["b", "c"])));
        assert_eq!(pipe.to_string(), "a | b c");
        let background = Node::Background(Box::new(pipe));
        let sequence = Node::Sequence(Box::new(background), Box::new(command(&["d"])));
        assert_eq!(sequence.to_string(), "a | b c & d");
        let and = Node::And(Box::new(command(&["x"])), Box::new(command(&["y"])));
        let sequence = Node::Sequence(Box::new(and), Box::new(command(&["z"])));
        assert_eq!(sequence.to_string(), "x && y; z");
    }

    #[test]
    fn pipeline_stages_are_flattened() {
        let node = Node::Pipe(
            Box::new(Node::Pipe(
                Box::new(command(&["a"])),
                Box::new(command(&["b"])),
            )),
            Box::new(command(&["c"])),
        );
        let stages: Vec<String> = node
            .pipeline_stages()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(stages, ["a", "b", "c"]);
        assert_eq!(command(&["x"]).pipeline_stages().len(), 1);
    }
}
