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

//! Syntax of the quash shell.
//!
//! This crate turns one line of input into an abstract syntax tree in three
//! steps:
//!
//! 1. The [expansion pass](lex::expand) splits the raw line into fragments,
//!    performing pathname expansion (globbing) on unquoted word runs.
//! 2. The [classification pass](lex::classify) converts the fragments into
//!    [tokens](token::Token), substituting variables and splitting runs of
//!    metacharacters into operators.
//! 3. The [parser] combines the tokens into a [`Node`](syntax::Node) tree with
//!    a binding-power (Pratt) algorithm.
//!
//! [`parse_line`] performs all the steps at once.
//!
//! ```
//! use quash_syntax::parse_line;
//! use quash_syntax::syntax::Node;
//! use std::collections::HashMap;
//!
//! let vars = HashMap::from([("USER".to_string(), "alice".to_string())]);
//! let node = parse_line("echo $USER | wc -c", &vars).unwrap().unwrap();
//! assert!(matches!(node, Node::Pipe(_, _)));
//! assert_eq!(node.to_string(), "echo alice | wc -c");
//! ```

pub mod buffer;
pub mod lex;
pub mod parser;
pub mod syntax;
pub mod token;

use self::lex::LexError;
use self::lex::Variables;
use self::parser::Parser;
use self::parser::SyntaxError;
use self::syntax::Node;
use thiserror::Error;

/// Error that rejects an input line before execution
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The line could not be tokenized.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The tokens do not form a valid command line.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Tokenizes and parses a line.
///
/// Returns `Ok(None)` if the line contains no command (it is empty or only
/// has blanks and a comment).
pub fn parse_line<V: Variables + ?Sized>(line: &str, variables: &V) -> Result<Option<Node>, Error> {
    let tokens = lex::tokenize(line, variables)?;
    log::debug!("tokens: {tokens:?}");
    let node = Parser::new(&tokens).parse()?;
    log::debug!("parsed: {node:?}");
    Ok(node)
}
