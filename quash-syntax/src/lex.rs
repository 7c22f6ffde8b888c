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

//! Lexical analysis
//!
//! The lexer works in two passes. The [expansion pass](expand) scans the raw
//! line and produces an ordered list of [fragments](expand::Fragments):
//! quoted spans, word runs (after pathname expansion), variable references
//! and metacharacter runs. The [classification pass](classify) then turns the
//! fragments into [`Token`]s.
//!
//! [`tokenize`] runs both passes and rejects the line if either pass fails.
//! The resulting token stream always ends with exactly one
//! [`EndOfStream`](TokenKind::EndOfStream) token.

pub mod classify;
pub mod expand;
pub mod op;

use crate::token::Token;
use crate::token::TokenKind;
use std::collections::HashMap;
use thiserror::Error;

/// Error that rejects a line in the lexer
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LexError {
    /// A quotation is not closed by the end of the line.
    #[error("the {quote} quote starting at column {} is not closed", .position + 1)]
    UnclosedQuote {
        /// Opening quote character
        quote: char,
        /// Byte offset of the opening quote
        position: usize,
    },
    /// A run of metacharacters contains something that is not an operator.
    #[error("unrecognized operator `{0}`")]
    UnrecognizedOperator(String),
}

/// Source of variable values for substitution
pub trait Variables {
    /// Returns the value of the variable, or `None` if it is not set.
    fn get(&self, name: &str) -> Option<String>;
}

impl Variables for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl<V: Variables + ?Sized> Variables for &V {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// Variables of the current process environment
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HostVariables;

impl Variables for HostVariables {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Tests whether the character can appear in a variable name.
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tests whether the string is a valid variable name.
///
/// A name is a non-empty sequence of [name characters](is_name_char) that
/// does not start with a digit.
#[must_use]
pub fn is_name(s: &str) -> bool {
    match s.chars().next() {
        Some(c) if !c.is_ascii_digit() => s.chars().all(is_name_char),
        _ => false,
    }
}

/// Converts a line into tokens.
///
/// The result ends with an [`EndOfStream`](TokenKind::EndOfStream) token. If
/// the line contains an unclosed quote or a metacharacter sequence that is not
/// an operator, the whole line is rejected.
pub fn tokenize<V: Variables + ?Sized>(line: &str, variables: &V) -> Result<Vec<Token>, LexError> {
    let fragments = expand::expand(line)?;
    let tokens = classify::classify(&fragments, variables);
    match tokens.iter().find(|token| token.kind == TokenKind::Error) {
        Some(error) => Err(LexError::UnrecognizedOperator(error.text().to_owned())),
        None => Ok(tokens),
    }
}
