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

//! Classification pass of the lexer
//!
//! This pass converts [fragments](super::expand::Fragments) into tokens.
//! Glued fragments are joined into one word. Single-quoted and
//! backtick-quoted fragments are taken literally; double-quoted fragments
//! and variable references are subject to variable substitution. Metacharacter
//! runs are [decomposed](super::op::decompose) into operators.

use super::Variables;
use super::expand::FragmentKind;
use super::expand::Fragments;
use super::is_name;
use super::is_name_char;
use super::op::decompose;
use crate::token::Token;
use crate::token::TokenFlags;

/// Returns the value of a variable reference body (`NAME` or `?`).
///
/// An unset variable expands to an empty string.
fn lookup<V: Variables + ?Sized>(name: &str, variables: &V) -> String {
    variables.get(name).unwrap_or_default()
}

/// Substitutes `$NAME` and `$?` in double-quoted text.
///
/// A `$` that does not start a reference is kept as is.
#[must_use]
pub fn substitute<V: Variables + ?Sized>(text: &str, variables: &V) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('$') {
        result.push_str(&rest[..index]);
        let after = &rest[index + 1..];
        let len = if after.starts_with('?') {
            1
        } else {
            after.find(|c| !is_name_char(c)).unwrap_or(after.len())
        };
        if len == 0 {
            result.push('$');
        } else {
            result.push_str(&lookup(&after[..len], variables));
        }
        rest = &after[len..];
    }
    result.push_str(rest);
    result
}

/// Word being assembled from glued fragments
#[derive(Debug)]
struct PendingWord {
    text: String,
    flags: TokenFlags,
    /// Whether every fragment so far was unquoted word text
    literal: bool,
    /// Whether every fragment so far was a variable reference
    variables_only: bool,
}

impl PendingWord {
    fn new() -> Self {
        PendingWord {
            text: String::new(),
            flags: TokenFlags::empty(),
            literal: true,
            variables_only: true,
        }
    }

    fn is_io_number_candidate(&self) -> bool {
        self.literal && !self.text.is_empty() && self.text.bytes().all(|b| b.is_ascii_digit())
    }

    fn into_token(mut self) -> Option<Token> {
        if self.variables_only && self.text.is_empty() {
            return None;
        }
        if self.literal {
            if !self.text.is_empty() && self.text.bytes().all(|b| b.is_ascii_digit()) {
                self.flags |= TokenFlags::IS_NUMBER;
            }
            if is_name(&self.text) {
                self.flags |= TokenFlags::IS_IDENTIFIER;
            }
        }
        Some(Token::word(self.text, self.flags))
    }
}

/// Converts fragments into tokens.
///
/// The result ends with an end-of-stream token. Metacharacters that do not
/// form an operator yield [`Error`](crate::token::TokenKind::Error) tokens.
#[must_use]
pub fn classify<V: Variables + ?Sized>(fragments: &Fragments, variables: &V) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(fragments.len() + 1);
    let mut pending: Option<PendingWord> = None;

    for fragment in fragments.iter() {
        if fragment.kind == FragmentKind::Meta {
            if let Some(word) = pending.take() {
                let redirecting = fragment.glued && fragment.text.starts_with(['<', '>']);
                let io_number = redirecting && word.is_io_number_candidate();
                if let Some(mut token) = word.into_token() {
                    if io_number {
                        token.flags |= TokenFlags::IO_NUMBER;
                    }
                    tokens.push(token);
                }
            }
            tokens.extend(decompose(fragment.text));
            continue;
        }

        if !fragment.glued {
            if let Some(word) = pending.take() {
                tokens.extend(word.into_token());
            }
        }
        let word = pending.get_or_insert_with(PendingWord::new);

        match fragment.kind {
            FragmentKind::SingleQuoted => {
                word.text.push_str(fragment.body());
                word.flags |= TokenFlags::SINGLE_QUOTED;
                word.literal = false;
                word.variables_only = false;
            }
            FragmentKind::BacktickQuoted => {
                word.text.push_str(fragment.body());
                word.flags |= TokenFlags::BACKTICK_QUOTED;
                word.literal = false;
                word.variables_only = false;
            }
            FragmentKind::DoubleQuoted => {
                word.text.push_str(&substitute(fragment.body(), variables));
                word.flags |= TokenFlags::DOUBLE_QUOTED;
                word.literal = false;
                word.variables_only = false;
            }
            FragmentKind::Variable => {
                word.text.push_str(&lookup(fragment.body(), variables));
                word.literal = false;
            }
            FragmentKind::Word => {
                word.text.push_str(fragment.text);
                word.variables_only = false;
            }
            FragmentKind::Meta => unreachable!(),
        }
    }

    if let Some(word) = pending {
        tokens.extend(word.into_token());
    }
    tokens.push(Token::end_of_stream());
    tokens
}

#[cfg(test)]
mod tests {
    use super::super::expand::expand;
    use super::*;
    use crate::token::TokenKind;
    use std::collections::HashMap;

    fn variables() -> HashMap<String, String> {
        HashMap::from([
            ("USER".to_string(), "alice".to_string()),
            ("EMPTY".to_string(), String::new()),
            ("?".to_string(), "3".to_string()),
        ])
    }

    fn tokens(line: &str) -> Vec<Token> {
        classify(&expand(line).unwrap(), &variables())
    }

    #[test]
    fn substitution_in_double_quotes() {
        let vars = variables();
        assert_eq!(substitute("hi $USER!", &vars), "hi alice!");
        assert_eq!(substitute("$USER$USER", &vars), "alicealice");
        assert_eq!(substitute("cost: $ 5", &vars), "cost: $ 5");
        assert_eq!(substitute("$NOPE.", &vars), ".");
        assert_eq!(substitute("status $?", &vars), "status 3");
    }

    #[test]
    fn quoted_words() {
        let tokens = tokens(r#"echo '$USER' "$USER" `$USER`"#);
        assert_eq!(tokens[1], Token::word("$USER", TokenFlags::SINGLE_QUOTED));
        assert_eq!(tokens[2], Token::word("alice", TokenFlags::DOUBLE_QUOTED));
        assert_eq!(tokens[3], Token::word("$USER", TokenFlags::BACKTICK_QUOTED));
        assert_eq!(tokens[4], Token::end_of_stream());
    }

    #[test]
    fn glued_fragments_form_one_word() {
        let tokens = tokens(r#"--name="$USER x"'!' pre$USER"#);
        assert_eq!(
            tokens[0],
            Token::word(
                "--name=alice x!",
                TokenFlags::DOUBLE_QUOTED | TokenFlags::SINGLE_QUOTED
            )
        );
        assert_eq!(tokens[1], Token::word("prealice", TokenFlags::empty()));
    }

    #[test]
    fn number_and_identifier_flags() {
        let tokens = tokens("123 abc_1 1a '12'");
        assert_eq!(tokens[0].flags, TokenFlags::IS_NUMBER);
        assert_eq!(tokens[1].flags, TokenFlags::IS_IDENTIFIER);
        assert_eq!(tokens[2].flags, TokenFlags::empty());
        assert_eq!(tokens[3].flags, TokenFlags::SINGLE_QUOTED);
    }

    #[test]
    fn io_number_requires_adjacent_redirection() {
        let tokens = tokens("cmd 2>err 2 >out 3|x");
        assert_eq!(tokens[1].text(), "2");
        assert!(tokens[1].flags.contains(TokenFlags::IO_NUMBER));
        assert_eq!(tokens[2].kind, TokenKind::Greater);
        assert_eq!(tokens[4].text(), "2");
        assert!(!tokens[4].flags.contains(TokenFlags::IO_NUMBER));
        assert_eq!(tokens[7].text(), "3");
        assert!(!tokens[7].flags.contains(TokenFlags::IO_NUMBER));
    }

    #[test]
    fn empty_variables_vanish_but_empty_quotes_stay() {
        let tokens = tokens(r#"a $EMPTY $UNSET "" '' $EMPTY"x""#);
        let texts: Vec<_> = tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Word)
            .map(Token::text)
            .collect();
        assert_eq!(texts, ["a", "", "", "x"]);
    }

    #[test]
    fn status_variable() {
        let tokens = tokens("echo $?");
        assert_eq!(tokens[1].text(), "3");
    }

    #[test]
    fn operators_have_no_text() {
        let tokens = tokens("a >> b");
        assert_eq!(tokens[1], Token::operator(TokenKind::GreaterGreater));
        assert_eq!(tokens.len(), 4);
    }
}
