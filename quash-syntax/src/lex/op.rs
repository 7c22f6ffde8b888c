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

//! Decomposition of metacharacter runs into operators

use crate::token::Token;
use crate::token::TokenKind;

/// Trie data structure that defines a set of operator tokens.
///
/// This struct represents a node of the trie. A node is a sorted array of
/// [`Edge`]s.
#[derive(Clone, Copy, Debug)]
pub struct Trie(&'static [Edge]);

/// Edge of a [`Trie`]
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    /// Character value of this edge
    pub key: char,
    /// Operator delimited after taking this edge if there are no longer
    /// matches
    pub value: Option<TokenKind>,
    /// Sub-trie of the operators that have the common prefix
    pub next: Trie,
}

impl Trie {
    /// Tests if this trie is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finds an edge for the given key.
    #[must_use]
    pub fn edge(&self, key: char) -> Option<&Edge> {
        self.0
            .binary_search_by_key(&key, |edge| edge.key)
            .ok()
            .map(|i| &self.0[i])
    }

    /// Finds the longest operator that is a prefix of `s`.
    ///
    /// Returns the operator and its length in bytes.
    #[must_use]
    pub fn longest_match(&self, s: &str) -> Option<(TokenKind, usize)> {
        let mut trie = *self;
        let mut result = None;
        for (index, c) in s.char_indices() {
            let Some(edge) = trie.edge(c) else { break };
            if let Some(kind) = edge.value {
                result = Some((kind, index + c.len_utf8()));
            }
            trie = edge.next;
        }
        result
    }
}

/// Trie containing all the operators
pub const OPERATORS: Trie = Trie(&[
    Edge {
        key: '&',
        value: Some(TokenKind::And),
        next: AND,
    },
    Edge {
        key: ';',
        value: Some(TokenKind::Semicolon),
        next: NONE,
    },
    Edge {
        key: '<',
        value: Some(TokenKind::Less),
        next: LESS,
    },
    Edge {
        key: '>',
        value: Some(TokenKind::Greater),
        next: GREATER,
    },
    Edge {
        key: '|',
        value: Some(TokenKind::Bar),
        next: BAR,
    },
]);

const AND: Trie = Trie(&[Edge {
    key: '&',
    value: Some(TokenKind::AndAnd),
    next: NONE,
}]);

const LESS: Trie = Trie(&[Edge {
    key: '>',
    value: Some(TokenKind::LessGreater),
    next: NONE,
}]);

const GREATER: Trie = Trie(&[
    Edge {
        key: '&',
        value: Some(TokenKind::GreaterAnd),
        next: NONE,
    },
    Edge {
        key: '>',
        value: Some(TokenKind::GreaterGreater),
        next: GREATER_GREATER,
    },
]);

const GREATER_GREATER: Trie = Trie(&[Edge {
    key: '&',
    value: Some(TokenKind::GreaterGreaterAnd),
    next: NONE,
}]);

const BAR: Trie = Trie(&[Edge {
    key: '|',
    value: Some(TokenKind::BarBar),
    next: NONE,
}]);

const NONE: Trie = Trie(&[]);

/// Tests whether the character is a metacharacter.
#[must_use]
pub fn is_metachar(c: char) -> bool {
    OPERATORS.edge(c).is_some()
}

/// Splits a metacharacter run into operator tokens.
///
/// At each position the longest matching operator is taken. A character that
/// does not start any operator produces an [`Error`](TokenKind::Error) token
/// carrying the rest of the run, which ends the decomposition.
#[must_use]
pub fn decompose(mut run: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    while !run.is_empty() {
        match OPERATORS.longest_match(run) {
            Some((kind, len)) => {
                tokens.push(Token::operator(kind));
                run = &run[len..];
            }
            None => {
                tokens.push(Token {
                    text: Some(run.to_owned()),
                    kind: TokenKind::Error,
                    flags: Default::default(),
                });
                break;
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(run: &str) -> Vec<TokenKind> {
        decompose(run).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn edges_are_sorted() {
        fn check(trie: Trie) {
            assert!(trie.0.windows(2).all(|pair| pair[0].key < pair[1].key));
            trie.0.iter().for_each(|edge| check(edge.next));
        }
        check(OPERATORS);
    }

    #[test]
    fn longest_match_prefers_longer_operators() {
        assert_eq!(
            OPERATORS.longest_match(">>&x"),
            Some((TokenKind::GreaterGreaterAnd, 3))
        );
        assert_eq!(
            OPERATORS.longest_match(">>"),
            Some((TokenKind::GreaterGreater, 2))
        );
        assert_eq!(OPERATORS.longest_match(">|"), Some((TokenKind::Greater, 1)));
        assert_eq!(OPERATORS.longest_match("x"), None);
    }

    #[test]
    fn decompose_runs() {
        use TokenKind::*;
        assert_eq!(kinds("|"), [Bar]);
        assert_eq!(kinds("||"), [BarBar]);
        assert_eq!(kinds("|||"), [BarBar, Bar]);
        assert_eq!(kinds("&&&"), [AndAnd, And]);
        assert_eq!(kinds("<>"), [LessGreater]);
        assert_eq!(kinds("<<"), [Less, Less]);
        assert_eq!(kinds(">&"), [GreaterAnd]);
        assert_eq!(kinds(">>&"), [GreaterGreaterAnd]);
        assert_eq!(kinds(">>>"), [GreaterGreater, Greater]);
        assert_eq!(kinds("&;"), [And, Semicolon]);
    }

    #[test]
    fn decompose_rejects_non_operators() {
        let tokens = decompose("|x");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].text(), "x");
    }
}
