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

//! Expansion pass of the lexer
//!
//! This pass scans the raw line once and splits it into [`Fragments`]. Each
//! fragment is one of:
//!
//! - a quoted span (`'…'`, `"…"` or `` `…` ``), stored with its opening quote
//!   and without its closing quote,
//! - a backslash-escaped character, stored as a single-quoted span,
//! - a variable reference (`$NAME` or `$?`), stored with its `$`,
//! - a word run, after pathname expansion, or
//! - a run of metacharacters.
//!
//! Whitespace separates fragments and is not stored. A fragment is *glued* to
//! the previous one if no whitespace separates them; the classification pass
//! joins glued fragments into one word.

use super::LexError;
use super::is_name_char;
use super::op::is_metachar;
use crate::buffer::StringBuffer;

/// Kind of a fragment
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FragmentKind {
    /// `'…'` or a backslash escape
    SingleQuoted,
    /// `"…"`
    DoubleQuoted,
    /// `` `…` ``
    BacktickQuoted,
    /// `$NAME` or `$?`
    Variable,
    /// Unquoted word text
    Word,
    /// Run of metacharacters
    Meta,
}

/// Fragment returned by [`Fragments::iter`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fragment<'a> {
    /// Text of the fragment, including the opening quote or `$`
    pub text: &'a str,
    pub kind: FragmentKind,
    /// Whether the fragment directly follows the previous one
    pub glued: bool,
}

impl Fragment<'_> {
    /// Returns the text without the opening quote or `$`.
    #[must_use]
    pub fn body(&self) -> &str {
        match self.kind {
            FragmentKind::Word | FragmentKind::Meta => self.text,
            _ => self.text.get(1..).unwrap_or_default(),
        }
    }
}

/// Ordered list of fragments of one line
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fragments {
    texts: StringBuffer,
    attrs: Vec<(FragmentKind, bool)>,
}

impl Fragments {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment.
    pub fn push(&mut self, text: &str, kind: FragmentKind, glued: bool) {
        self.texts.push(text);
        self.attrs.push((kind, glued));
    }

    /// Returns the number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Tests whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Returns the fragments in order.
    pub fn iter(&self) -> impl Iterator<Item = Fragment<'_>> + '_ {
        self.texts
            .iter()
            .zip(&self.attrs)
            .map(|(text, &(kind, glued))| Fragment { text, kind, glued })
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

fn is_word_char(c: char) -> bool {
    !is_blank(c) && !is_quote(c) && !is_metachar(c) && c != '$' && c != '\\'
}

fn has_pattern_char(word: &str) -> bool {
    word.contains(['*', '?', '['])
}

/// Performs pathname expansion on a word run.
///
/// Returns the matching pathnames, or the word itself if it is not a pattern,
/// the pattern is invalid or nothing matches.
#[must_use]
pub fn glob_word(word: &str) -> Vec<String> {
    if !has_pattern_char(word) {
        return vec![word.to_owned()];
    }
    let paths = match glob::glob(word) {
        Ok(paths) => paths,
        Err(error) => {
            log::debug!("invalid pattern {word:?}: {error}");
            return vec![word.to_owned()];
        }
    };
    let matches: Vec<String> = paths
        .filter_map(|entry| entry.ok())
        .filter_map(|path| path.into_os_string().into_string().ok())
        .collect();
    if matches.is_empty() {
        vec![word.to_owned()]
    } else {
        matches
    }
}

/// Splits a line into fragments.
///
/// Fails if a quotation is not closed.
pub fn expand(line: &str) -> Result<Fragments, LexError> {
    let mut fragments = Fragments::new();
    let mut glued = false;
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        let position = line.len() - rest.len();

        if is_blank(c) {
            rest = rest.trim_start_matches(is_blank);
            glued = false;
            continue;
        }

        if c == '#' && !glued {
            break;
        }

        if is_quote(c) {
            let body = &rest[1..];
            let Some(end) = body.find(c) else {
                return Err(LexError::UnclosedQuote { quote: c, position });
            };
            let kind = match c {
                '\'' => FragmentKind::SingleQuoted,
                '"' => FragmentKind::DoubleQuoted,
                _ => FragmentKind::BacktickQuoted,
            };
            fragments.push(&rest[..1 + end], kind, glued);
            rest = &body[end + 1..];
            glued = true;
            continue;
        }

        if c == '\\' {
            let mut chars = rest[1..].chars();
            match chars.next() {
                Some(escaped) => {
                    let mut text = String::from('\'');
                    text.push(escaped);
                    fragments.push(&text, FragmentKind::SingleQuoted, glued);
                    rest = chars.as_str();
                }
                None => {
                    fragments.push("\\", FragmentKind::Word, glued);
                    rest = "";
                }
            }
            glued = true;
            continue;
        }

        if c == '$' {
            let after = &rest[1..];
            let len = if after.starts_with('?') {
                1
            } else {
                after.find(|c| !is_name_char(c)).unwrap_or(after.len())
            };
            if len == 0 {
                fragments.push("$", FragmentKind::Word, glued);
            } else {
                fragments.push(&rest[..1 + len], FragmentKind::Variable, glued);
            }
            rest = &after[len..];
            glued = true;
            continue;
        }

        if is_metachar(c) {
            let len = rest.find(|c| !is_metachar(c)).unwrap_or(rest.len());
            fragments.push(&rest[..len], FragmentKind::Meta, glued);
            rest = &rest[len..];
            // A comment may start right after an operator.
            glued = false;
            continue;
        }

        let len = rest.find(|c| !is_word_char(c)).unwrap_or(rest.len());
        let word = &rest[..len];
        for (index, expanded) in glob_word(word).iter().enumerate() {
            fragments.push(expanded, FragmentKind::Word, glued && index == 0);
        }
        rest = &rest[len..];
        glued = true;
    }

    Ok(fragments)
}
