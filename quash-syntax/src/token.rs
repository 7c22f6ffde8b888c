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

//! Tokens produced by the lexer.

use bitflags::bitflags;
use std::fmt;

/// Token kind
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// Placeholder returned when peeking past the end of a token stream.
    ///
    /// The lexer never produces this kind.
    None,
    /// End of the line
    EndOfStream,
    /// Metacharacter sequence that does not form an operator
    Error,
    /// Command name, argument, or redirection target
    Word,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>>`
    GreaterGreater,
    /// `<>`
    LessGreater,
    /// `>&`
    GreaterAnd,
    /// `>>&`
    GreaterGreaterAnd,
    /// `|`
    Bar,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `||`
    BarBar,
    /// `;`
    Semicolon,
}

impl TokenKind {
    /// Tests whether this kind is a redirection operator.
    #[must_use]
    pub const fn is_redirection(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Greater | Less | GreaterGreater | LessGreater | GreaterAnd | GreaterGreaterAnd
        )
    }

    /// Tests whether this kind is an operator.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        use TokenKind::*;
        self.is_redirection() || matches!(self, Bar | And | AndAnd | BarBar | Semicolon)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match self {
            None => f.write_str("<none>"),
            EndOfStream => f.write_str("<end of line>"),
            Error => f.write_str("<error>"),
            Word => f.write_str("<word>"),
            Greater => f.write_str(">"),
            Less => f.write_str("<"),
            GreaterGreater => f.write_str(">>"),
            LessGreater => f.write_str("<>"),
            GreaterAnd => f.write_str(">&"),
            GreaterGreaterAnd => f.write_str(">>&"),
            Bar => f.write_str("|"),
            And => f.write_str("&"),
            AndAnd => f.write_str("&&"),
            BarBar => f.write_str("||"),
            Semicolon => f.write_str(";"),
        }
    }
}

bitflags! {
    /// Attributes of a token
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct TokenFlags: u8 {
        /// The word consists of decimal digits only.
        const IS_NUMBER = 1 << 0;
        /// The word contains text quoted with `'` or a backslash escape.
        const SINGLE_QUOTED = 1 << 1;
        /// The word contains text quoted with `"`.
        const DOUBLE_QUOTED = 1 << 2;
        /// The word contains text quoted with `` ` ``.
        const BACKTICK_QUOTED = 1 << 3;
        /// The word is a valid variable name.
        const IS_IDENTIFIER = 1 << 4;
        /// The token is an operator.
        const IS_OPERATOR = 1 << 5;
        /// The number word is immediately followed by a redirection operator
        /// and names the file descriptor it redirects.
        const IO_NUMBER = 1 << 6;
    }
}

impl TokenFlags {
    /// Union of the quoting flags
    pub const QUOTED: Self = Self::SINGLE_QUOTED
        .union(Self::DOUBLE_QUOTED)
        .union(Self::BACKTICK_QUOTED);
}

/// Token
///
/// Word tokens own their text. Operator tokens have no text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub text: Option<String>,
    pub kind: TokenKind,
    pub flags: TokenFlags,
}

impl Token {
    /// Creates a word token.
    #[must_use]
    pub fn word<S: Into<String>>(text: S, flags: TokenFlags) -> Self {
        Token {
            text: Some(text.into()),
            kind: TokenKind::Word,
            flags,
        }
    }

    /// Creates an operator token.
    #[must_use]
    pub fn operator(kind: TokenKind) -> Self {
        debug_assert!(kind.is_operator(), "{kind:?}");
        Token {
            text: None,
            kind,
            flags: TokenFlags::IS_OPERATOR,
        }
    }

    /// Creates an end-of-stream token.
    #[must_use]
    pub const fn end_of_stream() -> Self {
        Token {
            text: None,
            kind: TokenKind::EndOfStream,
            flags: TokenFlags::empty(),
        }
    }

    /// Returns the text of the token, or an empty string if it has none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "({:?}:{text:?})", self.kind),
            None => write!(f, "({:?})", self.kind),
        }
    }
}
