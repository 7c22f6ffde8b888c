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

//! Binding-power parser
//!
//! The [`Parser`] builds a [`Node`] tree from a token stream with a single
//! precedence-climbing routine, [`Parser::expression`]. Every token kind that
//! can continue an expression has a pair of left and right binding powers
//! (see [`binding_power`]). From the loosest to the tightest:
//!
//! | tokens | binding power |
//! |---|---|
//! | `;` `&` | (1, 2) |
//! | `&&` `\|\|` | (3, 4) |
//! | `\|` | (5, 6) |
//! | redirections | (7, 8) |
//! | words | (9, 10) |
//!
//! A word binds tighter than any operator, so adjacent words always extend
//! the current command. Equal binding powers make the binary operators
//! left-associative. A `;` or `&` terminates the and-or list before it, and
//! `&` makes only that list asynchronous.

use crate::syntax::Fd;
use crate::syntax::Node;
use crate::syntax::Redir;
use crate::syntax::RedirOp;
use crate::syntax::SimpleCommand;
use crate::syntax::Word;
use crate::token::Token;
use crate::token::TokenFlags;
use crate::token::TokenKind;
use thiserror::Error;

/// Types of syntax errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    /// A redirection operator is missing its operand.
    #[error("the `{0}` redirection is missing its operand")]
    MissingRedirOperand(TokenKind),
    /// A binary operator or `;` is not followed by a command.
    #[error("a command is missing after `{0}`")]
    MissingCommandAfter(TokenKind),
    /// An operator appears where a command should start.
    #[error("a command is missing before `{0}`")]
    MissingCommandBefore(TokenKind),
    /// A token appears where it is not allowed.
    #[error("unexpected token `{0}`")]
    UnexpectedToken(TokenKind),
    /// The file descriptor specified for a redirection cannot be used.
    #[error("file descriptor `{0}` is out of range")]
    FdOutOfRange(String),
    /// An explicit file descriptor is followed by `>&` and a non-number.
    #[error("`>&` after a file descriptor needs a file descriptor operand")]
    FdExpected,
    /// An I/O number precedes an operator that does not take one.
    #[error("`{0}` cannot redirect a specific file descriptor")]
    IoNumberNotAllowed(TokenKind),
}

/// Returns the left and right binding powers of a token kind.
///
/// Returns `None` for kinds that cannot continue an expression.
#[must_use]
pub const fn binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    match kind {
        Semicolon | And => Some((1, 2)),
        AndAnd | BarBar => Some((3, 4)),
        Bar => Some((5, 6)),
        Greater | Less | GreaterGreater | LessGreater | GreaterAnd | GreaterGreaterAnd => {
            Some((7, 8))
        }
        Word => Some((9, 10)),
        None | EndOfStream | Error => Option::None,
    }
}

static NONE_TOKEN: Token = Token {
    text: None,
    kind: TokenKind::None,
    flags: TokenFlags::empty(),
};

/// Parser over a token stream
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser that reads the tokens from the beginning.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, index: 0 }
    }

    /// Returns the current token without consuming it.
    ///
    /// Past the end of the stream, a [`TokenKind::None`] token is returned.
    #[must_use]
    pub fn peek(&self) -> &'a Token {
        self.tokens.get(self.index).unwrap_or(&NONE_TOKEN)
    }

    /// Consumes the current token.
    pub fn take(&mut self) -> &'a Token {
        let token = self.peek();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EndOfStream | TokenKind::None)
    }

    /// Parses the whole token stream.
    ///
    /// Returns `Ok(None)` if the stream contains no command.
    pub fn parse(&mut self) -> Result<Option<Node>, SyntaxError> {
        if self.at_end() {
            return Ok(None);
        }
        let node = self.expression(0)?;
        if self.at_end() {
            Ok(Some(node))
        } else {
            Err(SyntaxError::UnexpectedToken(self.peek().kind))
        }
    }

    /// Parses the operand of a binary operator.
    fn operand(&mut self, operator: TokenKind, min_bp: u8) -> Result<Node, SyntaxError> {
        let kind = self.peek().kind;
        if kind == TokenKind::Word || kind.is_redirection() {
            self.expression(min_bp)
        } else {
            Err(SyntaxError::MissingCommandAfter(operator))
        }
    }

    /// Parses an expression whose operators bind at least as tight as
    /// `min_bp`.
    pub fn expression(&mut self, min_bp: u8) -> Result<Node, SyntaxError> {
        let first = self.peek();
        let mut lhs = match first.kind {
            TokenKind::Word => {
                self.take();
                Node::Command(SimpleCommand {
                    words: vec![word(first)],
                    redirs: vec![],
                })
            }
            kind if kind.is_redirection() => Node::Command(SimpleCommand::default()),
            kind if kind.is_operator() => return Err(SyntaxError::MissingCommandBefore(kind)),
            kind => return Err(SyntaxError::UnexpectedToken(kind)),
        };

        loop {
            let kind = self.peek().kind;
            if self.at_end() {
                break;
            }
            let Some((left_bp, right_bp)) = binding_power(kind) else {
                return Err(SyntaxError::UnexpectedToken(kind));
            };
            if left_bp < min_bp {
                break;
            }

            match kind {
                TokenKind::Word => {
                    let token = self.take();
                    command_mut(&mut lhs, kind)?.words.push(word(token));
                }
                _ if kind.is_redirection() => {
                    self.take();
                    let command = command_mut(&mut lhs, kind)?;
                    let redir = redirection(command, kind, self.take())?;
                    command.redirs.push(redir);
                }
                TokenKind::Bar => {
                    self.take();
                    let rhs = self.operand(kind, right_bp)?;
                    lhs = Node::Pipe(Box::new(lhs), Box::new(rhs));
                }
                TokenKind::AndAnd => {
                    self.take();
                    let rhs = self.operand(kind, right_bp)?;
                    lhs = Node::And(Box::new(lhs), Box::new(rhs));
                }
                TokenKind::BarBar => {
                    self.take();
                    let rhs = self.operand(kind, right_bp)?;
                    lhs = Node::Or(Box::new(lhs), Box::new(rhs));
                }
                TokenKind::And | TokenKind::Semicolon => {
                    self.take();
                    if kind == TokenKind::And {
                        lhs = background_last_item(lhs);
                    }
                    if !self.at_end() {
                        let rhs = self.expression(right_bp)?;
                        lhs = Node::Sequence(Box::new(lhs), Box::new(rhs));
                    }
                }
                _ => return Err(SyntaxError::UnexpectedToken(kind)),
            }
        }

        Ok(lhs)
    }
}

/// Applies `&` to the and-or list that follows the last `;` or `&`.
///
/// Sequences are left-associative, so that list is the right-hand side of
/// the outermost sequence, if any.
fn background_last_item(node: Node) -> Node {
    match node {
        Node::Sequence(first, last) => Node::Sequence(first, Box::new(Node::Background(last))),
        item => Node::Background(Box::new(item)),
    }
}

fn word(token: &Token) -> Word {
    Word {
        value: token.text().to_owned(),
        flags: token.flags,
    }
}

fn command_mut(node: &mut Node, kind: TokenKind) -> Result<&mut SimpleCommand, SyntaxError> {
    match node {
        Node::Command(command) => Ok(command),
        _ => Err(SyntaxError::UnexpectedToken(kind)),
    }
}

/// Builds a redirection from the operator and its operand.
///
/// If the last word of the command is an I/O number, it is removed from the
/// command and becomes the redirected file descriptor.
fn redirection(
    command: &mut SimpleCommand,
    operator: TokenKind,
    operand: &Token,
) -> Result<Redir, SyntaxError> {
    if operand.kind != TokenKind::Word {
        return Err(SyntaxError::MissingRedirOperand(operator));
    }

    let io_number = command
        .words
        .last()
        .is_some_and(|last| last.flags.contains(TokenFlags::IO_NUMBER));
    let fd = match io_number.then(|| command.words.pop()).flatten() {
        Some(number) => Some(
            number
                .value
                .parse()
                .map(Fd)
                .map_err(|_| SyntaxError::FdOutOfRange(number.value))?,
        ),
        None => None,
    };

    let target = word(operand);
    let op = match operator {
        TokenKind::Less => RedirOp::FileIn,
        TokenKind::Greater => RedirOp::FileOut,
        TokenKind::GreaterGreater => RedirOp::FileAppend,
        TokenKind::LessGreater => RedirOp::FileInOut,
        TokenKind::GreaterAnd if target.flags.contains(TokenFlags::IS_NUMBER) => {
            if target.to_fd().is_none() {
                return Err(SyntaxError::FdOutOfRange(target.value));
            }
            RedirOp::FdDup
        }
        TokenKind::GreaterAnd if fd.is_some() => return Err(SyntaxError::FdExpected),
        TokenKind::GreaterAnd => RedirOp::FileOutAll,
        TokenKind::GreaterGreaterAnd if fd.is_some() => {
            return Err(SyntaxError::IoNumberNotAllowed(operator));
        }
        TokenKind::GreaterGreaterAnd => RedirOp::FileAppendAll,
        _ => return Err(SyntaxError::UnexpectedToken(operator)),
    };
    Ok(Redir { fd, op, target })
}
