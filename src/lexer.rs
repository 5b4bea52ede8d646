//! Lexer
//!
//! The lexer converts source text into a stream of positioned tokens,
//! terminated by a single end-of-input token. It is built on the `logos`
//! patterns declared in [`crate::token`] and adds position bookkeeping,
//! literal text capture, and the fatal-versus-recoverable error split:
//! a literal that cannot be closed aborts the scan, while an unrecognized
//! character only yields an [`TokenKind::Illegal`] token.

use crate::pos::{LineIndex, Position};
use crate::token::{Token, TokenKind};
use logos::Logos;
use thiserror::Error;

/// What went wrong during lexing.
///
/// `UnrecognizedChar` is the default produced when no pattern matches; the
/// lexer downgrades it to an `Illegal` token and keeps scanning. Every other
/// kind aborts the scan.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("unrecognized character")]
    UnrecognizedChar,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("malformed raw string prefix")]
    MalformedRawString,

    #[error("malformed attribute")]
    MalformedAttribute,

    #[error("unterminated attribute")]
    UnterminatedAttribute,
}

/// A fatal lexical error. At most one is reported per run; the partial
/// token list is discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("lex error at {pos}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub pos: Position,
}

/// The lexer, wrapping the generated `logos` scanner
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    index: LineIndex,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            index: LineIndex::new(source),
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Scan the whole input. On success the final token is always
    /// end-of-input; the first fatal error stops the scan and discards
    /// everything collected so far.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(result) = self.inner.next() {
            let span = self.inner.span();
            let pos = self.index.position(self.source, span.start);
            match result {
                Ok(kind) => tokens.push(Token::new(kind, self.inner.slice(), pos)),
                Err(LexErrorKind::UnrecognizedChar) => {
                    tokens.push(Token::new(TokenKind::Illegal, self.inner.slice(), pos));
                }
                Err(kind) => return Err(LexError { kind, pos }),
            }
        }

        let end = self.index.position(self.source, self.source.len());
        tokens.push(Token::new(TokenKind::Eof, "", end));
        Ok(tokens)
    }
}

/// Helper function to lex source code
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}
