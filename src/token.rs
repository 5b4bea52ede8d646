//! Token definitions
//!
//! This module defines all the tokens the lexer can produce, together with
//! the `logos` patterns that recognize them. The handful of forms a regular
//! pattern cannot express — nested block comments, raw strings, attributes,
//! cooked strings with escapes — are scanned by callbacks that walk the
//! remaining input by hand.

use crate::lexer::LexErrorKind;
use crate::pos::Position;
use logos::{Logos, Skip};
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token, including literal delimiters.
    pub text: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }
}

/// All token kinds.
///
/// Keywords the parser dispatches on get their own variants; every other
/// reserved word collapses into [`TokenKind::Keyword`] and is told apart by
/// its text when needed. `Bang`, `Amp` and `Tilde` sit outside the operator
/// and punctuation tables but are kept as distinct tokens because the grammar
/// references them (macro calls, reference types, unary operators).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexErrorKind)]
#[logos(skip r"\s+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // ============ Comments ============
    /// Block comment opener; the callback consumes the whole comment,
    /// tracking nesting depth. Never materializes as a token.
    #[token("/*", lex_block_comment)]
    BlockComment,

    // ============ Literals ============
    /// Integer literal: 42, 1_000u32, 0xFF, 0b1010, 0o77
    #[regex(r"0b[01_]*[0-9a-zA-Z]*", priority = 5)]
    #[regex(r"0o[0-7_]*[0-9a-zA-Z]*", priority = 5)]
    #[regex(r"0x[0-9a-fA-F_]*[0-9a-zA-Z]*", priority = 5)]
    #[regex(r"[0-9][0-9_]*[0-9a-zA-Z]*", priority = 2)]
    Int,

    /// Float literal: 3.14, 1e10, 2.5e-3, 1.0f64
    #[regex(
        r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?[0-9a-zA-Z]*",
        priority = 4
    )]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*[0-9a-zA-Z]*", priority = 4)]
    Float,

    /// Cooked, byte, raw, or raw-byte string literal. The callbacks scan to
    /// the closing delimiter; the token text keeps every delimiter and
    /// escape exactly as written.
    #[regex(r#"b?""#, lex_string)]
    #[regex(r##"b?r#*""##, lex_raw_string, priority = 6)]
    Str,

    /// Raw string prefix with hashes but no opening quote. Always fatal.
    #[regex(r"b?r#+", lex_malformed_raw, priority = 4)]
    MalformedRawPrefix,

    /// Char or byte-char literal: 'a', '\n', 'abc' (an alphanumeric run
    /// between apostrophes scans as a single literal), b'x'
    #[regex(r"'[a-zA-Z0-9_]*'")]
    #[regex(r"'([^'\\\n]|\\[^\n])'")]
    #[regex(r"b'[a-zA-Z0-9_]*'")]
    #[regex(r"b'([^'\\\n]|\\[^\n])'")]
    CharLit,

    /// Lifetime: 'a, 'static
    #[regex(r"'[a-zA-Z_][a-zA-Z0-9_]*")]
    Lifetime,

    /// Boolean literals (reserved words, surfaced as literals by the parser)
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ============ Keywords ============
    #[token("fn")]
    Fn,
    #[token("struct")]
    Struct,
    #[token("let")]
    Let,

    /// Any other reserved word; the token text says which one.
    #[token("as")]
    #[token("break")]
    #[token("const")]
    #[token("continue")]
    #[token("crate")]
    #[token("else")]
    #[token("enum")]
    #[token("extern")]
    #[token("for")]
    #[token("if")]
    #[token("impl")]
    #[token("in")]
    #[token("loop")]
    #[token("match")]
    #[token("mod")]
    #[token("move")]
    #[token("mut")]
    #[token("pub")]
    #[token("ref")]
    #[token("return")]
    #[token("self")]
    #[token("Self")]
    #[token("static")]
    #[token("super")]
    #[token("trait")]
    #[token("type")]
    #[token("unsafe")]
    #[token("use")]
    #[token("where")]
    #[token("while")]
    #[token("async")]
    #[token("await")]
    #[token("dyn")]
    #[token("abstract")]
    #[token("become")]
    #[token("box")]
    #[token("do")]
    #[token("final")]
    #[token("macro")]
    #[token("override")]
    #[token("priv")]
    #[token("try")]
    #[token("typeof")]
    #[token("unsized")]
    #[token("virtual")]
    #[token("yield")]
    Keyword,

    // ============ Operators ============
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("->")]
    Arrow,

    // ============ Punctuation ============
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,

    /// Statement terminator, kept apart from the punctuation class.
    #[token(";")]
    Semicolon,

    // ============ Outside the operator/punctuation tables ============
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("~")]
    Tilde,

    // ============ Attributes ============
    /// `#[...]` or `#![...]`; the callback consumes the bracketed body,
    /// tracking bracket depth.
    #[token("#", lex_attribute)]
    Attribute,

    // ============ Identifiers ============
    /// Identifier: foo, _bar, MyStruct, имя (Unicode letters allowed)
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    // ============ Special ============
    /// A character no rule recognizes. Scanning continues past it.
    Illegal,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Check if this token is a reserved word
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Struct
                | TokenKind::Let
                | TokenKind::Keyword
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Check if this token is a typed literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Float | TokenKind::Str | TokenKind::CharLit
        )
    }

    /// Check if this token is in the operator table
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Eq
                | TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
                | TokenKind::AndAnd
                | TokenKind::OrOr
                | TokenKind::Arrow
        )
    }

    /// Check if this token is in the punctuation table
    pub fn is_punctuation(&self) -> bool {
        matches!(
            self,
            TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::ColonColon
                | TokenKind::Dot
                | TokenKind::DotDot
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::BlockComment => "comment",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Str => "string literal",
            TokenKind::MalformedRawPrefix => "raw string prefix",
            TokenKind::CharLit => "char literal",
            TokenKind::Lifetime => "lifetime",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Fn => "fn",
            TokenKind::Struct => "struct",
            TokenKind::Let => "let",
            TokenKind::Keyword => "keyword",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Arrow => "->",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::ColonColon => "::",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Semicolon => ";",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Tilde => "~",
            TokenKind::Attribute => "attribute",
            TokenKind::Ident => "identifier",
            TokenKind::Illegal => "illegal token",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{}", s)
    }
}

// ============ Scanning callbacks ============

/// Consume a nested block comment. The `/*` opener is already matched; this
/// walks the remainder tracking depth and skips the whole comment. An
/// unterminated comment runs to end of input.
fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> Skip {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() && depth > 0 {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    lex.bump(i);
    Skip
}

/// Scan a cooked (or byte) string body up to the closing quote. A backslash
/// consumes the following code point verbatim — the escape's meaning is not
/// interpreted, and a backslash-newline pair swallows the newline.
fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder();
    let mut chars = rem.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => {
                lex.bump(i + 1);
                return Ok(());
            }
            '\\' => {
                chars.next();
            }
            _ => {}
        }
    }
    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Scan a raw (or raw-byte) string body. The matched slice carries the hash
/// count; the body ends at a quote followed by the same number of hashes.
fn lex_raw_string(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let hashes = lex.slice().bytes().filter(|&b| b == b'#').count();
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            let mut seen = 0;
            while seen < hashes && bytes.get(i + 1 + seen) == Some(&b'#') {
                seen += 1;
            }
            if seen == hashes {
                lex.bump(i + 1 + seen);
                return Ok(());
            }
        }
        i += 1;
    }
    lex.bump(bytes.len());
    Err(LexErrorKind::UnterminatedString)
}

fn lex_malformed_raw(_lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::MalformedRawString)
}

/// Scan an attribute after its `#`: an optional `!`, then a bracketed body
/// with nesting. A missing `[` or a missing closing `]` is fatal.
fn lex_attribute(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'!') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'[') {
        return Err(LexErrorKind::MalformedAttribute);
    }
    i += 1;
    let mut depth = 1usize;
    while i < bytes.len() && depth > 0 {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    lex.bump(i);
    if depth > 0 {
        return Err(LexErrorKind::UnterminatedAttribute);
    }
    Ok(())
}
