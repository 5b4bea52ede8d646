//! rust2go
//!
//! A source-to-source translator from a subset of Rust to Go.
//!
//! # Architecture
//!
//! ```text
//! Source Code (.rs)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    Lexer    │  → positioned tokens (fatal on unclosable literals)
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Parser    │  → AST + recoverable syntax errors
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Checker   │  → semantic errors (AST unchanged)
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │  IR Lowering│  → typed IR with Go type names
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Codegen   │  → Go source text
//! └─────────────┘
//! ```
//!
//! Each stage is a pure function of its input: the lexer and parser keep
//! running cursors, the checker a symbol table, all created fresh per run,
//! so concurrent translations never share state. Parse and semantic errors
//! accumulate rather than abort, and code generation only runs on a clean
//! diagnostic slate.

pub mod ast;
pub mod codegen;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod pos;
pub mod sema;
pub mod token;

// Re-exports for convenience
pub use lexer::Lexer;
pub use pos::Position;
pub use token::{Token, TokenKind};

use thiserror::Error;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension of generated target files
pub const TARGET_EXTENSION: &str = "go";

/// Why a translation produced no output
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Lex(#[from] lexer::LexError),

    #[error("found {} parse error(s) and {} semantic error(s)", .parse.len(), .semantic.len())]
    Invalid {
        parse: Vec<parser::ParseError>,
        semantic: Vec<sema::SemanticError>,
    },
}

/// Run the whole pipeline over `source` and return the generated Go text.
///
/// Parse and semantic diagnostics are both collected before failing, so a
/// caller sees everything wrong with the input in one pass.
pub fn translate(source: &str, module_name: &str) -> Result<String, TranslateError> {
    let tokens = lexer::lex(source)?;
    let (krate, parse_errors) = parser::parse(tokens);
    let semantic_errors = sema::check(&krate);

    if !parse_errors.is_empty() || !semantic_errors.is_empty() {
        return Err(TranslateError::Invalid {
            parse: parse_errors,
            semantic: semantic_errors,
        });
    }

    let module = ir::lower(&krate, module_name);
    Ok(codegen::emit(&module))
}
