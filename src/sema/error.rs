//! Semantic error definitions

use crate::ast::BinOp;
use crate::pos::Position;
use std::fmt;
use thiserror::Error;

/// A semantic diagnostic with its source position
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub pos: Position,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "semantic error at {}: {}", self.pos, self.kind)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticErrorKind {
    #[error("duplicate function declaration: {name}")]
    DuplicateFunction { name: String },

    #[error("duplicate struct declaration: {name}")]
    DuplicateStruct { name: String },

    #[error("variable {name} already declared in this scope")]
    Redeclared { name: String },

    #[error("undefined identifier: {name}")]
    UndefinedIdentifier { name: String },

    #[error("undefined function: {name}")]
    UndefinedFunction { name: String },

    #[error("{name} is not a function")]
    NotAFunction { name: String },

    #[error("function {name} expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of {name}: expected {expected}, got {found}")]
    ArgumentMismatch {
        index: usize,
        name: String,
        expected: String,
        found: String,
    },

    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("operands of {op} must be numeric")]
    NonNumericOperands { op: BinOp },

    #[error("cannot compare {left} with {right}")]
    IncomparableOperands { left: String, right: String },

    #[error("operands of {op} must be boolean")]
    NonBooleanOperands { op: BinOp },

    #[error("operand of unary - must be numeric")]
    NonNumericNegation,

    #[error("operand of unary ! must be boolean")]
    NonBooleanNot,

    #[error("cannot infer type for {name} without an explicit type or initializer")]
    CannotInfer { name: String },
}
