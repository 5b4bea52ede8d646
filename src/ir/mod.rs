//! Intermediate representation
//!
//! A flattened, type-annotated mirror of the AST, carrying Go-spelled type
//! names so the code generator never has to think about the source language.
//! The unit type lowers to the empty name, which is the generator's signal
//! to omit a return clause.

mod lower;
mod printer;

pub use lower::{lower, Lowerer};
pub use printer::print_module;

use crate::ast::{BinOp, LiteralKind, UnOp};
use crate::pos::Position;
use std::fmt;

/// A whole translation unit in IR form
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Module name, usually the input file stem.
    pub name: String,
    /// Target package the generated file declares.
    pub package_name: String,
    pub functions: Vec<Function>,
    pub structs: Vec<Struct>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub body: Vec<Stmt>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

// ============ Statements ============

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Decl(Decl),
    Assign(Assign),
    Return(Return),
    Expr(ExprStmt),
}

/// A variable declaration. `init` is absent when the source initializer had
/// no IR counterpart (block expressions do not lower).
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub ty: Type,
    pub init: Option<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: String,
    pub value: Expr,
    pub pos: Position,
}

/// An explicit return. The lowerer never produces one; the generator
/// synthesizes them from trailing expression statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub pos: Position,
}

// ============ Expressions ============

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(Var),
    Literal(Literal),
    Binary(Binary),
    Unary(Unary),
    Call(Call),
}

impl Expr {
    pub fn ty(&self) -> &Type {
        match self {
            Expr::Var(v) => &v.ty,
            Expr::Literal(l) => &l.ty,
            Expr::Binary(b) => &b.ty,
            Expr::Unary(u) => &u.ty,
            Expr::Call(c) => &c.ty,
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            Expr::Var(v) => v.pos,
            Expr::Literal(l) => l.pos,
            Expr::Binary(b) => b.pos,
            Expr::Unary(u) => u.pos,
            Expr::Call(c) => c.pos,
        }
    }
}

/// A variable reference. Its type is opaque at lowering time; nothing
/// downstream needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: Type,
    pub pos: Position,
}

/// A literal, still carrying its source kind and exact source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: String,
    pub kind: LiteralKind,
    pub ty: Type,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
    pub ty: Type,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub ty: Type,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Callee name; macro names keep their trailing `!`.
    pub callee: String,
    pub args: Vec<Expr>,
    pub ty: Type,
    pub is_macro: bool,
    pub pos: Position,
}

// ============ Types ============

/// A target-language type
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Go type name; empty for unit (omitted in signatures) and for types
    /// that are unknown at lowering time.
    pub name: String,
    pub is_primitive: bool,
    pub is_pointer: bool,
    pub is_array: bool,
    pub element: Option<Box<Type>>,
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_primitive: true,
            is_pointer: false,
            is_array: false,
            element: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_primitive: false,
            is_pointer: false,
            is_array: false,
            element: None,
        }
    }

    /// The unit type: an empty name the generator leaves out entirely.
    pub fn unit() -> Self {
        Self::primitive("")
    }

    /// A type lowering could not determine.
    pub fn unknown() -> Self {
        Self::named("")
    }

    pub fn array(element: Type) -> Self {
        Self {
            name: format!("[]{}", element.name),
            is_primitive: false,
            is_pointer: false,
            is_array: true,
            element: Some(Box::new(element)),
        }
    }

    pub fn pointer(element: Type) -> Self {
        Self {
            name: format!("*{}", element.name),
            is_primitive: false,
            is_pointer: true,
            is_array: false,
            element: Some(Box::new(element)),
        }
    }

    pub fn is_unit(&self) -> bool {
        self.name.is_empty() || self.name == "()"
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Map a source type name onto its Go spelling. Names outside the fixed map
/// (user structs) pass through unchanged; the unit type maps to the empty
/// string.
pub fn map_type_name(name: &str) -> &str {
    match name {
        "i8" => "int8",
        "i16" => "int16",
        "i32" => "int",
        "i64" => "int64",
        "u8" => "uint8",
        "u16" => "uint16",
        "u32" => "uint32",
        "u64" => "uint64",
        "f32" => "float32",
        "f64" => "float64",
        "bool" => "bool",
        "str" => "string",
        "String" => "string",
        "()" => "",
        other => other,
    }
}
