//! AST to IR lowering
//!
//! Attaches Go type names to every node and flags macro calls for the code
//! generator. Lowering runs on the bare AST and consults no symbol
//! information: literal types come from a fixed map, binary nodes take the
//! left operand's type except for comparisons and logical operators (which
//! are `bool`), and variable references stay opaque.

use crate::ast;
use crate::ast::LiteralKind;
use crate::ir::*;

/// Lowers an AST crate into an IR module
pub struct Lowerer {
    module_name: String,
}

/// Convenience wrapper over [`Lowerer`]
pub fn lower(krate: &ast::Crate, module_name: &str) -> Module {
    Lowerer::new(module_name).lower_crate(krate)
}

impl Lowerer {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    pub fn lower_crate(&self, krate: &ast::Crate) -> Module {
        let mut module = Module {
            name: self.module_name.clone(),
            package_name: "main".to_string(),
            functions: Vec::new(),
            structs: Vec::new(),
        };
        for item in &krate.items {
            match item {
                ast::Item::Function(f) => module.functions.push(self.lower_function(f)),
                ast::Item::Struct(s) => module.structs.push(self.lower_struct(s)),
            }
        }
        module
    }

    fn lower_function(&self, f: &ast::Function) -> Function {
        Function {
            name: f.name.clone(),
            params: f
                .params
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    ty: self.lower_type(&p.ty),
                })
                .collect(),
            return_type: self.lower_type(&f.return_type),
            body: f
                .body
                .stmts
                .iter()
                .filter_map(|s| self.lower_stmt(s))
                .collect(),
            pos: f.pos,
        }
    }

    fn lower_struct(&self, s: &ast::Struct) -> Struct {
        Struct {
            name: s.name.clone(),
            fields: s
                .fields
                .iter()
                .map(|f| Field {
                    name: f.name.clone(),
                    ty: self.lower_type(&f.ty),
                })
                .collect(),
            pos: s.pos,
        }
    }

    fn lower_stmt(&self, stmt: &ast::Stmt) -> Option<Stmt> {
        match stmt {
            ast::Stmt::Let(ls) => Some(Stmt::Decl(Decl {
                name: ls.name.clone(),
                ty: self.lower_type(&ls.ty),
                init: self.lower_expr(&ls.init),
                pos: ls.pos,
            })),
            ast::Stmt::Expr(es) => {
                let expr = self.lower_expr(&es.expr)?;
                Some(Stmt::Expr(ExprStmt { expr, pos: es.pos }))
            }
            // Bare blocks have no IR counterpart.
            ast::Stmt::Block(_) => None,
        }
    }

    fn lower_expr(&self, expr: &ast::Expr) -> Option<Expr> {
        match expr {
            ast::Expr::Literal(lit) => Some(self.lower_literal(lit)),
            ast::Expr::Binary(be) => {
                let left = self.lower_expr(&be.left)?;
                let right = self.lower_expr(&be.right)?;
                let ty = if be.op.is_comparison() || be.op.is_logical() {
                    Type::primitive("bool")
                } else {
                    left.ty().clone()
                };
                Some(Expr::Binary(Binary {
                    left: Box::new(left),
                    op: be.op,
                    right: Box::new(right),
                    ty,
                    pos: be.pos,
                }))
            }
            ast::Expr::Unary(ue) => {
                let operand = self.lower_expr(&ue.expr)?;
                let ty = match ue.op {
                    ast::UnOp::Not => Type::primitive("bool"),
                    _ => operand.ty().clone(),
                };
                Some(Expr::Unary(Unary {
                    op: ue.op,
                    operand: Box::new(operand),
                    ty,
                    pos: ue.pos,
                }))
            }
            ast::Expr::Call(ce) => Some(self.lower_call(ce)),
            // Block expressions do not lower.
            ast::Expr::Block(_) => None,
        }
    }

    fn lower_literal(&self, lit: &ast::Literal) -> Expr {
        if lit.kind == LiteralKind::Ident {
            return Expr::Var(Var {
                name: lit.value.clone(),
                ty: Type::unknown(),
                pos: lit.pos,
            });
        }
        Expr::Literal(Literal {
            value: lit.value.clone(),
            kind: lit.kind,
            ty: self.literal_type(lit.kind),
            pos: lit.pos,
        })
    }

    fn lower_call(&self, ce: &ast::CallExpr) -> Expr {
        let callee = ce.callee.value.clone();
        let is_macro = callee.ends_with('!');

        // Known macros have canonical result types; everything else is
        // unit, including plain calls, whose real type is not needed here.
        let ty = if is_macro && callee == "format!" {
            Type::primitive("string")
        } else {
            Type::unit()
        };

        Expr::Call(Call {
            callee,
            args: ce.args.iter().filter_map(|a| self.lower_expr(a)).collect(),
            ty,
            is_macro,
            pos: ce.pos,
        })
    }

    fn lower_type(&self, ty: &ast::PathType) -> Type {
        Type::primitive(map_type_name(&ty.name))
    }

    fn literal_type(&self, kind: LiteralKind) -> Type {
        match kind {
            LiteralKind::Int => Type::primitive("int"),
            LiteralKind::Float => Type::primitive("float64"),
            LiteralKind::Str => Type::primitive("string"),
            LiteralKind::Bool => Type::primitive("bool"),
            LiteralKind::Char => Type::primitive("rune"),
            LiteralKind::Ident => Type::unknown(),
        }
    }
}
