//! Semantic analysis
//!
//! The checker walks the AST in two passes. Pass one registers every
//! top-level function and struct in a global symbol table, which is what
//! makes mutual recursion and forward references work. Pass two walks each
//! function body with a fresh local scope seeded from the parameters,
//! resolving identifiers, checking call arity and argument types, and
//! enforcing the operator operand rules.
//!
//! The AST is never mutated; all findings accumulate as positioned
//! diagnostics and the checker itself never fails.

mod error;
mod ty;

pub use error::{SemanticError, SemanticErrorKind};
pub use ty::{types_compatible, TypeInfo, INFER, UNIT};

use crate::ast::*;
use crate::pos::Position;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Function,
    Struct,
}

/// A global symbol. Function symbols keep a handle back to their
/// declaration so call sites can be checked against the signature; the AST
/// stays owned by the caller for the whole checker run.
#[derive(Debug)]
struct Symbol<'a> {
    kind: SymbolKind,
    ty: TypeInfo,
    func: Option<&'a Function>,
}

/// Names visible inside the function currently being checked.
type LocalScope = HashMap<String, TypeInfo>;

/// The semantic checker
pub struct Checker<'a> {
    symbols: HashMap<String, Symbol<'a>>,
    errors: Vec<SemanticError>,
}

/// Check a crate and return every semantic diagnostic, in source order.
pub fn check(krate: &Crate) -> Vec<SemanticError> {
    Checker::new().check(krate)
}

impl<'a> Checker<'a> {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn check(mut self, krate: &'a Crate) -> Vec<SemanticError> {
        self.register_declarations(krate);
        self.check_definitions(krate);
        self.errors
    }

    fn error(&mut self, kind: SemanticErrorKind, pos: Position) {
        self.errors.push(SemanticError::new(kind, pos));
    }

    // ============ Pass 1: declarations ============

    fn register_declarations(&mut self, krate: &'a Crate) {
        for item in &krate.items {
            match item {
                Item::Function(f) => self.register_function(f),
                Item::Struct(s) => self.register_struct(s),
            }
        }
    }

    fn register_function(&mut self, f: &'a Function) {
        if self.symbols.contains_key(&f.name) {
            self.error(
                SemanticErrorKind::DuplicateFunction {
                    name: f.name.clone(),
                },
                f.pos,
            );
            return;
        }
        self.symbols.insert(
            f.name.clone(),
            Symbol {
                kind: SymbolKind::Function,
                ty: TypeInfo::named(f.return_type.name.as_str()),
                func: Some(f),
            },
        );
    }

    fn register_struct(&mut self, s: &'a Struct) {
        if self.symbols.contains_key(&s.name) {
            self.error(
                SemanticErrorKind::DuplicateStruct {
                    name: s.name.clone(),
                },
                s.pos,
            );
            return;
        }
        self.symbols.insert(
            s.name.clone(),
            Symbol {
                kind: SymbolKind::Struct,
                ty: TypeInfo::named(s.name.as_str()),
                func: None,
            },
        );
    }

    // ============ Pass 2: definitions ============

    fn check_definitions(&mut self, krate: &'a Crate) {
        for item in &krate.items {
            if let Item::Function(f) = item {
                self.check_function(f);
            }
        }
    }

    fn check_function(&mut self, f: &'a Function) {
        let mut scope = LocalScope::new();
        for param in &f.params {
            let mut ty = TypeInfo::named(param.ty.name.as_str());
            // str parameters bind string literals, which type as String.
            if ty.name == "str" {
                ty.name = "String".to_string();
            }
            scope.insert(param.name.clone(), ty);
        }
        self.check_block(&f.body, &mut scope);
    }

    fn check_block(&mut self, block: &Block, scope: &mut LocalScope) {
        for stmt in &block.stmts {
            self.check_stmt(stmt, scope);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, scope: &mut LocalScope) {
        match stmt {
            Stmt::Let(ls) => self.check_let(ls, scope),
            Stmt::Expr(es) => {
                self.check_expr(&es.expr, scope);
            }
            Stmt::Block(b) => self.check_block(b, scope),
        }
    }

    fn check_let(&mut self, ls: &LetStmt, scope: &mut LocalScope) {
        if scope.contains_key(&ls.name) {
            self.error(
                SemanticErrorKind::Redeclared {
                    name: ls.name.clone(),
                },
                ls.pos,
            );
            return;
        }

        let init_ty = self.check_expr(&ls.init, scope);
        let decl_ty = TypeInfo::named(ls.ty.name.as_str());

        if decl_ty.is_infer() {
            // No annotation: the initializer decides, and must be able to.
            if init_ty.is_infer() {
                self.error(
                    SemanticErrorKind::CannotInfer {
                        name: ls.name.clone(),
                    },
                    ls.pos,
                );
                return;
            }
            scope.insert(ls.name.clone(), init_ty);
            return;
        }

        if !types_compatible(&decl_ty, &init_ty) {
            self.error(
                SemanticErrorKind::TypeMismatch {
                    expected: decl_ty.name.clone(),
                    found: init_ty.name.clone(),
                },
                ls.pos,
            );
        }
        scope.insert(ls.name.clone(), decl_ty);
    }

    // ============ Expressions ============

    fn check_expr(&mut self, expr: &Expr, scope: &mut LocalScope) -> TypeInfo {
        match expr {
            Expr::Literal(lit) => self.check_literal(lit, scope),
            Expr::Binary(be) => self.check_binary(be, scope),
            Expr::Unary(ue) => self.check_unary(ue, scope),
            Expr::Call(ce) => self.check_call(ce, scope),
            Expr::Block(_) => TypeInfo::unit(),
        }
    }

    fn check_literal(&mut self, lit: &Literal, scope: &mut LocalScope) -> TypeInfo {
        match lit.kind {
            LiteralKind::Int => TypeInfo::named("i32"),
            LiteralKind::Float => TypeInfo::named("f64"),
            LiteralKind::Str => TypeInfo::named("String"),
            LiteralKind::Bool => TypeInfo::named("bool"),
            LiteralKind::Char => TypeInfo::named("char"),
            LiteralKind::Ident => self.resolve_identifier(lit, scope),
        }
    }

    /// Resolve a name, local scope first, then the global table. A macro
    /// name (trailing `!`) resolves to unit without a lookup.
    fn resolve_identifier(&mut self, lit: &Literal, scope: &LocalScope) -> TypeInfo {
        let name = &lit.value;
        if name.ends_with('!') {
            return TypeInfo::unit();
        }
        if let Some(ty) = scope.get(name) {
            return ty.clone();
        }
        if let Some(sym) = self.symbols.get(name) {
            return sym.ty.clone();
        }
        self.error(
            SemanticErrorKind::UndefinedIdentifier { name: name.clone() },
            lit.pos,
        );
        TypeInfo::unit()
    }

    fn check_binary(&mut self, be: &BinaryExpr, scope: &mut LocalScope) -> TypeInfo {
        let left = self.check_expr(&be.left, scope);
        let right = self.check_expr(&be.right, scope);

        if be.op.is_arithmetic() {
            if !left.is_numeric() || !right.is_numeric() {
                self.error(SemanticErrorKind::NonNumericOperands { op: be.op }, be.pos);
                return TypeInfo::unit();
            }
            // Ties break to the left operand.
            return left;
        }

        if be.op.is_comparison() {
            if !types_compatible(&left, &right) {
                self.error(
                    SemanticErrorKind::IncomparableOperands {
                        left: left.name.clone(),
                        right: right.name.clone(),
                    },
                    be.pos,
                );
            }
            return TypeInfo::named("bool");
        }

        // Logical: both sides must be bool.
        if !left.is_bool() || !right.is_bool() {
            self.error(SemanticErrorKind::NonBooleanOperands { op: be.op }, be.pos);
        }
        TypeInfo::named("bool")
    }

    fn check_unary(&mut self, ue: &UnaryExpr, scope: &mut LocalScope) -> TypeInfo {
        let operand = self.check_expr(&ue.expr, scope);
        match ue.op {
            UnOp::Neg => {
                if !operand.is_numeric() {
                    self.error(SemanticErrorKind::NonNumericNegation, ue.pos);
                }
                operand
            }
            UnOp::Not => {
                if !operand.is_bool() {
                    self.error(SemanticErrorKind::NonBooleanNot, ue.pos);
                }
                TypeInfo::named("bool")
            }
            UnOp::BitNot => TypeInfo::unit(),
        }
    }

    fn check_call(&mut self, ce: &CallExpr, scope: &mut LocalScope) -> TypeInfo {
        let name = ce.callee.value.clone();

        // Macros bypass arity and signature checks entirely; their
        // arguments still have to be well formed.
        if name.ends_with('!') {
            for arg in &ce.args {
                self.check_expr(arg, scope);
            }
            return TypeInfo::unit();
        }

        // Copy the declaration handle out so the table borrow ends here.
        let looked_up = self.symbols.get(&name).map(|sym| (sym.kind, sym.func));
        let func = match looked_up {
            None => {
                self.error(SemanticErrorKind::UndefinedFunction { name }, ce.pos);
                return TypeInfo::unit();
            }
            Some((SymbolKind::Function, Some(func))) => func,
            Some(_) => {
                self.error(SemanticErrorKind::NotAFunction { name }, ce.pos);
                return TypeInfo::unit();
            }
        };

        if ce.args.len() != func.params.len() {
            self.error(
                SemanticErrorKind::ArityMismatch {
                    name,
                    expected: func.params.len(),
                    found: ce.args.len(),
                },
                ce.pos,
            );
            return TypeInfo::unit();
        }

        for (i, arg) in ce.args.iter().enumerate() {
            let arg_ty = self.check_expr(arg, scope);
            let param_ty = TypeInfo::named(func.params[i].ty.name.as_str());
            if !types_compatible(&param_ty, &arg_ty) {
                self.error(
                    SemanticErrorKind::ArgumentMismatch {
                        index: i + 1,
                        name: name.clone(),
                        expected: param_ty.name.clone(),
                        found: arg_ty.name.clone(),
                    },
                    ce.pos,
                );
            }
        }

        TypeInfo::named(func.return_type.name.as_str())
    }
}

impl<'a> Default for Checker<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn check_source(source: &str) -> Vec<SemanticError> {
        let (krate, parse_errors) = parse(lex(source).unwrap());
        assert!(parse_errors.is_empty(), "parse errors: {parse_errors:?}");
        check(&krate)
    }

    fn messages(source: &str) -> Vec<String> {
        check_source(source)
            .into_iter()
            .map(|e| e.kind.to_string())
            .collect()
    }

    #[test]
    fn test_clean_program() {
        let errors = check_source(
            r#"
            fn add(a: i32, b: i32) -> i32 { a + b }
            fn main() {
                let x = add(1, 2);
                println!("sum: {}", x);
            }
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_forward_reference() {
        // main calls a function declared after it
        let errors = check_source("fn main() { later(); }\nfn later() {}");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_duplicate_function() {
        let msgs = messages("fn f() {}\nfn f() {}");
        assert_eq!(msgs, vec!["duplicate function declaration: f"]);
    }

    #[test]
    fn test_duplicate_struct() {
        let msgs = messages("struct S { a: i32 }\nstruct S { b: i32 }");
        assert_eq!(msgs, vec!["duplicate struct declaration: S"]);
    }

    #[test]
    fn test_undefined_identifier() {
        let msgs = messages("fn f() { let x = y; }");
        assert_eq!(msgs, vec!["undefined identifier: y"]);
    }

    #[test]
    fn test_undefined_function() {
        let msgs = messages("fn f() { g(); }");
        assert_eq!(msgs, vec!["undefined function: g"]);
    }

    #[test]
    fn test_calling_a_struct() {
        let msgs = messages("struct S { a: i32 }\nfn f() { S(); }");
        assert_eq!(msgs, vec!["S is not a function"]);
    }

    #[test]
    fn test_arity_mismatch() {
        let msgs = messages("fn a(x: i32) -> i32 { x }\nfn f() { a(1, 2); }");
        assert_eq!(msgs, vec!["function a expects 1 arguments, got 2"]);
    }

    #[test]
    fn test_argument_type_mismatch_names_position() {
        let msgs = messages(
            r#"fn a(x: i32) -> i32 { x + 1 }
fn main() { let y = a("s"); }"#,
        );
        assert_eq!(msgs, vec!["argument 1 of a: expected i32, got String"]);
    }

    #[test]
    fn test_checking_continues_after_bad_argument() {
        let errors = check_source(
            r#"fn a(x: i32) -> i32 { x }
fn main() { let y = a("s"); let z = y + undefined; }"#,
        );
        // the bad call is reported, and the rest of the body is still walked
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_str_parameter_accepts_string_literal() {
        let errors = check_source(r#"fn greet(name: &str) { println!(name); } fn main() { greet("hi"); }"#);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_let_annotation_mismatch() {
        let msgs = messages(r#"fn f() { let x: i32 = "s"; }"#);
        assert_eq!(msgs, vec!["type mismatch: expected i32, got String"]);
    }

    #[test]
    fn test_let_infers_from_initializer() {
        let errors = check_source("fn f() { let x = 1; let y = x + 1; }");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unresolvable_binding_names_the_variable() {
        // `infer` is an ordinary type name to the parser, so a function can
        // claim it; a binding initialized from such a call has no type source
        let msgs = messages("fn f() -> infer {}\nfn main() { let x = f(); }");
        assert_eq!(
            msgs,
            vec!["cannot infer type for x without an explicit type or initializer"]
        );
    }

    #[test]
    fn test_redeclaration_in_scope() {
        let msgs = messages("fn f() { let x = 1; let x = 2; }");
        assert_eq!(msgs, vec!["variable x already declared in this scope"]);
    }

    #[test]
    fn test_parameter_shadowing_is_redeclaration() {
        let msgs = messages("fn f(x: i32) { let x = 1; }");
        assert_eq!(msgs, vec!["variable x already declared in this scope"]);
    }

    #[test]
    fn test_arithmetic_needs_numbers() {
        let msgs = messages(r#"fn f() { let x = "a" + 1; }"#);
        assert_eq!(msgs, vec!["operands of + must be numeric"]);
    }

    #[test]
    fn test_arithmetic_result_is_left_type() {
        // u8 + u8 binds x as u8; assigning to i32 then mismatches
        let msgs = messages("fn f(a: u8, b: u8) { let x: i32 = a + b; }");
        assert_eq!(msgs, vec!["type mismatch: expected i32, got u8"]);
    }

    #[test]
    fn test_comparison_yields_bool() {
        let errors = check_source("fn f(n: i32) -> bool { n % 2 == 0 }");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_comparison_requires_compatible_operands() {
        let msgs = messages(r#"fn f() { let b = 1 == "one"; }"#);
        assert_eq!(msgs, vec!["cannot compare i32 with String"]);
    }

    #[test]
    fn test_logical_requires_bool() {
        let msgs = messages("fn f() { let b = 1 && true; }");
        assert_eq!(msgs, vec!["operands of && must be boolean"]);
    }

    #[test]
    fn test_unary_rules() {
        let msgs = messages("fn f() { let a = -true; let b = !1; }");
        assert_eq!(
            msgs,
            vec![
                "operand of unary - must be numeric",
                "operand of unary ! must be boolean"
            ]
        );
    }

    #[test]
    fn test_macro_bypasses_arity_and_types() {
        let errors = check_source(r#"fn f() { println!("a", 1, true); no_such_macro!(); }"#);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_macro_arguments_are_still_checked() {
        let msgs = messages("fn f() { println!(missing); }");
        assert_eq!(msgs, vec!["undefined identifier: missing"]);
    }

    #[test]
    fn test_literal_types() {
        let errors = check_source(
            r#"fn f() {
                let a: i32 = 1;
                let b: f64 = 2.5;
                let c: String = "s";
                let d: bool = true;
                let e: char = 'x';
            }"#,
        );
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_checker_is_deterministic() {
        let source = "fn f() { let x = y + z; g(1); }";
        let (krate, _) = parse(lex(source).unwrap());
        let first = check(&krate);
        let second = check(&krate);
        assert_eq!(first, second);
        // y, z, the non-numeric +, and the unknown g
        assert_eq!(first.len(), 4);
    }
}
