//! Parser
//!
//! A recursive descent parser with synchronizing error recovery. It never
//! stops at the first syntax error: a failed expectation is recorded and
//! parsing continues, skipping tokens until a synchronization point (`;`,
//! `}`, `,` or `)` depending on context) when a construct cannot be salvaged.
//! The returned crate is always usable, possibly with fewer items than the
//! source intended.
//!
//! All binary operators share a single precedence level and associate to the
//! left: `a + b == c` parses as `(a + b) == c`. Sources are expected to
//! parenthesize anything where that matters.

use crate::ast::*;
use crate::pos::Position;
use crate::token::{Token, TokenKind};
use thiserror::Error;

/// A syntax error: what was expected, the token that was found, and where.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at {pos}: {message} (got '{found}')")]
pub struct ParseError {
    pub message: String,
    /// Text of the offending token.
    pub found: String,
    pub pos: Position,
}

/// The parser, consuming a token list produced by the lexer
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    eof: Token,
}

/// Parse a token list into a crate, collecting every syntax error found.
pub fn parse(tokens: Vec<Token>) -> (Crate, Vec<ParseError>) {
    Parser::new(tokens).parse_crate()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = match tokens.last() {
            Some(t) if t.kind == TokenKind::Eof => t.clone(),
            _ => Token::new(TokenKind::Eof, "", Position::default()),
        };
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof,
        }
    }

    // ============ Token stream helpers ============

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error(&mut self, message: impl Into<String>, tok: &Token) {
        self.errors.push(ParseError {
            message: message.into(),
            found: tok.text.clone(),
            pos: tok.pos,
        });
    }

    /// Require a token of the given kind. On a match the token is consumed
    /// and returned; on a mismatch an error is recorded and the offending
    /// token is returned *without* being consumed, so the caller can keep
    /// going with whatever is there.
    fn expect(&mut self, kind: TokenKind, desc: &str) -> Token {
        if self.at_eof() {
            let eof = self.eof.clone();
            self.error(format!("expected {desc} but got end of input"), &eof);
            return eof;
        }
        if self.peek().kind == kind {
            return self.advance();
        }
        let tok = self.peek().clone();
        self.error(format!("expected {desc}"), &tok);
        tok
    }

    /// Skip ahead to a synchronization point after an error. Stops *before*
    /// one of `syncs`, or just *after* a statement terminator or closing
    /// brace. Does nothing while no error has been recorded.
    fn recover(&mut self, syncs: &[TokenKind]) {
        if self.errors.is_empty() {
            return;
        }
        while !self.at_eof() {
            let kind = self.peek().kind;
            if syncs.contains(&kind) {
                return;
            }
            if kind == TokenKind::Semicolon || kind == TokenKind::RBrace {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    // ============ Items ============

    /// Parse the whole token stream into a crate. A top-level construct that
    /// is not recognized as an item costs one token before the next attempt,
    /// so the loop always makes progress.
    pub fn parse_crate(mut self) -> (Crate, Vec<ParseError>) {
        let pos = self.peek().pos;
        let mut items = Vec::new();
        while !self.at_eof() {
            match self.parse_item() {
                Some(item) => items.push(item),
                None => {
                    if self.at_eof() {
                        break;
                    }
                    self.advance();
                }
            }
        }
        (Crate { items, pos }, self.errors)
    }

    fn parse_item(&mut self) -> Option<Item> {
        // Attributes are recognized but carry no meaning here.
        while self.peek().kind == TokenKind::Attribute {
            self.advance();
        }
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Fn => Some(Item::Function(self.parse_function())),
            TokenKind::Struct => Some(Item::Struct(self.parse_struct())),
            _ => {
                self.error("expected item (fn, struct, etc.)", &tok);
                None
            }
        }
    }

    fn parse_function(&mut self) -> Function {
        let pos = self.peek().pos;
        self.advance(); // fn
        let name = self.expect(TokenKind::Ident, "function name").text;

        self.expect(TokenKind::LParen, "(");
        let mut params = Vec::new();
        while !self.at_eof() && self.peek().kind != TokenKind::RParen {
            let name_tok = self.expect(TokenKind::Ident, "parameter name");
            self.expect(TokenKind::Colon, ":");
            let ty = self.parse_type();
            params.push(Param {
                name: name_tok.text,
                ty,
                pos: name_tok.pos,
            });
            if self.peek().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenKind::RParen, ")");

        let return_type = if self.peek().kind == TokenKind::Arrow {
            self.advance();
            self.parse_type()
        } else {
            // No arrow clause: the function returns unit.
            PathType {
                name: "()".to_string(),
                pos,
            }
        };

        let body = self.parse_block();
        Function {
            name,
            params,
            return_type,
            body,
            pos,
        }
    }

    fn parse_struct(&mut self) -> Struct {
        let pos = self.peek().pos;
        self.advance(); // struct
        let name = self.expect(TokenKind::Ident, "struct name").text;
        self.expect(TokenKind::LBrace, "{");
        let mut fields = Vec::new();
        while !self.at_eof() && self.peek().kind != TokenKind::RBrace {
            let name_tok = self.expect(TokenKind::Ident, "field name");
            self.expect(TokenKind::Colon, ":");
            let ty = self.parse_type();
            fields.push(Field {
                name: name_tok.text,
                ty,
                pos: name_tok.pos,
            });
            if self.peek().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenKind::RBrace, "}");
        Struct { name, fields, pos }
    }

    // ============ Statements ============

    fn parse_block(&mut self) -> Block {
        let pos = self.peek().pos;
        self.expect(TokenKind::LBrace, "{");
        let mut stmts = Vec::new();
        while !self.at_eof() && self.peek().kind != TokenKind::RBrace {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.recover(&[TokenKind::Semicolon]),
            }
        }
        self.expect(TokenKind::RBrace, "}");
        Block { stmts, pos }
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        let tok = self.peek().clone();
        if tok.kind == TokenKind::Let {
            self.advance();
            let name = self.expect(TokenKind::Ident, "binding name").text;
            let mut ty = None;
            if self.peek().kind == TokenKind::Colon {
                self.advance();
                ty = Some(self.parse_type());
            }
            if self.expect(TokenKind::Eq, "=").kind == TokenKind::Eof {
                return None;
            }
            let init = self.parse_expr()?;
            if self.expect(TokenKind::Semicolon, ";").kind == TokenKind::Eof {
                return None;
            }
            // Missing annotation: leave a marker the checker resolves later.
            let ty = ty.unwrap_or(PathType {
                name: "infer".to_string(),
                pos: tok.pos,
            });
            return Some(Stmt::Let(LetStmt {
                name,
                ty,
                init,
                pos: tok.pos,
            }));
        }

        let expr = self.parse_expr()?;

        if self.peek().kind == TokenKind::Semicolon {
            self.advance();
            return Some(Stmt::Expr(ExprStmt {
                pos: expr.pos(),
                expr,
            }));
        }
        // A trailing expression is legal right before the closing brace.
        if self.peek().kind == TokenKind::RBrace {
            return Some(Stmt::Expr(ExprStmt {
                pos: expr.pos(),
                expr,
            }));
        }
        let tok = self.peek().clone();
        self.error("expected ';' after expression", &tok);
        None
    }

    // ============ Expressions ============

    fn binary_op(kind: TokenKind) -> Option<BinOp> {
        match kind {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::NotEq => Some(BinOp::Ne),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::LtEq => Some(BinOp::Le),
            TokenKind::GtEq => Some(BinOp::Ge),
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Rem),
            TokenKind::AndAnd => Some(BinOp::And),
            TokenKind::OrOr => Some(BinOp::Or),
            _ => None,
        }
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        let mut expr = self.parse_unary()?;
        while let Some(op) = Self::binary_op(self.peek().kind) {
            self.advance();
            let Some(right) = self.parse_unary() else {
                let tok = self.peek().clone();
                self.error("expected expression after operator", &tok);
                return None;
            };
            expr = Expr::Binary(BinaryExpr {
                pos: expr.pos(),
                left: Box::new(expr),
                op,
                right: Box::new(right),
            });
        }
        Some(expr)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Tilde => Some(UnOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            let op_tok = self.advance();
            let expr = self.parse_primary()?;
            return Some(Expr::Unary(UnaryExpr {
                op,
                expr: Box::new(expr),
                pos: op_tok.pos,
            }));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Int => self.literal(LiteralKind::Int),
            TokenKind::Float => self.literal(LiteralKind::Float),
            TokenKind::Str => self.literal(LiteralKind::Str),
            TokenKind::CharLit => self.literal(LiteralKind::Char),
            TokenKind::True | TokenKind::False => self.literal(LiteralKind::Bool),
            TokenKind::Ident => self.parse_ident_expr(),
            TokenKind::LBrace => {
                let block = self.parse_block();
                Some(Expr::Block(BlockExpr {
                    pos: tok.pos,
                    block,
                }))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen, ")");
                inner
            }
            _ => {
                self.error("expected primary expression", &tok);
                // Consume the offender so expression errors always progress.
                self.advance();
                None
            }
        }
    }

    fn literal(&mut self, kind: LiteralKind) -> Option<Expr> {
        let tok = self.advance();
        Some(Expr::Literal(Literal {
            kind,
            value: tok.text,
            pos: tok.pos,
        }))
    }

    /// An identifier in expression position: a plain variable reference, a
    /// call, or a macro call. A `!` right after the name folds into the name
    /// itself, so macro callees read `println!`, `format!`, and so on.
    fn parse_ident_expr(&mut self) -> Option<Expr> {
        let id_tok = self.advance();
        let mut name = id_tok.text;
        if self.peek().kind == TokenKind::Bang {
            self.advance();
            name.push('!');
        }

        if self.peek().kind != TokenKind::LParen {
            return Some(Expr::Literal(Literal {
                kind: LiteralKind::Ident,
                value: name,
                pos: id_tok.pos,
            }));
        }

        self.advance(); // (
        let callee = Literal {
            kind: LiteralKind::Ident,
            value: name,
            pos: id_tok.pos,
        };
        let mut args = Vec::new();

        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Some(Expr::Call(CallExpr {
                callee,
                args,
                pos: id_tok.pos,
            }));
        }

        loop {
            match self.parse_expr() {
                Some(arg) => args.push(arg),
                None => {
                    // Bad argument: resynchronize at the next ',' or ')'.
                    while !self.at_eof()
                        && self.peek().kind != TokenKind::Comma
                        && self.peek().kind != TokenKind::RParen
                    {
                        self.advance();
                    }
                    if self.peek().kind == TokenKind::Comma {
                        self.advance();
                        continue;
                    }
                }
            }
            if self.peek().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenKind::RParen, ")");
        Some(Expr::Call(CallExpr {
            callee,
            args,
            pos: id_tok.pos,
        }))
    }

    // ============ Types ============

    /// References reduce to their inner type; lifetimes were already dropped
    /// by the lexer into tokens this rule never looks at.
    fn parse_type(&mut self) -> PathType {
        if self.peek().kind == TokenKind::Amp {
            self.advance();
            return self.parse_type();
        }
        let tok = self.expect(TokenKind::Ident, "type name");
        PathType {
            name: tok.text,
            pos: tok.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_ok(source: &str) -> Crate {
        let (krate, errors) = parse(lex(source).unwrap());
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        krate
    }

    fn parse_with_errors(source: &str) -> (Crate, Vec<ParseError>) {
        parse(lex(source).unwrap())
    }

    fn only_function(krate: &Crate) -> &Function {
        assert_eq!(krate.items.len(), 1);
        match &krate.items[0] {
            Item::Function(f) => f,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_empty_crate() {
        let krate = parse_ok("");
        assert!(krate.items.is_empty());
    }

    #[test]
    fn test_function_signature() {
        let krate = parse_ok("fn add(a: i32, b: i32) -> i32 { a + b }");
        let f = only_function(&krate);
        assert_eq!(f.name, "add");
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].name, "a");
        assert_eq!(f.params[0].ty.name, "i32");
        assert_eq!(f.return_type.name, "i32");
        assert_eq!(f.pos, Position::new(1, 1));
    }

    #[test]
    fn test_missing_arrow_means_unit() {
        let krate = parse_ok("fn main() {}");
        let f = only_function(&krate);
        assert_eq!(f.return_type.name, "()");
        assert_eq!(f.return_type.pos, f.pos);
    }

    #[test]
    fn test_reference_types_reduce() {
        let krate = parse_ok("fn greet(name: &str) {}");
        let f = only_function(&krate);
        assert_eq!(f.params[0].ty.name, "str");
    }

    #[test]
    fn test_struct_fields() {
        let krate = parse_ok("struct Point { x: i32, y: i32 }");
        match &krate.items[0] {
            Item::Struct(s) => {
                assert_eq!(s.name, "Point");
                assert_eq!(s.fields.len(), 2);
                assert_eq!(s.fields[1].name, "y");
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_let_without_annotation_gets_infer_marker() {
        let krate = parse_ok("fn main() { let x = 1; }");
        let f = only_function(&krate);
        match &f.body.stmts[0] {
            Stmt::Let(ls) => {
                assert_eq!(ls.name, "x");
                assert_eq!(ls.ty.name, "infer");
                assert!(matches!(
                    &ls.init,
                    Expr::Literal(Literal { kind: LiteralKind::Int, .. })
                ));
            }
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_let_with_annotation() {
        let krate = parse_ok("fn main() { let x: i64 = 1; }");
        let f = only_function(&krate);
        match &f.body.stmts[0] {
            Stmt::Let(ls) => assert_eq!(ls.ty.name, "i64"),
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_precedence_is_left_associative() {
        let krate = parse_ok("fn f() { a + b == c; }");
        let f = only_function(&krate);
        let Stmt::Expr(es) = &f.body.stmts[0] else {
            panic!("expected expression statement");
        };
        // ((a + b) == c): the == node is outermost
        let Expr::Binary(outer) = &es.expr else {
            panic!("expected binary expression");
        };
        assert_eq!(outer.op, BinOp::Eq);
        let Expr::Binary(inner) = outer.left.as_ref() else {
            panic!("expected nested binary expression");
        };
        assert_eq!(inner.op, BinOp::Add);
    }

    #[test]
    fn test_binary_node_position_is_left_operand() {
        let krate = parse_ok("fn f() { a + b; }");
        let f = only_function(&krate);
        let Stmt::Expr(es) = &f.body.stmts[0] else {
            panic!("expected expression statement");
        };
        assert_eq!(es.expr.pos(), Position::new(1, 10));
    }

    #[test]
    fn test_unary_operators() {
        let krate = parse_ok("fn f() { -x; !flag; ~bits; }");
        let f = only_function(&krate);
        let ops: Vec<UnOp> = f
            .body
            .stmts
            .iter()
            .map(|s| match s {
                Stmt::Expr(es) => match &es.expr {
                    Expr::Unary(u) => u.op,
                    other => panic!("expected unary, got {other:?}"),
                },
                other => panic!("expected expr stmt, got {other:?}"),
            })
            .collect();
        assert_eq!(ops, vec![UnOp::Neg, UnOp::Not, UnOp::BitNot]);
    }

    #[test]
    fn test_call_with_arguments() {
        let krate = parse_ok("fn f() { add(1, 2); }");
        let f = only_function(&krate);
        let Stmt::Expr(es) = &f.body.stmts[0] else {
            panic!("expected expression statement");
        };
        let Expr::Call(call) = &es.expr else {
            panic!("expected call");
        };
        assert_eq!(call.callee.kind, LiteralKind::Ident);
        assert_eq!(call.callee.value, "add");
        assert_eq!(call.args.len(), 2);
    }

    #[test]
    fn test_macro_call_keeps_bang_in_name() {
        let krate = parse_ok(r#"fn main() { println!("hi"); }"#);
        let f = only_function(&krate);
        let Stmt::Expr(es) = &f.body.stmts[0] else {
            panic!("expected expression statement");
        };
        let Expr::Call(call) = &es.expr else {
            panic!("expected call");
        };
        assert_eq!(call.callee.value, "println!");
        assert_eq!(call.args.len(), 1);
    }

    #[test]
    fn test_tail_expression_without_semicolon() {
        let krate = parse_ok("fn f() -> i32 { x + 1 }");
        let f = only_function(&krate);
        assert_eq!(f.body.stmts.len(), 1);
        assert!(matches!(&f.body.stmts[0], Stmt::Expr(_)));
    }

    #[test]
    fn test_parenthesized_and_block_expressions() {
        let krate = parse_ok("fn f() { (a + b); { c; }; }");
        let f = only_function(&krate);
        assert!(matches!(
            &f.body.stmts[0],
            Stmt::Expr(ExprStmt { expr: Expr::Binary(_), .. })
        ));
        assert!(matches!(
            &f.body.stmts[1],
            Stmt::Expr(ExprStmt { expr: Expr::Block(_), .. })
        ));
    }

    #[test]
    fn test_attributes_are_skipped() {
        let krate = parse_ok("#[derive(Debug)]\nstruct S { a: i32 }\n#[inline]\nfn f() {}");
        assert_eq!(krate.items.len(), 2);
    }

    #[test]
    fn test_missing_semicolon_still_yields_binding() {
        let (krate, errors) = parse_with_errors("fn main() { let x = 1 }");
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.message.contains(';')));
        let f = only_function(&krate);
        assert_eq!(f.name, "main");
        assert!(matches!(&f.body.stmts[0], Stmt::Let(_)));
    }

    #[test]
    fn test_stray_semicolon_at_top_level() {
        let (krate, errors) = parse_with_errors(";");
        assert_eq!(errors.len(), 1);
        assert!(krate.items.is_empty());
    }

    #[test]
    fn test_recovery_collects_multiple_errors() {
        // both bindings miss their ';'; the parser reports each and still
        // returns both functions
        let (krate, errors) =
            parse_with_errors("fn f() { let x = 1 }\nfn g() { let y = 2 }");
        assert_eq!(errors.len(), 2);
        assert_eq!(krate.items.len(), 2);
        match &krate.items[1] {
            Item::Function(g) => assert_eq!(g.name, "g"),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_dense_errors_terminate() {
        // recovery chews through arbitrarily broken statement soup without
        // looping; whatever remains is reported, not hung on
        let (krate, errors) =
            parse_with_errors("fn f() { let = 1; let y = ; 2 + ; }\nfn g() { ok(); }");
        assert!(errors.len() >= 3);
        assert!(!krate.items.is_empty());
    }

    #[test]
    fn test_bad_call_argument_recovers_to_next() {
        let (krate, errors) = parse_with_errors("fn f() { g(1, ;, 2); }");
        assert!(!errors.is_empty());
        let f = only_function(&krate);
        assert_eq!(f.body.stmts.len(), 1);
    }

    #[test]
    fn test_errors_come_in_source_order() {
        let (_, errors) = parse_with_errors("fn f() { 1 + ; }\n;\n");
        for pair in errors.windows(2) {
            let (a, b) = (pair[0].pos, pair[1].pos);
            assert!(b.line > a.line || (b.line == a.line && b.column >= a.column));
        }
    }

    #[test]
    fn test_premature_end_of_input() {
        let (_, errors) = parse_with_errors("fn f(");
        assert!(errors.iter().any(|e| e.message.contains("end of input")));
    }

    #[test]
    fn test_unknown_item_consumes_a_token() {
        // an expression at top level is not an item; the parser reports it
        // once per token but always terminates
        let (krate, errors) = parse_with_errors("42 fn main() {}");
        assert!(!errors.is_empty());
        assert_eq!(krate.items.len(), 1);
    }
}
