//! Textual dump of an IR module, for the CLI's debugging output.

use crate::ir::*;
use std::fmt::Write;

/// Render a module as readable text, one statement per line.
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "module {} (package {})",
        module.name, module.package_name
    );

    for st in &module.structs {
        let _ = writeln!(out);
        let _ = writeln!(out, "struct {} {{", st.name);
        for field in &st.fields {
            let _ = writeln!(out, "  {}: {}", field.name, field.ty);
        }
        let _ = writeln!(out, "}}");
    }

    for f in &module.functions {
        let _ = writeln!(out);
        let params: Vec<String> = f
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        if f.return_type.is_unit() {
            let _ = writeln!(out, "fn {}({}) {{", f.name, params.join(", "));
        } else {
            let _ = writeln!(out, "fn {}({}) -> {} {{", f.name, params.join(", "), f.return_type);
        }
        for stmt in &f.body {
            let _ = writeln!(out, "  {}", print_stmt(stmt));
        }
        let _ = writeln!(out, "}}");
    }

    out
}

fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Decl(d) => match &d.init {
            Some(init) => format!("decl {}: {} = {}", d.name, d.ty, print_expr(init)),
            None => format!("decl {}: {}", d.name, d.ty),
        },
        Stmt::Assign(a) => format!("assign {} = {}", a.target, print_expr(&a.value)),
        Stmt::Return(r) => match &r.value {
            Some(value) => format!("return {}", print_expr(value)),
            None => "return".to_string(),
        },
        Stmt::Expr(es) => print_expr(&es.expr),
    }
}

fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Var(v) => v.name.clone(),
        Expr::Literal(l) => l.value.clone(),
        Expr::Binary(b) => format!(
            "({} {} {})",
            print_expr(&b.left),
            b.op,
            print_expr(&b.right)
        ),
        Expr::Unary(u) => format!("{}{}", u.op, print_expr(&u.operand)),
        Expr::Call(c) => {
            let args: Vec<String> = c.args.iter().map(print_expr).collect();
            if c.is_macro {
                format!("{}({}) [macro]", c.callee, args.join(", "))
            } else {
                format!("{}({})", c.callee, args.join(", "))
            }
        }
    }
}
