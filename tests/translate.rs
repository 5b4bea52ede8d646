//! End-to-end pipeline tests: source text in, Go text (or diagnostics) out.

use rust2go::{lexer, parser, sema, translate, TranslateError};

fn translate_ok(source: &str) -> String {
    translate(source, "example").expect("translation failed")
}

fn diagnostics(source: &str) -> (Vec<String>, Vec<String>) {
    match translate(source, "example") {
        Ok(_) => (Vec::new(), Vec::new()),
        Err(TranslateError::Invalid { parse, semantic }) => (
            parse.iter().map(|e| e.to_string()).collect(),
            semantic.iter().map(|e| e.to_string()).collect(),
        ),
        Err(other) => panic!("unexpected fatal error: {other}"),
    }
}

#[test]
fn empty_input_translates_to_empty_package() {
    let go = translate_ok("");
    assert!(go.starts_with("package main"));
}

#[test]
fn declaration_with_inferred_int() {
    let go = translate_ok("fn f() { let x = 1; }");
    assert!(go.contains("func f() {"));
    assert!(go.contains("x := 1"));
}

#[test]
fn hello_world_macro() {
    let go = translate_ok(r#"fn main() { println!("hi"); }"#);
    assert!(go.contains("func main() {"));
    assert!(go.contains("fmt.Println(\"hi\")"));
}

#[test]
fn argument_type_error_reports_and_continues() {
    let (parse, semantic) = diagnostics(
        r#"fn a(x: i32) -> i32 { x + 1 }
fn main() { let y = a("s"); }"#,
    );
    assert!(parse.is_empty());
    assert_eq!(semantic.len(), 1);
    assert!(semantic[0].contains("argument 1 of a: expected i32, got String"));
}

#[test]
fn duplicate_function_is_one_error() {
    let (_, semantic) = diagnostics("fn f() {}\nfn f() {}");
    assert_eq!(semantic.len(), 1);
    assert!(semantic[0].contains("duplicate function declaration: f"));
}

#[test]
fn missing_semicolon_still_finds_main() {
    let source = "fn main() { let x = 1 }";
    let tokens = lexer::lex(source).unwrap();
    let (krate, errors) = parser::parse(tokens);
    assert!(errors.iter().any(|e| e.message.contains(';')));
    assert_eq!(krate.items.len(), 1);
    // the crate is still checkable
    let _ = sema::check(&krate);
}

#[test]
fn nested_comments_vanish() {
    let go = translate_ok("/* a /* b */ */ fn main() {}");
    assert!(go.contains("func main() {"));
}

#[test]
fn full_program_round_trip() {
    let source = r#"
// entry point
fn main() {
    println!("=== start ===");
    let result = add_numbers(5, 3);
    println!("sum: {}", result);
    greet_user("Алексей");
    let number = 7;
    let even = is_even(number);
    println!("{} even: {}", number, even);
}

fn add_numbers(a: i32, b: i32) -> i32 {
    a + b
}

fn greet_user(name: &str) {
    println!("hello, {}!", name);
}

fn is_even(num: i32) -> bool {
    num % 2 == 0
}
"#;
    let go = translate_ok(source);
    assert!(go.contains("package main"));
    assert!(go.contains("func add_numbers(a int, b int) int {"));
    assert!(go.contains("\treturn (a + b)"));
    assert!(go.contains("func greet_user(name string) {"));
    assert!(go.contains("func is_even(num int) bool {"));
    assert!(go.contains("\treturn ((num % 2) == 0)"));
    assert!(go.contains("result := add_numbers(5, 3)"));
    assert!(go.contains("fmt.Println(\"sum: {}\", result)"));
    assert!(go.contains("greet_user(\"Алексей\")"));
}

#[test]
fn structs_translate_with_exported_fields() {
    let go = translate_ok(
        r#"
struct Point { x: i32, y: i32 }
fn origin_x(p: Point) -> i32 { zero() }
fn zero() -> i32 { 0 }
"#,
    );
    assert!(go.contains("type Point struct {"));
    assert!(go.contains("\tX int"));
    assert!(go.contains("\tY int"));
    assert!(go.contains("func origin_x(p Point) int {"));
}

#[test]
fn format_macro_produces_sprintf() {
    let go = translate_ok(
        r#"fn label(name: &str) -> String { format!("name: {}", name) }"#,
    );
    assert!(go.contains("func label(name string) string {"));
    assert!(go.contains("return fmt.Sprintf(\"name: {}\", name)"));
}

#[test]
fn fatal_lex_error_aborts_pipeline() {
    let err = translate(r#"fn main() { let s = "unclosed; }"#, "example").unwrap_err();
    assert!(matches!(err, TranslateError::Lex(_)));
}

#[test]
fn all_diagnostics_surface_in_one_run() {
    // one syntax error and one semantic error in the same file
    let (parse, semantic) = diagnostics(
        "fn f() { let x = 1 }\nfn g() { undefined_thing(); }",
    );
    assert!(!parse.is_empty());
    assert!(!semantic.is_empty());
}

#[test]
fn attributes_and_lifetimes_are_ignored() {
    let go = translate_ok(
        "#[derive(Debug)]\nstruct S { a: i32 }\n#[inline]\nfn f() {}",
    );
    assert!(go.contains("type S struct {"));
    assert!(go.contains("func f() {"));
}
