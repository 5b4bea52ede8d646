//! rust2go CLI
//!
//! Translates one Rust-subset source file into Go. Diagnostics go to
//! standard output in source order with a summary per class; generated code
//! lands in an output directory named after the input file stem. The exit
//! code is zero only when every stage succeeds.

use clap::Parser;
use miette::miette;
use rust2go::{codegen, ir, lexer, parser, sema};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rust2go")]
#[command(version = rust2go::VERSION)]
#[command(about = "Translate a Rust-subset source file to Go", long_about = None)]
struct Cli {
    /// Input file to translate
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Directory for generated code
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    out_dir: PathBuf,

    /// Print the token stream (for debugging)
    #[arg(long)]
    emit_tokens: bool,

    /// Print the AST (for debugging)
    #[arg(long)]
    emit_ast: bool,

    /// Print the IR (for debugging)
    #[arg(long)]
    emit_ir: bool,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .map_err(|e| miette!("failed to read {}: {}", cli.input.display(), e))?;

    let tokens = lexer::lex(&source).map_err(|e| miette!("{}", e))?;

    if cli.emit_tokens {
        println!("=== Tokens ===");
        for token in &tokens {
            println!("{:>8}  {:<12} {:?}", token.pos.to_string(), format!("{:?}", token.kind), token.text);
        }
        println!();
    }

    let (krate, parse_errors) = parser::parse(tokens);

    if cli.emit_ast {
        println!("=== AST ===");
        println!("{krate:#?}");
        println!();
    }

    // The checker runs even on a crate with syntax errors so one invocation
    // surfaces as much as possible.
    let semantic_errors = sema::check(&krate);

    for err in &parse_errors {
        println!("{err}");
    }
    for err in &semantic_errors {
        println!("{err}");
    }

    if !parse_errors.is_empty() || !semantic_errors.is_empty() {
        println!(
            "{} parse error(s), {} semantic error(s)",
            parse_errors.len(),
            semantic_errors.len()
        );
        return Err(miette!("translation failed"));
    }

    let stem = cli
        .input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let module = ir::lower(&krate, &stem);

    if cli.emit_ir {
        println!("=== IR ===");
        println!("{}", ir::print_module(&module));
    }

    let code = codegen::emit(&module);

    fs::create_dir_all(&cli.out_dir)
        .map_err(|e| miette!("failed to create {}: {}", cli.out_dir.display(), e))?;
    let out_file = cli
        .out_dir
        .join(format!("{stem}.{}", rust2go::TARGET_EXTENSION));
    fs::write(&out_file, &code)
        .map_err(|e| miette!("failed to write {}: {}", out_file.display(), e))?;

    println!("wrote {}", out_file.display());
    Ok(())
}
