//! `wexpr` CLI — pretty-print, minify, validate, and binary-encode Wexpr
//! documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Pretty-print (stdin → stdout); text and binary input are autodetected
//! echo '#(a b c)' | wexpr humanreadable
//!
//! # Minify from file to file
//! wexpr mini -i config.wexpr -o config.min.wexpr
//!
//! # Check a document parses; prints true/false, exit code 0/1
//! wexpr validate -i config.wexpr
//!
//! # Emit the binary form (file header + main expression chunk)
//! wexpr binary -i config.wexpr -o config.bwexpr
//! ```
//!
//! `-` means stdin for `--input` and stdout for `--output` (the default for
//! both). Parse failures print `wexpr: <input>:<line>:<column>: <message>`
//! on stderr and exit non-zero.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read, Write};
use std::process;
use wexpr_core::{Expression, ExpressionType, ParseFlags, WriteFlags};

#[derive(Parser)]
#[command(name = "wexpr", version, about = "Wexpr command-line tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the input and pretty-print it as indented Wexpr text
    Humanreadable(IoArgs),
    /// Parse the input and print it as minified Wexpr text
    Mini(IoArgs),
    /// Check that the input parses; prints true or false
    Validate(IoArgs),
    /// Parse the input and emit the binary Wexpr document
    Binary(IoArgs),
}

#[derive(Args)]
struct IoArgs {
    /// Input path, or - for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output path, or - for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("wexpr: {err:#}");
            1
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Humanreadable(args) => emit(&args, |expr| {
            expr.to_text(0, WriteFlags::HumanReadable).into_bytes()
        }),
        Commands::Mini(args) => {
            emit(&args, |expr| expr.to_text(0, WriteFlags::Compact).into_bytes())
        }
        Commands::Binary(args) => emit(&args, Expression::to_binary_document),
        Commands::Validate(args) => validate(&args),
    }
}

/// Parse the input and write `render`'s output, or report the parse failure
/// on stderr. The exit code is the return value, not an error.
fn emit(args: &IoArgs, render: impl Fn(&Expression) -> Vec<u8>) -> Result<i32> {
    let data = read_input(&args.input)?;
    match parse(&data) {
        Ok(expr) => {
            write_output(&args.output, &render(&expr))?;
            Ok(0)
        }
        Err(failure) => {
            eprintln!("wexpr: {}:{}", display_path(&args.input), failure);
            Ok(1)
        }
    }
}

/// `validate` reports through the output stream rather than stderr: `true`
/// or `false` plus the matching exit code.
fn validate(args: &IoArgs) -> Result<i32> {
    let data = read_input(&args.input)?;
    let ok = parse(&data).is_ok();
    write_output(&args.output, if ok { b"true\n" } else { b"false\n" })?;
    Ok(if ok { 0 } else { 1 })
}

/// Parse either encoding; an `Invalid` (empty) root counts as a failure.
/// The error string is pre-formatted as `<line>:<column>: <message>`.
fn parse(data: &[u8]) -> Result<Expression, String> {
    match Expression::from_buffer(data, ParseFlags::None) {
        Ok(expr) if expr.expression_type() != ExpressionType::Invalid => Ok(expr),
        Ok(_) => Err("input holds no expression".to_string()),
        Err(err) => Err(format!("{}:{}: {}", err.line, err.column, err.message)),
    }
}

fn display_path(path: &str) -> &str {
    if path == "-" {
        "(stdin)"
    } else {
        path
    }
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {path}"))
    }
}

fn write_output(path: &str, data: &[u8]) -> Result<()> {
    if path == "-" {
        io::stdout()
            .write_all(data)
            .context("failed to write to stdout")
    } else {
        std::fs::write(path, data).with_context(|| format!("failed to write {path}"))
    }
}
