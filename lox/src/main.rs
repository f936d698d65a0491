//! Tree-walk driver: `lox <tokenize|parse|evaluate|run> <filename>`.
//!
//! Exit codes: 65 for lexical and parse errors, 66 for resolution errors,
//! 70 for runtime errors.

use std::process;

use anyhow::{Context, Result};

use lox_interpreter::{resolver, Interpreter, RuntimeError};
use lox_syntax::position::{Diagnostic, LineOffsets};
use lox_syntax::{ast_printer, tokenizer};

#[cfg(test)]
mod tests;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: lox <tokenize|parse|evaluate|run> <filename>");
        process::exit(1);
    }

    let command = args[1].as_str();
    let filename = &args[2];

    let source = std::fs::read_to_string(filename)
        .with_context(|| format!("failed to read {}", filename))?;
    let offsets = LineOffsets::new(&source);

    match command {
        "tokenize" => tokenize_command(&source, &offsets),
        "parse" => parse_command(&source, &offsets),
        "evaluate" => evaluate_command(&source, &offsets),
        "run" => run_command(&source, &offsets),
        _ => {
            eprintln!("Unknown command: {}", command);
            process::exit(1);
        }
    }

    Ok(())
}

fn tokenize_command(source: &str, offsets: &LineOffsets) {
    let (tokens, diagnostics) = tokenizer::tokenize(source);

    for diagnostic in &diagnostics {
        eprintln!(
            "[line {}] Error: {}",
            offsets.line(diagnostic.span.start),
            diagnostic.message
        );
    }

    for token in &tokens {
        let lexeme = lexeme(source, token.span);
        println!("{} {} {}", token.value, lexeme, token.value.literal());
    }

    if !diagnostics.is_empty() {
        process::exit(65);
    }
}

fn parse_command(source: &str, offsets: &LineOffsets) {
    match lox_syntax::parse_expr(source) {
        Ok(expr) => println!("{}", ast_printer::print(&expr)),
        Err(diagnostics) => {
            report_parse_errors(source, offsets, &diagnostics);
            process::exit(65);
        }
    }
}

fn evaluate_command(source: &str, offsets: &LineOffsets) {
    let expr = match lox_syntax::parse_expr(source) {
        Ok(expr) => expr,
        Err(diagnostics) => {
            report_parse_errors(source, offsets, &diagnostics);
            process::exit(65);
        }
    };

    let mut interpreter = Interpreter::new();
    match interpreter.evaluate(&expr) {
        Ok(value) => println!("{}", value),
        Err(error) => {
            report_runtime_error(offsets, &error);
            process::exit(70);
        }
    }
}

fn run_command(source: &str, offsets: &LineOffsets) {
    let ast = match lox_syntax::parse(source) {
        Ok(ast) => ast,
        Err(diagnostics) => {
            report_parse_errors(source, offsets, &diagnostics);
            process::exit(65);
        }
    };

    let locals = match resolver::resolve(&ast) {
        Ok(locals) => locals,
        Err(error) => {
            report_runtime_error(offsets, &error);
            process::exit(66);
        }
    };

    let mut interpreter = Interpreter::new();
    interpreter.resolve(locals);
    if let Err(error) = interpreter.interpret(&ast) {
        report_runtime_error(offsets, &error);
        process::exit(70);
    }
}

fn report_parse_errors(source: &str, offsets: &LineOffsets, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let line = offsets.line(diagnostic.span.start);
        let lexeme = lexeme(source, diagnostic.span);
        if lexeme.is_empty() {
            eprintln!("[line {}] Error at end: {}", line, diagnostic.message);
        } else {
            eprintln!("[line {}] Error at '{}': {}", line, lexeme, diagnostic.message);
        }
    }
}

fn report_runtime_error(offsets: &LineOffsets, error: &RuntimeError) {
    eprintln!(
        "[line {}] {}",
        offsets.line(error.span.start),
        error.message
    );
}

fn lexeme(source: &str, span: lox_syntax::position::Span) -> &str {
    &source[span.start.0 as usize..span.end.0 as usize]
}
