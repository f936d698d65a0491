pub mod ast;
pub mod ast_printer;
mod common;
pub mod expr_parser;
pub mod parser;
pub mod position;
pub mod stmt_parser;
pub mod token;
pub mod tokenizer;

use ast::{Ast, Expr};
use position::{Diagnostic, WithSpan};

/// Parses a whole program. Lexical errors are tolerated (the offending
/// characters simply produce no tokens); the first parse error aborts with
/// the parser's diagnostics.
pub fn parse(code: &str) -> Result<Ast, Vec<Diagnostic>> {
    let (tokens, _) = tokenizer::tokenize(code);
    let mut parser = parser::Parser::new(&tokens);
    match stmt_parser::parse(&mut parser) {
        Ok(ast) => Ok(ast),
        Err(()) => {
            parser.synchronize();
            Err(parser.into_diagnostics())
        }
    }
}

/// Parses a single expression, as used by the `parse` and `evaluate`
/// commands.
pub fn parse_expr(code: &str) -> Result<WithSpan<Expr>, Vec<Diagnostic>> {
    let (tokens, _) = tokenizer::tokenize(code);
    let mut parser = parser::Parser::new(&tokens);
    match expr_parser::parse(&mut parser) {
        Ok(expr) => Ok(expr),
        Err(()) => Err(parser.into_diagnostics()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_program() {
        assert!(parse("var a = 1; print a;").is_ok());
        let diagnostics = parse("var = 1;").unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Expect variable name.");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "fun f(n) { return n * 2; } print f(21);";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn test_parse_expr() {
        assert!(parse_expr("1 + 2 * 3").is_ok());
        let diagnostics = parse_expr("(1 + 2").unwrap_err();
        assert_eq!(diagnostics[0].message, "Unmatched parentheses.");
    }
}
