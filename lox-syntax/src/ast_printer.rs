//! Renders an expression tree in fully-parenthesized prefix form, e.g.
//! `(* (- 1.0) (group 2.5))`. Numbers use the literal display rule, so an
//! integral literal keeps one fractional digit.

use crate::ast::*;
use crate::position::WithSpan;
use crate::token::number_literal;

pub fn print(expr: &WithSpan<Expr>) -> String {
    match &expr.value {
        Expr::Binary(left, operator, right) => {
            parenthesize(binary_symbol(operator.value), &[left, right])
        }
        Expr::Logical(left, operator, right) => {
            parenthesize(logical_symbol(*operator), &[left, right])
        }
        Expr::Unary(operator, right) => parenthesize(unary_symbol(operator.value), &[right]),
        Expr::Grouping(inner) => parenthesize("group", &[inner]),
        Expr::Number(value) => number_literal(*value),
        Expr::String(value) => value.clone(),
        Expr::Boolean(value) => value.to_string(),
        Expr::Nil => "nil".to_string(),
        Expr::Variable(name) => name.value.clone(),
        Expr::Assign(name, value) => format!("(= {} {})", name.value, print(value)),
        Expr::Call(callee, _, args) => {
            let mut out = format!("(call {}", print(callee));
            for arg in args {
                out.push(' ');
                out.push_str(&print(arg));
            }
            out.push(')');
            out
        }
    }
}

fn parenthesize(name: &str, exprs: &[&WithSpan<Expr>]) -> String {
    let mut out = String::from("(");
    out.push_str(name);
    for expr in exprs {
        out.push(' ');
        out.push_str(&print(expr));
    }
    out.push(')');
    out
}

fn binary_symbol(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Slash => "/",
        BinaryOperator::Star => "*",
        BinaryOperator::Plus => "+",
        BinaryOperator::Minus => "-",
        BinaryOperator::Greater => ">",
        BinaryOperator::GreaterEqual => ">=",
        BinaryOperator::Less => "<",
        BinaryOperator::LessEqual => "<=",
        BinaryOperator::BangEqual => "!=",
        BinaryOperator::EqualEqual => "==",
    }
}

fn logical_symbol(operator: LogicalOperator) -> &'static str {
    match operator {
        LogicalOperator::And => "and",
        LogicalOperator::Or => "or",
    }
}

fn unary_symbol(operator: UnaryOperator) -> &'static str {
    match operator {
        UnaryOperator::Bang => "!",
        UnaryOperator::Minus => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::tokenizer::tokenize;

    fn print_str(source: &str) -> String {
        let (tokens, _) = tokenize(source);
        let mut parser = Parser::new(&tokens);
        let expr = crate::expr_parser::parse(&mut parser).unwrap();
        print(&expr)
    }

    #[test]
    fn test_literals() {
        assert_eq!(print_str("42"), "42.0");
        assert_eq!(print_str("42.5"), "42.5");
        assert_eq!(print_str("\"hi\""), "hi");
        assert_eq!(print_str("true"), "true");
        assert_eq!(print_str("nil"), "nil");
        assert_eq!(print_str("x"), "x");
    }

    #[test]
    fn test_compound() {
        assert_eq!(print_str("1 + 2"), "(+ 1.0 2.0)");
        assert_eq!(print_str("-x"), "(- x)");
        assert_eq!(print_str("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(print_str("x = 3"), "(= x 3.0)");
        assert_eq!(print_str("a or b and c"), "(or a (and b c))");
        assert_eq!(print_str("f(1, x)"), "(call f 1.0 x)");
        assert_eq!(print_str("1 <= 2 == true"), "(== (<= 1.0 2.0) true)");
    }

    #[test]
    fn test_rescanning_output_is_clean() {
        // The printed form stays within the language's lexical grammar.
        for source in ["1+2*3", "-(4.5/2) == nil", "a = b or !c", "f(1, g(2))"] {
            let printed = print_str(source);
            let (_, diagnostics) = tokenize(&printed);
            assert!(diagnostics.is_empty(), "printed: {}", printed);
        }
    }

    #[test]
    fn test_printing_is_stable() {
        let (tokens, _) = tokenize("!(1 / 2 - -3)");
        let mut parser = Parser::new(&tokens);
        let expr = crate::expr_parser::parse(&mut parser).unwrap();
        assert_eq!(print(&expr), print(&expr));
        assert_eq!(print(&expr), "(! (group (- (/ 1.0 2.0) (- 3.0))))");
    }
}
