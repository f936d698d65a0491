use super::ast::*;
use super::token::*;
use crate::parser::Parser;
use crate::position::{Span, WithSpan};

#[allow(dead_code)]
#[derive(PartialEq, PartialOrd, Copy, Clone)]
enum Precedence {
    None,
    Assign, // =
    Or,
    And,
    Equality,   // == !=
    Comparison, // < <= > >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // ()
    Primary,
}

impl From<TokenKind> for Precedence {
    fn from(token: TokenKind) -> Precedence {
        match token {
            TokenKind::Equal => Precedence::Assign,
            TokenKind::Or => Precedence::Or,
            TokenKind::And => Precedence::And,
            TokenKind::BangEqual | TokenKind::EqualEqual => Precedence::Equality,
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash => Precedence::Factor,
            // Only infix dispatch consults this table, so Bang never fires here.
            TokenKind::Bang => Precedence::Unary,
            TokenKind::LeftParen => Precedence::Call,
            _ => Precedence::None,
        }
    }
}

fn parse_expr(it: &mut Parser, precedence: Precedence) -> Result<WithSpan<Expr>, ()> {
    let mut expr = parse_prefix(it)?;
    while !it.is_eof() {
        let next_precedence = Precedence::from(it.peek());
        if precedence >= next_precedence {
            break;
        }
        expr = parse_infix(it, expr)?;
    }
    Ok(expr)
}

fn parse_infix(it: &mut Parser, left: WithSpan<Expr>) -> Result<WithSpan<Expr>, ()> {
    match it.peek() {
        TokenKind::BangEqual
        | TokenKind::EqualEqual
        | TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::Slash => parse_binary(it, left),
        TokenKind::Or | TokenKind::And => parse_logical(it, left),
        TokenKind::Equal => parse_assign(it, left),
        TokenKind::LeftParen => parse_call(it, left),
        _ => {
            let span = it.peek_token().span;
            it.error("Expect expression.", span);
            Err(())
        }
    }
}

fn parse_prefix(it: &mut Parser) -> Result<WithSpan<Expr>, ()> {
    match it.peek() {
        TokenKind::Number
        | TokenKind::Nil
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Identifier
        | TokenKind::String => parse_primary(it),
        TokenKind::Bang | TokenKind::Minus => parse_unary(it),
        TokenKind::LeftParen => parse_grouping(it),
        _ => {
            let span = it.peek_token().span;
            it.error("Expect expression.", span);
            Err(())
        }
    }
}

fn parse_call(it: &mut Parser, left: WithSpan<Expr>) -> Result<WithSpan<Expr>, ()> {
    it.advance(); // opening paren, checked by the caller
    let args = parse_arguments(it)?;
    let paren = it.expect(TokenKind::RightParen, "Expect ')' after arguments.")?;
    let span = Span::union_span(left.span, paren);
    Ok(WithSpan::new(
        Expr::Call(Box::new(left), paren, args),
        span,
    ))
}

fn parse_arguments(it: &mut Parser) -> Result<Vec<WithSpan<Expr>>, ()> {
    let mut args = Vec::new();
    if !it.check(TokenKind::RightParen) {
        loop {
            if args.len() >= 255 {
                let span = it.peek_token().span;
                it.error("Can't have more than 255 arguments.", span);
                return Err(());
            }
            args.push(parse_expr(it, Precedence::None)?);
            if !it.optionally(TokenKind::Comma) {
                break;
            }
        }
    }
    Ok(args)
}

fn parse_assign(it: &mut Parser, left: WithSpan<Expr>) -> Result<WithSpan<Expr>, ()> {
    let equals = it.advance().span;
    let right = parse_expr(it, Precedence::None)?;
    let left_span = left.span;
    match left.value {
        Expr::Variable(name) => {
            let span = Span::union_span(left_span, right.span);
            Ok(WithSpan::new(Expr::Assign(name, Box::new(right)), span))
        }
        _ => {
            it.error("Invalid assignment target.", equals);
            Err(())
        }
    }
}

fn parse_logical(it: &mut Parser, left: WithSpan<Expr>) -> Result<WithSpan<Expr>, ()> {
    let precedence = Precedence::from(it.peek());
    let operator = parse_logical_op(it)?;
    let right = parse_expr(it, precedence)?;
    let span = Span::union_span(left.span, right.span);
    Ok(WithSpan::new(
        Expr::Logical(Box::new(left), operator, Box::new(right)),
        span,
    ))
}

fn parse_grouping(it: &mut Parser) -> Result<WithSpan<Expr>, ()> {
    let left_paren = it.advance().span;
    let expr = parse_expr(it, Precedence::None)?;
    let right_paren = it.expect(TokenKind::RightParen, "Unmatched parentheses.")?;
    Ok(WithSpan::new(
        Expr::Grouping(Box::new(expr)),
        Span::union_span(left_paren, right_paren),
    ))
}

fn parse_binary(it: &mut Parser, left: WithSpan<Expr>) -> Result<WithSpan<Expr>, ()> {
    let precedence = Precedence::from(it.peek());
    let operator = parse_binary_op(it)?;
    let right = parse_expr(it, precedence)?;
    let span = Span::union_span(left.span, right.span);
    Ok(WithSpan::new(
        Expr::Binary(Box::new(left), operator, Box::new(right)),
        span,
    ))
}

fn parse_unary(it: &mut Parser) -> Result<WithSpan<Expr>, ()> {
    let operator = parse_unary_op(it)?;
    let right = parse_expr(it, Precedence::Unary)?;
    let span = Span::union_span(operator.span, right.span);
    Ok(WithSpan::new(
        Expr::Unary(operator, Box::new(right)),
        span,
    ))
}

fn parse_logical_op(it: &mut Parser) -> Result<LogicalOperator, ()> {
    let tc = it.advance();
    match &tc.value {
        Token::And => Ok(LogicalOperator::And),
        Token::Or => Ok(LogicalOperator::Or),
        _ => {
            it.error("Expect logical operator.", tc.span);
            Err(())
        }
    }
}

fn parse_unary_op(it: &mut Parser) -> Result<WithSpan<UnaryOperator>, ()> {
    let tc = it.advance();
    let operator = match &tc.value {
        Token::Bang => UnaryOperator::Bang,
        Token::Minus => UnaryOperator::Minus,
        _ => {
            it.error("Expect unary operator.", tc.span);
            return Err(());
        }
    };
    Ok(WithSpan::new(operator, tc.span))
}

fn parse_binary_op(it: &mut Parser) -> Result<WithSpan<BinaryOperator>, ()> {
    let tc = it.advance();
    let operator = match &tc.value {
        Token::BangEqual => BinaryOperator::BangEqual,
        Token::EqualEqual => BinaryOperator::EqualEqual,
        Token::Less => BinaryOperator::Less,
        Token::LessEqual => BinaryOperator::LessEqual,
        Token::Greater => BinaryOperator::Greater,
        Token::GreaterEqual => BinaryOperator::GreaterEqual,
        Token::Plus => BinaryOperator::Plus,
        Token::Minus => BinaryOperator::Minus,
        Token::Star => BinaryOperator::Star,
        Token::Slash => BinaryOperator::Slash,
        _ => {
            it.error("Expect binary operator.", tc.span);
            return Err(());
        }
    };
    Ok(WithSpan::new(operator, tc.span))
}

fn parse_primary(it: &mut Parser) -> Result<WithSpan<Expr>, ()> {
    let tc = it.advance();
    match &tc.value {
        Token::Nil => Ok(WithSpan::new(Expr::Nil, tc.span)),
        Token::Number(n) => Ok(WithSpan::new(Expr::Number(*n), tc.span)),
        Token::True => Ok(WithSpan::new(Expr::Boolean(true), tc.span)),
        Token::False => Ok(WithSpan::new(Expr::Boolean(false), tc.span)),
        Token::String(s) => Ok(WithSpan::new(Expr::String(s.clone()), tc.span)),
        Token::Identifier(s) => Ok(WithSpan::new(
            Expr::Variable(WithSpan::new(s.clone(), tc.span)),
            tc.span,
        )),
        _ => {
            it.error("Expect expression.", tc.span);
            Err(())
        }
    }
}

pub fn parse(it: &mut Parser) -> Result<WithSpan<Expr>, ()> {
    parse_expr(it, Precedence::None)
}
