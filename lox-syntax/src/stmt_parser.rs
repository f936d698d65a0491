use super::ast::*;
use super::token::*;
use crate::common::expect_identifier;
use crate::parser::Parser;
use crate::position::Span;
use crate::position::WithSpan;
use std::rc::Rc;

fn parse_program(it: &mut Parser) -> Result<Vec<WithSpan<Stmt>>, ()> {
    let mut statements = Vec::new();
    while !it.is_eof() {
        statements.push(parse_declaration(it)?);
    }

    Ok(statements)
}

fn parse_declaration(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    match it.peek() {
        TokenKind::Var => parse_var_declaration(it),
        TokenKind::Fun => parse_function_declaration(it),
        _ => parse_statement(it),
    }
}

fn parse_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    match it.peek() {
        TokenKind::Print => parse_print_statement(it),
        TokenKind::If => parse_if_statement(it),
        TokenKind::LeftBrace => parse_block_statement(it),
        TokenKind::While => parse_while_statement(it),
        TokenKind::Return => parse_return_statement(it),
        TokenKind::For => parse_for_statement(it),
        _ => parse_expr_statement(it),
    }
}

fn parse_function_declaration(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // fun
    let name = expect_identifier(it, "Expect function name.")?;
    it.expect(TokenKind::LeftParen, "Expect '(' after function name.")?;
    let params = if !it.check(TokenKind::RightParen) {
        parse_params(it)?
    } else {
        Vec::new()
    };
    it.expect(TokenKind::RightParen, "Expect ')' after parameters.")?;
    it.expect(TokenKind::LeftBrace, "Expect '{' before function body.")?;
    let mut body: Vec<WithSpan<Stmt>> = Vec::new();
    while !it.check(TokenKind::RightBrace) && !it.is_eof() {
        body.push(parse_declaration(it)?);
    }
    let end_span = it.expect(TokenKind::RightBrace, "Expect '}' after block.")?;

    Ok(WithSpan::new(
        Stmt::Function(Rc::new(FunctionDecl { name, params, body })),
        Span::union_span(begin_span, end_span),
    ))
}

fn parse_params(it: &mut Parser) -> Result<Vec<WithSpan<Identifier>>, ()> {
    let mut params: Vec<WithSpan<Identifier>> = Vec::new();
    loop {
        if params.len() >= 255 {
            let span = it.peek_token().span;
            it.error("Can't have more than 255 parameters.", span);
            return Err(());
        }
        params.push(expect_identifier(it, "Expect parameter name.")?);
        if !it.optionally(TokenKind::Comma) {
            break;
        }
    }
    Ok(params)
}

fn parse_var_declaration(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // var
    let name = expect_identifier(it, "Expect variable name.")?;
    let mut initializer = None;

    if it.optionally(TokenKind::Equal) {
        initializer = Some(parse_expr(it)?);
    }

    let end_span = it.expect(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;

    Ok(WithSpan::new(
        Stmt::Var(name, initializer.map(Box::new)),
        Span::union_span(begin_span, end_span),
    ))
}

fn parse_expr(it: &mut Parser) -> Result<WithSpan<Expr>, ()> {
    super::expr_parser::parse(it)
}

fn parse_for_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // for
    it.expect(TokenKind::LeftParen, "Expect '(' after 'for'.")?;
    let initializer = match it.peek() {
        TokenKind::Var => Some(parse_var_declaration(it)?),
        TokenKind::Semicolon => {
            it.advance();
            None
        }
        _ => Some(parse_expr_statement(it)?),
    };
    let condition = if !it.check(TokenKind::Semicolon) {
        parse_expr(it)?
    } else {
        WithSpan::empty(Expr::Boolean(true))
    };
    it.expect(TokenKind::Semicolon, "Expect ';' after loop condition.")?;
    let increment = if !it.check(TokenKind::RightParen) {
        Some(parse_expr(it)?)
    } else {
        None
    };
    it.expect(TokenKind::RightParen, "Expect ')' after for clauses.")?;
    let body = parse_statement(it)?;

    // Desugar to a while loop: the increment becomes the tail of the body,
    // the initializer a block wrapping the loop.
    let body = match increment {
        Some(expr) => {
            let expr_span = expr.span;
            let span = Span::union_span(body.span, expr_span);
            WithSpan::new(
                Stmt::Block(vec![
                    body,
                    WithSpan::new(Stmt::Expression(Box::new(expr)), expr_span),
                ]),
                span,
            )
        }
        None => body,
    };
    let span = Span::union_span(begin_span, body.span);
    let body = WithSpan::new(Stmt::While(Box::new(condition), Box::new(body)), span);
    let body = match initializer {
        Some(stmt) => {
            let span = Span::union_span(stmt.span, body.span);
            WithSpan::new(Stmt::Block(vec![stmt, body]), span)
        }
        None => body,
    };

    Ok(body)
}

fn parse_return_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // return
    let mut expr = None;
    if !it.check(TokenKind::Semicolon) {
        expr = Some(parse_expr(it)?);
    }
    let end_span = it.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;
    Ok(WithSpan::new(
        Stmt::Return(expr.map(Box::new)),
        Span::union_span(begin_span, end_span),
    ))
}

fn parse_expr_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let expr = parse_expr(it)?;
    let end_span = it.expect(TokenKind::Semicolon, "Expect ';' after value.")?;

    let span = Span::union_span(expr.span, end_span);
    Ok(WithSpan::new(Stmt::Expression(Box::new(expr)), span))
}

fn parse_block_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // {
    let mut statements: Vec<WithSpan<Stmt>> = Vec::new();
    while !it.check(TokenKind::RightBrace) && !it.is_eof() {
        statements.push(parse_declaration(it)?);
    }
    let end_span = it.expect(TokenKind::RightBrace, "Expect '}' after block.")?;
    Ok(WithSpan::new(
        Stmt::Block(statements),
        Span::union_span(begin_span, end_span),
    ))
}

fn parse_while_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // while
    it.expect(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
    let condition = parse_expr(it)?;
    it.expect(TokenKind::RightParen, "Expect ')' after condition.")?;
    let statement = parse_statement(it)?;
    let span = Span::union_span(begin_span, statement.span);
    Ok(WithSpan::new(
        Stmt::While(Box::new(condition), Box::new(statement)),
        span,
    ))
}

fn parse_if_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // if
    it.expect(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
    let condition = parse_expr(it)?;
    it.expect(TokenKind::RightParen, "Expect ')' after condition.")?;
    let if_stmt = parse_statement(it)?;
    let mut end_span = if_stmt.span;
    let mut else_stmt: Option<WithSpan<Stmt>> = None;

    if it.optionally(TokenKind::Else) {
        let stmt = parse_statement(it)?;
        end_span = stmt.span;
        else_stmt = Some(stmt);
    }

    Ok(WithSpan::new(
        Stmt::If(
            Box::new(condition),
            Box::new(if_stmt),
            else_stmt.map(Box::new),
        ),
        Span::union_span(begin_span, end_span),
    ))
}

fn parse_print_statement(it: &mut Parser) -> Result<WithSpan<Stmt>, ()> {
    let begin_span = it.advance().span; // print
    let expr = parse_expr(it)?;
    let end_span = it.expect(TokenKind::Semicolon, "Expect ';' after value.")?;
    Ok(WithSpan::new(
        Stmt::Print(Box::new(expr)),
        Span::union_span(begin_span, end_span),
    ))
}

pub fn parse(it: &mut Parser) -> Result<Vec<WithSpan<Stmt>>, ()> {
    parse_program(it)
}
