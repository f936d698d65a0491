use crate::ast::Identifier;
use crate::parser::Parser;
use crate::position::WithSpan;
use crate::token::Token;

pub fn expect_identifier(
    p: &mut Parser,
    message: &str,
) -> Result<WithSpan<Identifier>, ()> {
    let token = p.advance();
    match &token.value {
        Token::Identifier(ident) => Ok(WithSpan::new(ident.clone(), token.span)),
        _ => {
            p.error(message, token.span);
            Err(())
        }
    }
}
