use crate::position::{Diagnostic, Span, WithSpan};
use crate::token::{Token, TokenKind};

/// Token cursor shared by the expression and statement parsers. Errors are
/// recorded as diagnostics; the grammar functions signal failure with a bare
/// `Err(())` and the driver reads the diagnostics back.
pub struct Parser<'a> {
    tokens: &'a [WithSpan<Token>],
    cursor: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [WithSpan<Token>]) -> Self {
        Parser {
            tokens,
            cursor: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn error<S: Into<String>>(&mut self, message: S, span: Span) {
        self.diagnostics.push(Diagnostic {
            span,
            message: message.into(),
        });
    }

    pub fn is_eof(&self) -> bool {
        self.peek() == TokenKind::Eof
    }

    pub fn peek(&self) -> TokenKind {
        self.peek_token().into()
    }

    pub fn peek_token(&self) -> &'a WithSpan<Token> {
        let tokens = self.tokens;
        &tokens[self.cursor]
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Consumes and returns the current token; the `Eof` token is never
    /// consumed, so the stream can be over-read safely.
    pub fn advance(&mut self) -> &'a WithSpan<Token> {
        let tokens = self.tokens;
        let token = &tokens[self.cursor];
        if token.value != Token::Eof {
            self.cursor += 1;
        }
        token
    }

    pub fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Span, ()> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            let span = self.peek_token().span;
            self.error(message, span);
            Err(())
        }
    }

    pub fn optionally(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Discards tokens up to the next plausible statement boundary: just past
    /// a semicolon, or just before a statement keyword.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_eof() {
            if self.tokens[self.cursor - 1].value == Token::Semicolon {
                return;
            }

            match self.peek() {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
