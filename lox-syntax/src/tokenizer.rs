use super::token::Token;
use crate::position::*;
use std::iter::Peekable;
use std::str::Chars;

struct Scanner<'a> {
    current_position: BytePos,
    it: Peekable<Chars<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(buf: &str) -> Scanner {
        Scanner {
            current_position: BytePos::default(),
            it: buf.chars().peekable(),
        }
    }

    fn next(&mut self) -> Option<char> {
        let next = self.it.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    fn peek(&mut self) -> Option<&char> {
        self.it.peek()
    }

    // Consume next char if it matches
    fn consume_if<F>(&mut self, x: F) -> bool
    where
        F: Fn(char) -> bool,
    {
        if let Some(&ch) = self.peek() {
            if x(ch) {
                self.next();
                true
            } else {
                false
            }
        } else {
            false
        }
    }

    // Consume next char if the one after it matches (so .3 eats . only when 3 is numeric)
    fn consume_if_next<F>(&mut self, x: F) -> bool
    where
        F: Fn(char) -> bool,
    {
        let mut it = self.it.clone();
        if it.next().is_none() {
            return false;
        }

        if let Some(&ch) = it.peek() {
            if x(ch) {
                self.next();
                true
            } else {
                false
            }
        } else {
            false
        }
    }

    fn consume_while<F>(&mut self, x: F) -> Vec<char>
    where
        F: Fn(char) -> bool,
    {
        let mut chars: Vec<char> = Vec::new();
        while let Some(&ch) = self.peek() {
            if x(ch) {
                self.next();
                chars.push(ch);
            } else {
                break;
            }
        }
        chars
    }
}

struct Lexer<'a> {
    it: Scanner<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(buf: &str) -> Lexer {
        Lexer {
            it: Scanner::new(buf),
            diagnostics: Vec::new(),
        }
    }

    fn error<S: Into<String>>(&mut self, message: S, span: Span) {
        self.diagnostics.push(Diagnostic {
            span,
            message: message.into(),
        });
    }

    fn match_token(&mut self, ch: char, start: BytePos) -> Option<Token> {
        match ch {
            '=' => Some(self.either('=', Token::EqualEqual, Token::Equal)),
            '!' => Some(self.either('=', Token::BangEqual, Token::Bang)),
            '<' => Some(self.either('=', Token::LessEqual, Token::Less)),
            '>' => Some(self.either('=', Token::GreaterEqual, Token::Greater)),
            '/' => {
                if self.it.consume_if(|ch| ch == '/') {
                    self.it.consume_while(|ch| ch != '\n');
                    None
                } else {
                    Some(Token::Slash)
                }
            }
            ' ' => None,
            '\n' => None,
            '\t' => None,
            '\r' => None,
            '"' => self.string(),
            x if x.is_ascii_digit() => self.number(x),
            x if x.is_ascii_alphabetic() || x == '_' => Some(self.identifier(x)),
            '.' => Some(Token::Dot),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            '{' => Some(Token::LeftBrace),
            '}' => Some(Token::RightBrace),
            ',' => Some(Token::Comma),
            '-' => Some(Token::Minus),
            '+' => Some(Token::Plus),
            ';' => Some(Token::Semicolon),
            '*' => Some(Token::Star),
            c => {
                let span = Span::new(start, self.it.current_position);
                self.error(format!("Unexpected character: {}", c), span);
                None
            }
        }
    }

    fn either(&mut self, to_match: char, matched: Token, unmatched: Token) -> Token {
        if self.it.consume_if(|ch| ch == to_match) {
            matched
        } else {
            unmatched
        }
    }

    fn keyword(&self, identifier: &str) -> Option<Token> {
        match identifier {
            "and" => Some(Token::And),
            "class" => Some(Token::Class),
            "else" => Some(Token::Else),
            "false" => Some(Token::False),
            "for" => Some(Token::For),
            "fun" => Some(Token::Fun),
            "if" => Some(Token::If),
            "nil" => Some(Token::Nil),
            "or" => Some(Token::Or),
            "print" => Some(Token::Print),
            "return" => Some(Token::Return),
            "super" => Some(Token::Super),
            "this" => Some(Token::This),
            "true" => Some(Token::True),
            "var" => Some(Token::Var),
            "while" => Some(Token::While),
            _ => None,
        }
    }

    fn identifier(&mut self, x: char) -> Token {
        let mut identifier = String::new();
        identifier.push(x);
        let rest: String = self
            .it
            .consume_while(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            .into_iter()
            .collect();
        identifier.push_str(rest.as_str());
        match self.keyword(&identifier) {
            None => Token::Identifier(identifier),
            Some(token) => token,
        }
    }

    fn number(&mut self, x: char) -> Option<Token> {
        let mut number = String::new();
        number.push(x);
        let integral: String = self
            .it
            .consume_while(|ch| ch.is_ascii_digit())
            .into_iter()
            .collect();
        number.push_str(integral.as_str());
        if self.it.peek() == Some(&'.') && self.it.consume_if_next(|ch| ch.is_ascii_digit()) {
            let fraction: String = self
                .it
                .consume_while(|ch| ch.is_ascii_digit())
                .into_iter()
                .collect();
            number.push('.');
            number.push_str(fraction.as_str());
        }
        Some(Token::Number(number.parse::<f64>().unwrap()))
    }

    fn string(&mut self) -> Option<Token> {
        let string: String = self.it.consume_while(|ch| ch != '"').into_iter().collect();
        // Skip the closing "
        match self.it.next() {
            None => {
                let at_end = Span::new(self.it.current_position, self.it.current_position);
                self.error("Unterminated string.", at_end);
                None
            }
            _ => Some(Token::String(string)),
        }
    }

    fn tokenize_with_context(&mut self) -> Vec<WithSpan<Token>> {
        let mut tokens: Vec<WithSpan<Token>> = Vec::new();
        loop {
            let initial_position = self.it.current_position;
            let ch = match self.it.next() {
                None => break,
                Some(c) => c,
            };
            if let Some(token) = self.match_token(ch, initial_position) {
                tokens.push(WithSpan::new(
                    token,
                    Span::new(initial_position, self.it.current_position),
                ));
            }
        }
        let at_end = Span::new(self.it.current_position, self.it.current_position);
        tokens.push(WithSpan::new(Token::Eof, at_end));
        tokens
    }
}

/// Scans `buf` into a token stream terminated by an `Eof` token, plus the
/// lexical errors encountered along the way. Errors never abort the scan.
pub fn tokenize(buf: &str) -> (Vec<WithSpan<Token>>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(buf);
    let tokens = lexer.tokenize_with_context();
    (tokens, lexer.diagnostics)
}
