use lox_bytecode::chunk::Value;
use lox_bytecode::{disasm, opcode, Chunk};
use lox_syntax::position::{LineOffsets, WithSpan};
use lox_syntax::token::{Token, TokenKind};
use lox_syntax::tokenizer;

#[allow(dead_code)]
#[derive(PartialEq, PartialOrd, Copy, Clone)]
enum Precedence {
    None,
    Assignment, // =
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

impl Precedence {
    fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call => Precedence::Primary,
            Precedence::Primary => Precedence::Primary,
        }
    }
}

type ParseFn<'a> = fn(&mut Compiler<'a>);

struct ParseRule<'a> {
    prefix: Option<ParseFn<'a>>,
    infix: Option<ParseFn<'a>>,
    precedence: Precedence,
}

/// The rule table of the Pratt compiler. Only the arithmetic expression
/// subset has rules; every other token fails as `Expect expression.`.
fn rule<'a>(kind: TokenKind) -> ParseRule<'a> {
    match kind {
        TokenKind::LeftParen => ParseRule {
            prefix: Some(Compiler::grouping),
            infix: None,
            precedence: Precedence::None,
        },
        TokenKind::Minus => ParseRule {
            prefix: Some(Compiler::unary),
            infix: Some(Compiler::binary),
            precedence: Precedence::Term,
        },
        TokenKind::Plus => ParseRule {
            prefix: None,
            infix: Some(Compiler::binary),
            precedence: Precedence::Term,
        },
        TokenKind::Slash | TokenKind::Star => ParseRule {
            prefix: None,
            infix: Some(Compiler::binary),
            precedence: Precedence::Factor,
        },
        TokenKind::Number => ParseRule {
            prefix: Some(Compiler::number),
            infix: None,
            precedence: Precedence::None,
        },
        _ => ParseRule {
            prefix: None,
            infix: None,
            precedence: Precedence::None,
        },
    }
}

struct Compiler<'a> {
    source: &'a str,
    tokens: Vec<WithSpan<Token>>,
    line_offsets: LineOffsets,
    previous: usize,
    current: usize,
    chunk: &'a mut Chunk,
    had_error: bool,
}

/// Compiles a single expression from `source` into `chunk`, finishing with
/// `OP_RETURN`. Diagnostics go to stderr; the return value tells whether
/// compilation succeeded. Lexical errors are reported but do not by
/// themselves fail the compile.
pub fn compile(source: &str, chunk: &mut Chunk) -> bool {
    let (tokens, diagnostics) = tokenizer::tokenize(source);
    let line_offsets = LineOffsets::new(source);
    for diagnostic in &diagnostics {
        eprintln!(
            "[line {}] Error: {}",
            line_offsets.line(diagnostic.span.start),
            diagnostic.message
        );
    }

    let mut compiler = Compiler {
        source,
        tokens,
        line_offsets,
        previous: 0,
        current: 0,
        chunk,
        had_error: false,
    };

    compiler.expression();
    compiler.consume(TokenKind::Eof, "Expect end of expression.");
    compiler.end();
    !compiler.had_error
}

impl<'a> Compiler<'a> {
    fn advance(&mut self) {
        self.previous = self.current;
        if self.tokens[self.current].value != Token::Eof {
            self.current += 1;
        }
    }

    fn previous_kind(&self) -> TokenKind {
        (&self.tokens[self.previous].value).into()
    }

    fn current_kind(&self) -> TokenKind {
        (&self.tokens[self.current].value).into()
    }

    fn consume(&mut self, expected: TokenKind, message: &str) {
        if self.current_kind() == expected {
            self.advance();
            return;
        }

        self.error_at_current(message);
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let prefix = rule(self.previous_kind()).prefix;
        let prefix = match prefix {
            Some(prefix) => prefix,
            None => {
                self.error("Expect expression.");
                return;
            }
        };

        prefix(self);

        while precedence <= rule(self.current_kind()).precedence {
            self.advance();
            if let Some(infix) = rule(self.previous_kind()).infix {
                infix(self);
            }
        }
    }

    fn number(&mut self) {
        let value = match &self.tokens[self.previous].value {
            Token::Number(value) => *value,
            _ => return,
        };
        self.emit_constant(value);
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self) {
        let operator = self.previous_kind();

        // Compile the operand first; negation applies to its result.
        self.parse_precedence(Precedence::Unary);

        if operator == TokenKind::Minus {
            self.emit_byte(opcode::NEGATE);
        }
    }

    fn binary(&mut self) {
        let operator = self.previous_kind();
        let precedence = rule(operator).precedence;
        self.parse_precedence(precedence.next());

        match operator {
            TokenKind::Plus => self.emit_byte(opcode::ADD),
            TokenKind::Minus => self.emit_byte(opcode::SUBTRACT),
            TokenKind::Star => self.emit_byte(opcode::MULTIPLY),
            TokenKind::Slash => self.emit_byte(opcode::DIVIDE),
            _ => (),
        }
    }

    fn emit_constant(&mut self, value: Value) {
        let constant = self.make_constant(value);
        self.emit_bytes(opcode::CONSTANT, constant);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let constant = self.chunk.add_constant(value);
        if constant > u8::MAX as usize {
            self.error("Too many constants in one chunk.");
            return 0;
        }

        constant as u8
    }

    fn emit_byte(&mut self, byte: u8) {
        let line = self.line_offsets.line(self.tokens[self.previous].span.start);
        self.chunk.write(byte, line);
    }

    fn emit_bytes(&mut self, first: u8, second: u8) {
        self.emit_byte(first);
        self.emit_byte(second);
    }

    fn end(&mut self) {
        self.emit_byte(opcode::RETURN);

        if std::env::var("DEBUG_PRINT_CODE").as_deref() == Ok("1") && !self.had_error {
            print!("{}", disasm::disassemble(self.chunk, "code"));
        }
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn error_at(&mut self, index: usize, message: &str) {
        let token = &self.tokens[index];
        let line = self.line_offsets.line(token.span.start);
        let location = if token.value == Token::Eof {
            " at end".to_string()
        } else {
            let lexeme = &self.source[token.span.start.0 as usize..token.span.end.0 as usize];
            format!(" at '{}'", lexeme)
        };
        eprintln!("[line {}] Error{}: {}", line, location, message);
        self.had_error = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lox_bytecode::opcode::*;

    fn compile_str(source: &str) -> Option<Chunk> {
        let mut chunk = Chunk::new();
        if compile(source, &mut chunk) {
            Some(chunk)
        } else {
            None
        }
    }

    #[test]
    fn test_constant() {
        let chunk = compile_str("1.2").unwrap();
        assert_eq!(chunk.code(), &[CONSTANT, 0, RETURN]);
        assert_eq!(chunk.constants(), &[1.2]);
    }

    #[test]
    fn test_precedence() {
        let chunk = compile_str("1 + 2 * 3").unwrap();
        assert_eq!(
            chunk.code(),
            &[CONSTANT, 0, CONSTANT, 1, CONSTANT, 2, MULTIPLY, ADD, RETURN]
        );
        assert_eq!(chunk.constants(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_left_associativity() {
        let chunk = compile_str("1 - 2 - 3").unwrap();
        assert_eq!(
            chunk.code(),
            &[CONSTANT, 0, CONSTANT, 1, SUBTRACT, CONSTANT, 2, SUBTRACT, RETURN]
        );
    }

    #[test]
    fn test_grouping_and_negation() {
        let chunk = compile_str("(-1 + 2) * 3 - -4").unwrap();
        assert_eq!(
            chunk.code(),
            &[
                CONSTANT, 0, NEGATE, CONSTANT, 1, ADD, CONSTANT, 2, MULTIPLY, CONSTANT, 3,
                NEGATE, SUBTRACT, RETURN
            ]
        );
        assert_eq!(chunk.constants(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_lines_follow_tokens() {
        let chunk = compile_str("1 +\n2").unwrap();
        assert_eq!(chunk.code(), &[CONSTANT, 0, CONSTANT, 1, ADD, RETURN]);
        assert_eq!(chunk.lines(), &[1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_errors() {
        assert!(compile_str("(1").is_none());
        assert!(compile_str("1 2").is_none());
        assert!(compile_str("+").is_none());
        assert!(compile_str("\"strings are not supported\"").is_none());
        assert!(compile_str("").is_none());
    }

    #[test]
    fn test_constant_limit() {
        let source = (0..257).map(|i| i.to_string()).collect::<Vec<_>>().join(" + ");
        assert!(compile_str(&source).is_none());

        let source = (0..256).map(|i| i.to_string()).collect::<Vec<_>>().join(" + ");
        assert!(compile_str(&source).is_some());
    }
}
