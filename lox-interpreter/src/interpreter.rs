use crate::callable::{Clock, LoxFunction};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::value::Value;
use fxhash::FxHashMap;
use lox_syntax::ast::*;
use lox_syntax::position::{Span, WithSpan};
use std::io::{self, Write};
use std::rc::Rc;

/// Outcome of executing a statement: fall through to the next one, or unwind
/// to the nearest function call carrying a return value. A `Return` never
/// crosses a function boundary; `LoxFunction::call` catches it.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<Environment>,
    environment: Rc<Environment>,
    locals: FxHashMap<Span, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_output(Box::new(io::stdout()))
    }

    /// Builds an interpreter whose `print` statements write to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Interpreter {
        let globals = Environment::new();
        globals.define("clock".to_string(), Value::Callable(Rc::new(Clock)));
        Interpreter {
            environment: globals.clone(),
            globals,
            locals: FxHashMap::default(),
            output,
        }
    }

    /// Side channel filled by the resolver: hop distances keyed by the span
    /// of each resolved variable reference.
    pub fn resolve(&mut self, locals: FxHashMap<Span, usize>) {
        self.locals.extend(locals);
    }

    pub fn interpret(&mut self, statements: &[WithSpan<Stmt>]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &WithSpan<Stmt>) -> Result<Flow, RuntimeError> {
        match &statement.value {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)
                    .map_err(|e| RuntimeError::new(expr.span, format!("I/O error: {}.", e)))?;
                Ok(Flow::Normal)
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.value.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(&self.environment);
                self.execute_block(statements, environment)
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(condition, body) => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => (),
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Function(declaration) => {
                let function = LoxFunction::new(declaration.clone(), self.environment.clone());
                self.environment
                    .define(declaration.name.value.clone(), Value::Callable(Rc::new(function)));
                Ok(Flow::Normal)
            }
        }
    }

    /// Runs `statements` inside `environment`. The previous environment is
    /// restored on every exit path, including errors and returns.
    pub fn execute_block(
        &mut self,
        statements: &[WithSpan<Stmt>],
        environment: Rc<Environment>,
    ) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.run_block(statements);
        self.environment = previous;
        result
    }

    fn run_block(&mut self, statements: &[WithSpan<Stmt>]) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match self.execute(statement)? {
                Flow::Normal => (),
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    pub fn evaluate(&mut self, expr: &WithSpan<Expr>) -> Result<Value, RuntimeError> {
        match &expr.value {
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::String(value) => Ok(Value::String(value.as_str().into())),
            Expr::Boolean(value) => Ok(Value::Boolean(*value)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary(operator, right) => {
                let right = self.evaluate(right)?;
                match operator.value {
                    UnaryOperator::Minus => match right {
                        Value::Number(value) => Ok(Value::Number(-value)),
                        _ => Err(RuntimeError::new(operator.span, "Operand must be a number.")),
                    },
                    UnaryOperator::Bang => Ok(Value::Boolean(!right.is_truthy())),
                }
            }
            Expr::Binary(left, operator, right) => self.binary(left, operator, right),
            Expr::Logical(left, operator, right) => {
                let left = self.evaluate(left)?;
                // Short circuit: hand back the operand that decided, not a
                // coerced boolean.
                match operator {
                    LogicalOperator::Or if left.is_truthy() => Ok(left),
                    LogicalOperator::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }
            Expr::Variable(name) => self.look_up_variable(name),
            Expr::Assign(name, value) => {
                let value = self.evaluate(value)?;
                self.assign_variable(name, value)
            }
            Expr::Call(callee, paren, arguments) => self.call(callee, *paren, arguments),
        }
    }

    fn binary(
        &mut self,
        left: &WithSpan<Expr>,
        operator: &WithSpan<BinaryOperator>,
        right: &WithSpan<Expr>,
    ) -> Result<Value, RuntimeError> {
        use BinaryOperator::*;

        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match (operator.value, left, right) {
            (Plus, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Plus, Value::String(a), Value::String(b)) => {
                Ok(Value::String(format!("{}{}", a, b).into()))
            }
            (Plus, _, _) => Err(RuntimeError::new(
                operator.span,
                "Operands must be two numbers or two strings.",
            )),

            (Minus, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            (Star, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            (Slash, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            (Greater, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a > b)),
            (GreaterEqual, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a >= b)),
            (Less, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a < b)),
            (LessEqual, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a <= b)),

            (BangEqual, a, b) => Ok(Value::Boolean(a != b)),
            (EqualEqual, a, b) => Ok(Value::Boolean(a == b)),

            (Minus | Star | Slash | Greater | GreaterEqual | Less | LessEqual, _, _) => Err(
                RuntimeError::new(operator.span, "Operands must be numbers."),
            ),
        }
    }

    fn look_up_variable(&mut self, name: &WithSpan<Identifier>) -> Result<Value, RuntimeError> {
        let value = match self.locals.get(&name.span) {
            Some(&depth) => self.environment.get_at(depth, &name.value),
            None => self.globals.get(&name.value),
        };

        value.ok_or_else(|| {
            RuntimeError::new(name.span, format!("Undefined variable '{}'.", name.value))
        })
    }

    fn assign_variable(
        &mut self,
        name: &WithSpan<Identifier>,
        value: Value,
    ) -> Result<Value, RuntimeError> {
        let assigned = match self.locals.get(&name.span) {
            Some(&depth) => self
                .environment
                .assign_at(depth, &name.value, value.clone()),
            None => self.globals.assign(&name.value, value.clone()),
        };

        if assigned {
            Ok(value)
        } else {
            Err(RuntimeError::new(
                name.span,
                format!("Undefined variable '{}'.", name.value),
            ))
        }
    }

    fn call(
        &mut self,
        callee: &WithSpan<Expr>,
        paren: Span,
        arguments: &[WithSpan<Expr>],
    ) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        match callee {
            Value::Callable(function) => {
                if args.len() != function.arity() {
                    return Err(RuntimeError::new(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            function.arity(),
                            args.len()
                        ),
                    ));
                }
                function.call(self, args)
            }
            _ => Err(RuntimeError::new(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(source: &str) -> Result<String, RuntimeError> {
        let ast = lox_syntax::parse(source).expect("test source should parse");
        let locals = crate::resolver::resolve(&ast)?;
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
        interpreter.resolve(locals);
        interpreter.interpret(&ast)?;
        let bytes = buffer.0.borrow();
        Ok(String::from_utf8(bytes.clone()).expect("output should be utf-8"))
    }

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let expr = lox_syntax::parse_expr(source).expect("test source should parse");
        Interpreter::new().evaluate(&expr)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Number(9.0)));
        assert_eq!(eval("-4 / 2"), Ok(Value::Number(-2.0)));
        assert_eq!(eval("\"foo\" + \"bar\""), Ok(Value::from("foobar")));
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_eq!(eval("1 < 2"), Ok(Value::Boolean(true)));
        assert_eq!(eval("2 <= 2"), Ok(Value::Boolean(true)));
        assert_eq!(eval("1 == \"1\""), Ok(Value::Boolean(false)));
        assert_eq!(eval("nil == nil"), Ok(Value::Boolean(true)));
        assert_eq!(eval("\"a\" != \"b\""), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_unary() {
        assert_eq!(eval("!nil"), Ok(Value::Boolean(true)));
        assert_eq!(eval("!0"), Ok(Value::Boolean(false)));
        assert_eq!(eval("!\"\""), Ok(Value::Boolean(false)));
        assert_eq!(
            eval("-\"muffin\"").unwrap_err().message,
            "Operand must be a number."
        );
    }

    #[test]
    fn test_operand_errors() {
        assert_eq!(
            eval("1 + \"one\"").unwrap_err().message,
            "Operands must be two numbers or two strings."
        );
        assert_eq!(
            eval("1 < \"one\"").unwrap_err().message,
            "Operands must be numbers."
        );
        assert_eq!(
            eval("nil * 2").unwrap_err().message,
            "Operands must be numbers."
        );
    }

    #[test]
    fn test_logical_returns_deciding_operand() {
        assert_eq!(eval("\"hi\" or 2"), Ok(Value::from("hi")));
        assert_eq!(eval("nil or \"yes\""), Ok(Value::from("yes")));
        assert_eq!(eval("nil and 2"), Ok(Value::Nil));
        assert_eq!(eval("1 and 2"), Ok(Value::Number(2.0)));
    }

    #[test]
    fn test_print_addition() {
        assert_eq!(run("print 1 + 2;"), Ok("3\n".to_string()));
    }

    #[test]
    fn test_globals() {
        assert_eq!(
            run("var a = 1; var b = 2; print a + b;"),
            Ok("3\n".to_string())
        );
    }

    #[test]
    fn test_block_scoping() {
        assert_eq!(
            run("var a = 1; { var a = 2; print a; } print a;"),
            Ok("2\n1\n".to_string())
        );
    }

    #[test]
    fn test_closure_captures_declaration_scope() {
        let source = "var a = \"global\";
{
  fun show() { print a; }
  show();
  var a = \"shadow\";
  show();
}";
        assert_eq!(run(source), Ok("global\nglobal\n".to_string()));
    }

    #[test]
    fn test_counter_closure() {
        let source = "fun makeCounter() {
  var count = 0;
  fun increment() {
    count = count + 1;
    return count;
  }
  return increment;
}
var counter = makeCounter();
print counter();
print counter();";
        assert_eq!(run(source), Ok("1\n2\n".to_string()));
    }

    #[test]
    fn test_fib() {
        let source =
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);";
        assert_eq!(run(source), Ok("55\n".to_string()));
    }

    #[test]
    fn test_for_loop() {
        assert_eq!(
            run("for (var i = 0; i < 3; i = i + 1) print i;"),
            Ok("0\n1\n2\n".to_string())
        );
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            run("var i = 3; while (i > 0) { print i; i = i - 1; }"),
            Ok("3\n2\n1\n".to_string())
        );
    }

    #[test]
    fn test_if_else() {
        assert_eq!(
            run("if (1 > 2) print \"bigger\"; else print \"smaller\";"),
            Ok("smaller\n".to_string())
        );
    }

    #[test]
    fn test_return_unwinds_loops_but_not_callers() {
        let source = "fun firstOver(limit) {
  for (var i = 0; ; i = i + 1) {
    if (i > limit) return i;
  }
}
print firstOver(3);
print \"after\";";
        assert_eq!(run(source), Ok("4\nafter\n".to_string()));
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(
            run("fun noop() {} print noop();"),
            Ok("nil\n".to_string())
        );
    }

    #[test]
    fn test_function_display() {
        assert_eq!(
            run("fun greet() {} print greet; print clock;"),
            Ok("<fn greet>\n<native fn>\n".to_string())
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run("print missing;").unwrap_err().message,
            "Undefined variable 'missing'."
        );
        assert_eq!(
            run("missing = 1;").unwrap_err().message,
            "Undefined variable 'missing'."
        );
    }

    #[test]
    fn test_block_exit_restores_environment() {
        // The block-local binding must not leak, even though the block body
        // already executed when the lookup fails.
        assert_eq!(
            run("{ var hidden = 1; } print hidden;").unwrap_err().message,
            "Undefined variable 'hidden'."
        );
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            run("fun f(a, b) {} f(1);").unwrap_err().message,
            "Expected 2 arguments but got 1."
        );
        assert_eq!(
            run("clock(1);").unwrap_err().message,
            "Expected 0 arguments but got 1."
        );
    }

    #[test]
    fn test_calling_non_callable() {
        assert_eq!(
            run("\"not a function\"();").unwrap_err().message,
            "Can only call functions and classes."
        );
    }

    #[test]
    fn test_clock_returns_whole_seconds() {
        let value = eval("clock()").unwrap();
        match value {
            Value::Number(seconds) => {
                assert_eq!(seconds, seconds.trunc());
                assert!(seconds > 0.0);
            }
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_an_expression() {
        assert_eq!(
            run("var a = 1; var b = a = 5; print a; print b;"),
            Ok("5\n5\n".to_string())
        );
    }
}
