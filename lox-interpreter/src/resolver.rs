//! Static variable resolution: a pass over the AST that computes, for every
//! variable reference, how many environments to hop outward at runtime. The
//! side table is keyed by the span of the reference, which is unique per
//! reference and fixed at parse time.

use crate::error::RuntimeError;
use fxhash::FxHashMap;
use lox_syntax::ast::*;
use lox_syntax::position::{Span, WithSpan};

#[derive(PartialEq, Copy, Clone)]
enum FunctionType {
    None,
    Function,
}

pub struct Resolver {
    // Innermost scope last. A `false` entry is declared but not yet
    // initialized; reading it is an error.
    scopes: Vec<FxHashMap<String, bool>>,
    locals: FxHashMap<Span, usize>,
    current_function: FunctionType,
}

/// Resolves a program, returning the hop-distance table consumed by
/// `Interpreter::resolve`.
pub fn resolve(statements: &[WithSpan<Stmt>]) -> Result<FxHashMap<Span, usize>, RuntimeError> {
    let mut resolver = Resolver::new();
    resolver.resolve_all(statements)?;
    Ok(resolver.locals)
}

impl Resolver {
    pub fn new() -> Resolver {
        Resolver {
            scopes: Vec::new(),
            locals: FxHashMap::default(),
            current_function: FunctionType::None,
        }
    }

    fn resolve_all(&mut self, statements: &[WithSpan<Stmt>]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.resolve_stmt(statement)?;
        }
        Ok(())
    }

    fn resolve_stmt(&mut self, statement: &WithSpan<Stmt>) -> Result<(), RuntimeError> {
        match &statement.value {
            Stmt::Block(statements) => {
                self.begin_scope();
                let result = self.resolve_all(statements);
                self.end_scope();
                result
            }
            Stmt::Var(name, initializer) => {
                self.declare(name)?;
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer)?;
                }
                self.define(name);
                Ok(())
            }
            Stmt::Function(declaration) => {
                self.declare(&declaration.name)?;
                self.define(&declaration.name);
                self.resolve_function(declaration)
            }
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::If(condition, then_branch, else_branch) => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(condition, body) => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)
            }
            Stmt::Return(value) => {
                if self.current_function == FunctionType::None {
                    return Err(RuntimeError::new(
                        statement.span,
                        "Can't return from top-level code.",
                    ));
                }
                if let Some(value) = value {
                    self.resolve_expr(value)?;
                }
                Ok(())
            }
        }
    }

    fn resolve_expr(&mut self, expr: &WithSpan<Expr>) -> Result<(), RuntimeError> {
        match &expr.value {
            Expr::Variable(name) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.value) == Some(&false) {
                        return Err(RuntimeError::new(
                            name.span,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }
                self.resolve_local(name);
                Ok(())
            }
            Expr::Assign(name, value) => {
                self.resolve_expr(value)?;
                self.resolve_local(name);
                Ok(())
            }
            Expr::Binary(left, _, right) | Expr::Logical(left, _, right) => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }
            Expr::Call(callee, _, arguments) => {
                self.resolve_expr(callee)?;
                for argument in arguments {
                    self.resolve_expr(argument)?;
                }
                Ok(())
            }
            Expr::Grouping(inner) | Expr::Unary(_, inner) => self.resolve_expr(inner),
            Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) | Expr::Nil => Ok(()),
        }
    }

    fn resolve_function(&mut self, declaration: &FunctionDecl) -> Result<(), RuntimeError> {
        let enclosing_function = self.current_function;
        self.current_function = FunctionType::Function;
        self.begin_scope();

        let result: Result<(), RuntimeError> = (|| {
            for param in &declaration.params {
                self.declare(param)?;
                self.define(param);
            }
            self.resolve_all(&declaration.body)
        })();

        self.end_scope();
        self.current_function = enclosing_function;
        result
    }

    fn begin_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &WithSpan<Identifier>) -> Result<(), RuntimeError> {
        let scope = match self.scopes.last_mut() {
            Some(scope) => scope,
            // The global scope tolerates redeclaration.
            None => return Ok(()),
        };

        if scope.contains_key(&name.value) {
            return Err(RuntimeError::new(
                name.span,
                "Already a variable with this name in this scope.",
            ));
        }

        scope.insert(name.value.clone(), false);
        Ok(())
    }

    fn define(&mut self, name: &WithSpan<Identifier>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.value.clone(), true);
        }
    }

    fn resolve_local(&mut self, name: &WithSpan<Identifier>) {
        for (index, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.value) {
                self.locals
                    .insert(name.span, self.scopes.len() - 1 - index);
                return;
            }
        }
        // Not found in any scope: the reference stays global.
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_str(source: &str) -> Result<FxHashMap<Span, usize>, RuntimeError> {
        let ast = lox_syntax::parse(source).expect("test source should parse");
        resolve(&ast)
    }

    fn messages(result: Result<FxHashMap<Span, usize>, RuntimeError>) -> String {
        result.unwrap_err().message
    }

    #[test]
    fn test_globals_are_not_recorded() {
        let locals = resolve_str("var a = 1; print a;").unwrap();
        assert!(locals.is_empty());
    }

    #[test]
    fn test_block_local_depth() {
        let locals = resolve_str("{ var a = 1; print a; }").unwrap();
        assert_eq!(locals.values().collect::<Vec<_>>(), vec![&0]);
    }

    #[test]
    fn test_nested_depth() {
        let locals = resolve_str("{ var a = 1; { { print a; } } }").unwrap();
        assert_eq!(locals.values().collect::<Vec<_>>(), vec![&2]);
    }

    #[test]
    fn test_params_resolve_inside_function_scope() {
        let locals = resolve_str("fun f(x) { return x; }").unwrap();
        assert_eq!(locals.values().collect::<Vec<_>>(), vec![&0]);
    }

    #[test]
    fn test_own_initializer() {
        assert_eq!(
            messages(resolve_str("{ var a = a; }")),
            "Can't read local variable in its own initializer."
        );
        // At global scope the same shape is allowed.
        assert!(resolve_str("var a = a;").is_ok());
    }

    #[test]
    fn test_duplicate_declaration() {
        assert_eq!(
            messages(resolve_str("{ var a = 1; var a = 2; }")),
            "Already a variable with this name in this scope."
        );
        assert!(resolve_str("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn test_top_level_return() {
        assert_eq!(
            messages(resolve_str("return 1;")),
            "Can't return from top-level code."
        );
        assert!(resolve_str("fun f() { return 1; }").is_ok());
    }

    #[test]
    fn test_shadowing_keeps_outer_reference() {
        // The closure body is resolved before the shadowing declaration, so
        // its reference must not be recorded as a local of the block.
        let locals =
            resolve_str("var a = 1; { fun show() { print a; } show(); var a = 2; show(); }")
                .unwrap();
        // Only the two `show` call references resolve into the block scope.
        assert_eq!(locals.len(), 2);
        assert!(locals.values().all(|&depth| depth == 0));
    }
}
