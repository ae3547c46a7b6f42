//! Static resolution pass.
//!
//! A single AST walk that:
//! 1. **Builds lexical scopes**: maintains a stack of `HashMap<String, bool>`
//!    tracking declared (`false`) and fully defined (`true`) names in each
//!    nested block, function body, or `let` binding.  Globals are not
//!    tracked.
//! 2. **Enforces static rules**: reading a local in its own initializer,
//!    redeclaration in the same scope, `return` outside a function.
//! 3. **Records binding distances**: for every `Expr::Variable` and
//!    `Expr::Assign` occurrence found in some scope, calls back into the
//!    interpreter to note the lexical depth, keyed by the expression's id.
//!    Occurrences found in no scope are left unrecorded and fall through to
//!    the globals frame at runtime.
//!
//! Resolution halts on the first static error; there is no in-place
//! recovery.  A fresh `Resolver` is built per batch of statements (per REPL
//! line), all writing into the same interpreter's distance table.

use std::collections::HashMap;
use std::io::Write;

use log::{debug, info};

use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId};
use crate::interpreter::Interpreter;
use crate::stmt::Stmt;
use crate::token::Token;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

pub struct Resolver<'interp, W: Write> {
    interpreter: &'interp mut Interpreter<W>,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
}

impl<'interp, W: Write> Resolver<'interp, W> {
    pub fn new(interpreter: &'interp mut Interpreter<W>) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
        }
    }

    /// Walk all top-level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<()> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );
        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s)?;
                }

                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                self.declare(name)?;

                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }

                self.define(name);
            }

            Stmt::Function(decl) => {
                // Declared and defined before the body resolves, so the
                // function can call itself.
                self.declare(&decl.name)?;
                self.define(&decl.name);

                self.resolve_function(&decl.params, &decl.body)?;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LoxError::resolve(
                        keyword.line,
                        "Can't return from top-level code.",
                    ));
                }

                if let Some(expr) = value {
                    self.resolve_expr(expr)?;
                }
            }
        }

        Ok(())
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right)?;
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        return Err(LoxError::resolve(
                            name.line,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value)?;
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;

                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            Expr::Let {
                name,
                initializer,
                body,
            } => {
                // Strict binding: the initializer belongs to the enclosing
                // scope, only the body sees the new name.
                self.resolve_expr(initializer)?;

                self.begin_scope();
                self.declare(name)?;
                self.define(name);
                self.resolve_expr(body)?;
                self.end_scope();
            }
        }

        Ok(())
    }

    /// Enter a fresh scope for a function's parameters + body.  Parameters
    /// and body statements share one scope, mirroring the single frame the
    /// evaluator builds per invocation.
    fn resolve_function(&mut self, params: &[Token], body: &[Stmt]) -> Result<()> {
        let enclosing = self.current_function;
        self.current_function = FunctionType::Function;

        self.begin_scope();

        for param in params {
            self.declare(param)?;
            self.define(param);
        }

        for stmt in body {
            self.resolve_stmt(stmt)?;
        }

        self.end_scope();

        self.current_function = enclosing;

        Ok(())
    }

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                return Err(LoxError::resolve(
                    name.line,
                    "Variable already declared in this scope",
                ));
            }

            scope.insert(name.lexeme.clone(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Record this variable occurrence as a local at its lexical depth, or
    /// leave it unrecorded (global) when no scope binds it.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve_source(source: &str) -> (Vec<Stmt>, Interpreter<Vec<u8>>, Result<()>) {
        let (tokens, scan_errors) = Scanner::new(source.as_bytes().to_vec()).scan_tokens();
        assert!(scan_errors.is_empty(), "scan errors: {:?}", scan_errors);

        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let mut interpreter = Interpreter::new(Vec::new());
        let outcome = Resolver::new(&mut interpreter).resolve(&statements);

        (statements, interpreter, outcome)
    }

    /// Digs the sole `print`ed variable expression out of a statement tree.
    fn printed_variable_id(statements: &[Stmt]) -> Option<ExprId> {
        fn from_stmt(stmt: &Stmt) -> Option<ExprId> {
            match stmt {
                Stmt::Print(Expr::Variable { id, .. }) => Some(*id),
                Stmt::Block(stmts) => stmts.iter().find_map(from_stmt),
                Stmt::Function(decl) => decl.body.iter().find_map(from_stmt),
                _ => None,
            }
        }

        statements.iter().find_map(from_stmt)
    }

    #[test]
    fn same_block_reference_resolves_at_depth_zero() {
        let (statements, interpreter, outcome) = resolve_source("{ var a = 1; print a; }");

        assert!(outcome.is_ok());
        let id = printed_variable_id(&statements).expect("no printed variable");
        assert_eq!(interpreter.resolved_depth(id), Some(0));
    }

    #[test]
    fn nested_block_reference_resolves_one_frame_out() {
        let (statements, interpreter, outcome) = resolve_source("{ var a = 1; { print a; } }");

        assert!(outcome.is_ok());
        let id = printed_variable_id(&statements).expect("no printed variable");
        assert_eq!(interpreter.resolved_depth(id), Some(1));
    }

    #[test]
    fn global_reference_is_left_unrecorded() {
        let (statements, interpreter, outcome) = resolve_source("var a = 1; print a;");

        assert!(outcome.is_ok());
        let id = printed_variable_id(&statements).expect("no printed variable");
        assert_eq!(interpreter.resolved_depth(id), None);
    }

    #[test]
    fn function_body_sees_enclosing_local_through_param_scope() {
        let (statements, interpreter, outcome) =
            resolve_source("{ var a = 1; fun f(x) { print a; } }");

        assert!(outcome.is_ok());
        let id = printed_variable_id(&statements).expect("no printed variable");
        // One frame for f's params+body, one to the block that binds `a`.
        assert_eq!(interpreter.resolved_depth(id), Some(1));
    }

    #[test]
    fn own_initializer_read_is_an_error() {
        let (_, _, outcome) = resolve_source("{ var x = x; }");

        match outcome {
            Err(LoxError::Resolve { message, .. }) => {
                assert!(message.contains("own initializer"), "got: {}", message);
            }
            other => panic!("expected resolve error, got {:?}", other),
        }
    }

    #[test]
    fn top_level_return_is_an_error() {
        let (_, _, outcome) = resolve_source("return 1;");

        assert!(matches!(outcome, Err(LoxError::Resolve { .. })));
    }

    #[test]
    fn duplicate_declaration_in_scope_is_an_error() {
        let (_, _, outcome) = resolve_source("{ var a = 1; var a = 2; }");

        assert!(matches!(outcome, Err(LoxError::Resolve { .. })));
    }

    #[test]
    fn let_initializer_resolves_against_enclosing_scope() {
        // The `x` inside the initializer refers to the outer binding, not
        // the one being introduced.
        let (_, _, outcome) = resolve_source("{ var x = 1; print let x = x + 1 in x; }");

        assert!(outcome.is_ok());
    }
}
