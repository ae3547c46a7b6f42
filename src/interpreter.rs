use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::{LoxFunction, Value};

/// Non-local signal propagating out of statement execution: either a
/// `return` unwinding to the nearest enclosing call, or a runtime error.
/// Keeping `return` out of the error channel lets every call site catch it
/// with one `match` while errors pass through untouched.
#[derive(Debug)]
pub enum Unwind {
    Return(Value),
    Raise(LoxError),
}

impl From<LoxError> for Unwind {
    fn from(e: LoxError) -> Unwind {
        Unwind::Raise(e)
    }
}

impl From<std::io::Error> for Unwind {
    fn from(e: std::io::Error) -> Unwind {
        Unwind::Raise(LoxError::Io(e))
    }
}

/// Tree-walking evaluator.
///
/// One `Interpreter` outlives any number of `interpret` calls: the globals
/// frame and the binding-distance table persist, which is what makes the
/// REPL's cross-line state work.  Program output goes through the injected
/// writer so tests can capture it.
pub struct Interpreter<W: Write> {
    output: W,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        Interpreter {
            output,
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
        }
    }

    /// Record a resolved local: `id` refers to a binding exactly `depth`
    /// frames out from the environment current at its evaluation.
    pub(crate) fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    #[cfg(test)]
    pub(crate) fn resolved_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}

                // The resolver rejects top-level `return`.
                Err(Unwind::Return(_)) => {}

                Err(Unwind::Raise(e)) => return Err(e),
            }
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> std::result::Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let child = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, child)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                // The closure captures the environment current at the
                // declaration, not the caller's.
                let function = LoxFunction {
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                };

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return(value))
            }
        }
    }

    /// Run `statements` with `environment` as the current frame, restoring
    /// the previous frame on every exit path, unwinds included.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> std::result::Result<(), Unwind> {
        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);

        self.environment = environment;

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(unwind) => {
                    self.environment = previous;
                    return Err(unwind);
                }
            }
        }

        self.environment = previous;

        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(literal_value(value)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => {
                        self.globals
                            .borrow_mut()
                            .assign(&name.lexeme, value.clone(), name.line)?
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            Expr::Let {
                name,
                initializer,
                body,
            } => {
                // Strict: the initializer runs in the enclosing frame,
                // before the binding exists.
                let value = self.evaluate(initializer)?;

                let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);

                self.environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &previous,
                ))));
                self.environment.borrow_mut().define(&name.lexeme, value);

                let result = self.evaluate(body);

                self.environment = previous;

                result
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => {
                Environment::get_at(&self.environment, distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                other => Err(LoxError::runtime(
                    operator.line,
                    format!("operand {} must be a number", quoted(&other)),
                )),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(LoxError::runtime(
                operator.line,
                format!("invalid unary operator '{}'", operator.lexeme),
            )),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;

        match operator.token_type {
            // Short-circuit, yielding the raw operand rather than a bool.
            TokenType::OR => {
                if is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            TokenType::AND => {
                if !is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            _ => Err(LoxError::runtime(
                operator.line,
                format!("invalid logical operator '{}'", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                (left_val, right_val) => Err(LoxError::runtime(
                    operator.line,
                    format!(
                        "operands ({}, {}) must be two numbers or two strings",
                        quoted(&left_val),
                        quoted(&right_val)
                    ),
                )),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Number(a * b))
            }

            // IEEE-754 throughout: dividing by zero yields an infinity.
            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            _ => Err(LoxError::runtime(
                operator.line,
                format!("invalid binary operator '{}'", operator.lexeme),
            )),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value> {
        let callee_val: Value = self.evaluate(callee)?;

        let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }

        match callee_val {
            Value::NativeFunction { arity, func, .. } => {
                if args.len() != arity {
                    return Err(arity_error(paren, arity, args.len()));
                }

                func(&args)
            }

            Value::Function(function) => {
                if args.len() != function.arity() {
                    return Err(arity_error(paren, function.arity(), args.len()));
                }

                self.call_function(&function, args)
            }

            _ => Err(LoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            )),
        }
    }

    /// Invoke a user function: one fresh frame whose parent is the
    /// function's captured environment, parameters bound in it, body run
    /// in it.  A `return` unwinds to here; falling off the end yields nil.
    fn call_function(&mut self, function: &LoxFunction, arguments: Vec<Value>) -> Result<Value> {
        let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &function.closure,
        ))));

        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        match self.execute_block(&function.declaration.body, environment) {
            Ok(()) => Ok(Value::Nil),
            Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Raise(e)) => Err(e),
        }
    }
}

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    if let (Value::Number(a), Value::Number(b)) = (left, right) {
        Ok((*a, *b))
    } else {
        Err(LoxError::runtime(
            operator.line,
            format!(
                "operands {}, {} must all be numbers",
                quoted(left),
                quoted(right)
            ),
        ))
    }
}

fn arity_error(paren: &Token, expected: usize, got: usize) -> LoxError {
    LoxError::runtime(
        paren.line,
        format!("Expected {} arguments but got {}.", expected, got),
    )
}

/// Error-message rendering: strings quoted, everything else in display form.
fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}

fn clock_native(_args: &[Value]) -> Result<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoxError::runtime(0, format!("clock error: {}", e)))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
