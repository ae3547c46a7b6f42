use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::value::Value;

/// One scope level: a binding map plus a link to the enclosing scope.
/// Chains are shared (`Rc`) because closures capture them, and mutable
/// (`RefCell`) because assignment writes through shared handles.
#[derive(Debug, Clone)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up in this scope, then outward along the chain.
    /// Used for the globals frame, where no distance is recorded.
    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(undefined(name, line))
        }
    }

    /// Assign to the closest scope along the chain that already binds
    /// `name`.  Used for the globals frame.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(undefined(name, line))
        }
    }

    /// Read `name` from the frame exactly `distance` parents away.  No
    /// further walking: the resolver guarantees the binding lives there.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value> {
        let frame = Environment::ancestor(env, distance, name, line)?;
        let value = frame.borrow().values.get(name).cloned();

        value.ok_or_else(|| undefined(name, line))
    }

    /// Write `name` in the frame exactly `distance` parents away.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<()> {
        let frame = Environment::ancestor(env, distance, name, line)?;
        let mut frame = frame.borrow_mut();

        if frame.values.contains_key(name) {
            frame.values.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(undefined(name, line))
        }
    }

    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Rc<RefCell<Environment>>> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let parent = current.borrow().enclosing.clone();

            match parent {
                Some(parent) => current = parent,
                None => return Err(undefined(name, line)),
            }
        }

        Ok(current)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

fn undefined(name: &str, line: usize) -> LoxError {
    LoxError::runtime(line, format!("undefined variable '{}'", name))
}
