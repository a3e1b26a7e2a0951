use std::collections::HashMap;

use log::trace;

use super::{error::Error, value::Value};
use crate::token::Token;

#[derive(Debug)]
struct Scope {
    variables: HashMap<String, Value>,
    index: usize,
}

impl Scope {
    fn new(index: usize) -> Self {
        Self {
            variables: HashMap::new(),
            index,
        }
    }

    fn get_parent_scope<'a>(&self, scopes: &'a [Scope]) -> Option<&'a Scope> {
        if self.index == 0 {
            None
        } else {
            Some(&scopes[self.index - 1])
        }
    }
}

/// Chain of scope frames. Frame 0 holds the globals and is never popped; every
/// other frame belongs to a block that is currently executing, and its parent
/// is the frame right below it.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(0)],
        }
    }

    pub fn push_scope(&mut self) {
        let new_scope_index = self.scopes.len();
        trace!("push scope {}", new_scope_index);
        self.scopes.push(Scope::new(new_scope_index));
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            trace!("pop scope {}", self.scopes.len());
        }
    }

    /// Number of live frames, globals included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn get_current_scope(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn get_current_scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Binds `name` in the current frame, replacing any binding it already has there.
    pub fn define(&mut self, name: &str, value: Value) {
        self.get_current_scope_mut()
            .variables
            .insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<&Value, Error> {
        self.resolve(&name.lexeme)
            .and_then(|index| self.scopes[index].variables.get(&name.lexeme))
            .ok_or_else(|| Error::UndefinedVariable(name.clone()))
    }

    /// Overwrites the nearest existing binding; never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), Error> {
        let Some(index) = self.resolve(&name.lexeme) else {
            return Err(Error::UndefinedVariable(name.clone()));
        };
        self.scopes[index]
            .variables
            .insert(name.lexeme.clone(), value);
        Ok(())
    }

    // index of the innermost frame defining `name`
    fn resolve(&self, name: &str) -> Option<usize> {
        let mut scope = self.get_current_scope();
        loop {
            if scope.variables.contains_key(name) {
                return Some(scope.index);
            }
            scope = scope.get_parent_scope(&self.scopes)?;
        }
    }
}
