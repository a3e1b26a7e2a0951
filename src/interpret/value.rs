use derive_more::Display;

use crate::token::Literal;

#[derive(Display, Debug, Clone, PartialEq)]
pub enum Value {
    #[display(fmt = "nil")]
    Nil,

    #[display(fmt = "{}", _0)]
    Bool(bool),

    // f64's Display never leaves a trailing ".0": 3.0 prints as "3"
    #[display(fmt = "{}", _0)]
    Number(f64),

    // raw contents, no quotes
    #[display(fmt = "{}", _0)]
    Str(String),
}

impl Value {
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(_) | Value::Str(_) => true,
        }
    }

    /// Never fails: values of different kinds are simply unequal.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Nil => Value::Nil,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }
}
