use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use log::{debug, trace};

use super::environment::Environment;
use super::error::Error;
use super::value::Value;
use crate::ast::*;
use crate::token::{Token, TokenKind};

pub struct Interpreter {
    environment: Environment,
    print_writer: Rc<RefCell<dyn Write>>,
    // REPL mode: expression statements print their value
    echo_expressions: bool,
}

impl Interpreter {
    pub fn new(print_writer: Rc<RefCell<dyn Write>>) -> Self {
        Self::with_environment(Environment::new(), print_writer)
    }

    pub fn with_environment(
        environment: Environment,
        print_writer: Rc<RefCell<dyn Write>>,
    ) -> Self {
        Self {
            environment,
            print_writer,
            echo_expressions: false,
        }
    }

    pub fn set_echo_expressions(&mut self, echo: bool) {
        self.echo_expressions = echo;
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Runs `stmts` in order. The first runtime error stops the run and is
    /// returned; the statements after it are not executed.
    pub fn interpret(&mut self, stmts: &[Statement]) -> Result<(), Error> {
        debug!("interpreting {} statements", stmts.len());
        self.interpret_stmt_list(stmts)
    }

    fn interpret_stmt(&mut self, stmt: &Statement) -> Result<(), Error> {
        trace!("{:?}", stmt);
        match stmt {
            Statement::Expr(expr) => self.interpret_expr_stmt(expr),
            Statement::Print(expr) => self.interpret_print_stmt(expr),
            Statement::Declare(name, initializer) => {
                self.interpret_declare_stmt(name, initializer.as_ref())
            }
            Statement::Block(stmts) => self.interpret_block(stmts),
            Statement::If(node) => self.interpret_if_stmt(node),
            Statement::While(node) => self.interpret_while_stmt(node),
        }
    }

    fn interpret_stmt_list(&mut self, stmts: &[Statement]) -> Result<(), Error> {
        for stmt in stmts {
            self.interpret_stmt(stmt)?;
        }
        Ok(())
    }

    fn interpret_block(&mut self, stmts: &[Statement]) -> Result<(), Error> {
        self.environment.push_scope();
        let res = self.interpret_stmt_list(stmts);
        // popped on the error path too
        self.environment.pop_scope();
        res
    }

    fn interpret_expr_stmt(&mut self, expr: &Expression) -> Result<(), Error> {
        let value = self.interpret_expr(expr)?;
        if self.echo_expressions {
            self.write_line(&value)?;
        }
        Ok(())
    }

    fn interpret_print_stmt(&mut self, expr: &Expression) -> Result<(), Error> {
        let value = self.interpret_expr(expr)?;
        self.write_line(&value)
    }

    fn write_line(&self, value: &Value) -> Result<(), Error> {
        let mut out = self.print_writer.borrow_mut();
        writeln!(out, "{}", value)?;
        Ok(())
    }

    fn interpret_declare_stmt(
        &mut self,
        name: &Token,
        initializer: Option<&Expression>,
    ) -> Result<(), Error> {
        let value = match initializer {
            Some(expr) => self.interpret_expr(expr)?,
            None => Value::Nil,
        };
        self.environment.define(&name.lexeme, value);
        Ok(())
    }

    fn interpret_if_stmt(&mut self, node: &IfStmtNode) -> Result<(), Error> {
        if self.is_truthy(&node.cond)? {
            return self.interpret_stmt(&node.then_branch);
        }
        match &node.else_branch {
            Some(stmt) => self.interpret_stmt(stmt),
            None => Ok(()),
        }
    }

    fn interpret_while_stmt(
        &mut self,
        WhileNode { cond, body }: &WhileNode,
    ) -> Result<(), Error> {
        while self.is_truthy(cond)? {
            self.interpret_stmt(body)?;
        }
        Ok(())
    }

    fn interpret_expr(&mut self, expr: &Expression) -> Result<Value, Error> {
        match expr {
            Expression::Literal(literal) => Ok(Value::from(literal)),
            Expression::Variable(name) => self.environment.get(name).cloned(),
            Expression::Assign(node) => self.interpret_assign_expr(node),
            Expression::Logical(node) => self.interpret_logical_op(node),
            Expression::Binary(node) => self.interpret_binary_op(node),
            Expression::Unary(op, rhs) => self.interpret_unary_op(op, rhs),
            Expression::Grouping(inner) => self.interpret_expr(inner),
        }
    }

    fn interpret_assign_expr(
        &mut self,
        AssignNode { name, value }: &AssignNode,
    ) -> Result<Value, Error> {
        let value = self.interpret_expr(value)?;
        self.environment.assign(name, value.clone())?;
        Ok(value)
    }

    // yields the deciding operand itself, not a coerced boolean
    fn interpret_logical_op(
        &mut self,
        BinaryOpNode { lhs, op, rhs }: &BinaryOpNode,
    ) -> Result<Value, Error> {
        let lhs = self.interpret_expr(lhs)?;

        let short_circuits = match op.kind {
            TokenKind::Or => lhs.is_truthy(),
            TokenKind::And => !lhs.is_truthy(),
            _ => return Err(Error::UnknownOperation(op.clone())),
        };
        if short_circuits {
            return Ok(lhs);
        }
        self.interpret_expr(rhs)
    }

    fn interpret_unary_op(&mut self, op: &Token, rhs: &Expression) -> Result<Value, Error> {
        let res = self.interpret_expr(rhs)?;
        match op.kind {
            TokenKind::Bang => Ok(Value::Bool(!res.is_truthy())),
            TokenKind::Minus => match res {
                Value::Number(v) => Ok(Value::Number(-v)),
                _ => Err(Error::OperandMustBeNumber(op.clone())),
            },
            _ => Err(Error::UnknownOperation(op.clone())),
        }
    }

    fn interpret_binary_op(
        &mut self,
        BinaryOpNode { lhs, op, rhs }: &BinaryOpNode,
    ) -> Result<Value, Error> {
        let lhs = self.interpret_expr(lhs)?;
        let rhs = self.interpret_expr(rhs)?;

        match op.kind {
            TokenKind::Plus => add(op, lhs, rhs),
            TokenKind::Minus => {
                let (l, r) = extract_numbers(op, &lhs, &rhs)?;
                Ok(Value::Number(l - r))
            }
            TokenKind::Star => times(op, lhs, rhs),
            TokenKind::Slash => divide(op, &lhs, &rhs),
            TokenKind::EqualEqual => Ok(Value::Bool(lhs.is_equal(&rhs))),
            TokenKind::BangEqual => Ok(Value::Bool(!lhs.is_equal(&rhs))),
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => compare(op, &lhs, &rhs),
            _ => Err(Error::UnknownOperation(op.clone())),
        }
    }

    fn is_truthy(&mut self, expr: &Expression) -> Result<bool, Error> {
        self.interpret_expr(expr).map(|value| value.is_truthy())
    }
} // Interpreter

fn add(op: &Token, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
        (l, r) => Err(Error::MismatchAddOperands(
            op.clone(),
            l.type_name(),
            r.type_name(),
        )),
    }
}

fn times(op: &Token, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l * r)),
        (Value::Str(s), Value::Number(n)) | (Value::Number(n), Value::Str(s)) => {
            repeat_string(op, &s, n)
        }
        (l, r) => Err(Error::MismatchMultiplyOperands(
            op.clone(),
            l.type_name(),
            r.type_name(),
        )),
    }
}

// longest string repetition may build, in bytes
const MAX_STRING_LEN: usize = 1 << 30;

fn repeat_string(op: &Token, s: &str, count: f64) -> Result<Value, Error> {
    if !count.is_finite() || count.fract() != 0.0 {
        return Err(Error::RepeatCountNotInteger(op.clone(), count));
    }
    // zero or negative repeats nothing
    if count <= 0.0 {
        return Ok(Value::Str(String::new()));
    }
    if count > MAX_STRING_LEN as f64 {
        return Err(Error::RepeatCountTooLarge(op.clone(), count));
    }
    // in range of usize after the check above
    let times = count as usize;
    match s.len().checked_mul(times) {
        Some(len) if len <= MAX_STRING_LEN => Ok(Value::Str(s.repeat(times))),
        _ => Err(Error::RepeatCountTooLarge(op.clone(), count)),
    }
}

fn divide(op: &Token, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    let (l, r) = extract_numbers(op, lhs, rhs)?;
    // -0.0 == 0.0, so a negative zero divisor is rejected as well
    if r == 0.0 {
        return Err(Error::DivideByZero(op.clone()));
    }
    Ok(Value::Number(l / r))
}

fn compare(op: &Token, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    let (l, r) = extract_numbers(op, lhs, rhs)?;
    let res = match op.kind {
        TokenKind::Greater => l > r,
        TokenKind::GreaterEqual => l >= r,
        TokenKind::Less => l < r,
        TokenKind::LessEqual => l <= r,
        _ => return Err(Error::UnknownOperation(op.clone())),
    };
    Ok(Value::Bool(res))
}

fn extract_numbers(op: &Token, lhs: &Value, rhs: &Value) -> Result<(f64, f64), Error> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(Error::OperandsMustBeNumbers(op.clone())),
    }
}
