use crate::token::{Literal, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(Token),
    Assign(AssignNode),
    Logical(BinaryOpNode),
    Binary(BinaryOpNode),
    Unary(Token, Box<Expression>),
    Grouping(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignNode {
    pub name: Token,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpNode {
    pub lhs: Box<Expression>,
    pub op: Token,
    pub rhs: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expression),
    Print(Expression),
    Declare(Token, Option<Expression>),
    Block(StatementList),
    If(IfStmtNode),
    While(WhileNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmtNode {
    pub cond: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileNode {
    pub cond: Expression,
    pub body: Box<Statement>,
}

pub type StatementList = Vec<Statement>;
