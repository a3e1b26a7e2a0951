use thiserror::Error;

use crate::token::Token;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Undefined variable '{}'.", .0.lexeme)]
    UndefinedVariable(Token),

    #[error("Operand must be a number.")]
    OperandMustBeNumber(Token),

    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers(Token),

    #[error("Operands must be two numbers or two strings, got {} and {}.", .1, .2)]
    MismatchAddOperands(Token, &'static str, &'static str),

    #[error("Cannot multiply {} by {}.", .1, .2)]
    MismatchMultiplyOperands(Token, &'static str, &'static str),

    #[error("Cannot repeat a string {1} times, the count must be a whole number.")]
    RepeatCountNotInteger(Token, f64),

    #[error("Cannot repeat a string {1} times, the result would be too large.")]
    RepeatCountTooLarge(Token, f64),

    #[error("Division by zero.")]
    DivideByZero(Token),

    #[error("Unknown operator `{}`.", .0.lexeme)]
    UnknownOperation(Token),

    #[error("Writing output failed with error: {0}")]
    WriteFailed(#[from] std::io::Error),
}

impl Error {
    /// Source line of the offending token, if the error has one.
    pub fn line(&self) -> Option<usize> {
        use Error::*;
        match self {
            UndefinedVariable(token)
            | OperandMustBeNumber(token)
            | OperandsMustBeNumbers(token)
            | MismatchAddOperands(token, _, _)
            | MismatchMultiplyOperands(token, _, _)
            | RepeatCountNotInteger(token, _)
            | RepeatCountTooLarge(token, _)
            | DivideByZero(token)
            | UnknownOperation(token) => Some(token.line),
            WriteFailed(_) => None,
        }
    }
}
