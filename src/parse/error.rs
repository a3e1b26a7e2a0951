use crate::token::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected character '{character}'.")]
    UnexpectedCharacter { character: char, line: usize },

    #[error("Unterminated string.")]
    UnterminatedString { line: usize },

    #[error("Unterminated block comment that started on line {start_line}.")]
    UnterminatedComment { start_line: usize },

    #[error("Unable to parse number literal '{lexeme}'.")]
    InvalidNumber { lexeme: String, line: usize },

    #[error("{message}")]
    UnexpectedToken { token: Token, message: &'static str },

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget(Token),

    #[error("Too much nesting.")]
    TooMuchNesting(Token),
}

impl ParseError {
    pub fn line(&self) -> usize {
        use ParseError::*;
        match self {
            UnexpectedCharacter { line, .. } => *line,
            UnterminatedString { line } => *line,
            UnterminatedComment { start_line } => *start_line,
            InvalidNumber { line, .. } => *line,
            UnexpectedToken { token, .. } => token.line,
            InvalidAssignmentTarget(token) | TooMuchNesting(token) => token.line,
        }
    }

    /// Where on the line the error sits, `None` for scanner errors.
    pub fn location(&self) -> Option<String> {
        use ParseError::*;
        match self {
            UnexpectedCharacter { .. }
            | UnterminatedString { .. }
            | UnterminatedComment { .. }
            | InvalidNumber { .. } => None,
            UnexpectedToken { token, .. }
            | InvalidAssignmentTarget(token)
            | TooMuchNesting(token) => {
                Some(diagnostic_location(token))
            }
        }
    }
}

fn diagnostic_location(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "at end".to_string(),
        _ => format!("at '{}'", token.lexeme),
    }
}
