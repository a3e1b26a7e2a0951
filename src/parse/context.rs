use crate::token::{Token, TokenKind};

use super::error::ParseError;

// `class fun var for if while print return` can all start a new statement
const SYNC_POINTS: &[TokenKind] = &[
    TokenKind::Class,
    TokenKind::Fun,
    TokenKind::Var,
    TokenKind::For,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Print,
    TokenKind::Return,
];

// groups, unary operators, operator chains and blocks combined; evaluation
// recurses over the same tree, so this bounds both stacks
pub const MAX_NESTING: usize = 100;

pub struct Context<'a> {
    items: &'a [Token],
    curr_pos: usize,
    depth: usize,
    errors: Vec<ParseError>,
}

impl<'a> Context<'a> {
    /// `items` must end with an `Eof` token, as `lex` guarantees.
    pub fn new(items: &'a [Token]) -> Self {
        Self {
            items,
            curr_pos: 0,
            depth: 0,
            errors: vec![],
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.get_curr().kind == TokenKind::Eof
    }

    pub fn get_curr(&self) -> &'a Token {
        // never walks past the trailing Eof
        let items = self.items;
        let last = items.len().saturating_sub(1);
        &items[self.curr_pos.min(last)]
    }

    pub fn previous(&self) -> &'a Token {
        let items = self.items;
        &items[self.curr_pos.saturating_sub(1)]
    }

    pub fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.curr_pos += 1;
        }
        self.previous()
    }

    pub fn peek(&self, match_tokens: &'static [TokenKind]) -> bool {
        !self.is_at_end() && match_tokens.contains(&self.get_curr().kind)
    }

    /// Consumes the current token when it is one of `match_tokens`.
    pub fn next_matches(&mut self, match_tokens: &'static [TokenKind]) -> Option<&'a Token> {
        if self.peek(match_tokens) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn consume_token(
        &mut self,
        kind: TokenKind,
        message: &'static str,
    ) -> Result<&'a Token, ParseError> {
        if !self.is_at_end() && self.get_curr().kind == kind {
            return Ok(self.advance());
        }
        Err(ParseError::UnexpectedToken {
            token: self.get_curr().clone(),
            message,
        })
    }

    pub fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooMuchNesting(self.get_curr().clone()));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    /// Runs `f` one nesting level deeper; the level is given back whether or
    /// not `f` succeeds.
    pub fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.descend()?;
        let res = f(self);
        self.ascend(1);
        res
    }

    pub fn report(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Discards tokens until just past a `;` or right before a token that
    /// starts a statement.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if SYNC_POINTS.contains(&self.get_curr().kind) {
                return;
            }
            self.advance();
        }
    }
}
