use phf::phf_map;

use super::error::ParseError;
use crate::span::Span;
use crate::token::{Literal, Token, TokenKind};

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and" => TokenKind::And,
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "fun" => TokenKind::Fun,
    "if" => TokenKind::If,
    "nil" => TokenKind::Nil,
    "or" => TokenKind::Or,
    "xor" => TokenKind::Xor,
    "print" => TokenKind::Print,
    "return" => TokenKind::Return,
    "super" => TokenKind::Super,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

struct LexState {
    chars: Vec<char>,
    start: usize,
    curr_offset: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl LexState {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            start: 0,
            curr_offset: 0,
            line: 1,
            tokens: vec![],
            errors: vec![],
        }
    }

    fn is_at_end(&self) -> bool {
        self.curr_offset >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.curr_offset];
        self.curr_offset += 1;
        c
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.curr_offset).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.curr_offset + 1).copied()
    }

    fn next_matches(&mut self, expected: char) -> bool {
        if self.peek() != Some(expected) {
            return false;
        }
        self.curr_offset += 1;
        true
    }

    fn current_span(&self) -> Span {
        Span::new(self.start, self.curr_offset)
    }

    fn push(&mut self, kind: TokenKind) {
        self.push_with_literal(kind, None);
    }

    fn push_with_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let span = self.current_span();
        let lexeme = span.string_from_chars(&self.chars);
        self.tokens
            .push(Token::new(kind, lexeme, literal, self.line, span));
    }

    fn push_one_or_two(&mut self, second: char, two: TokenKind, one: TokenKind) {
        let kind = if self.next_matches(second) { two } else { one };
        self.push(kind);
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Scans the whole input. Bad characters are recorded and skipped so one pass
/// reports every lexical error; the token list always ends with `Eof`.
pub fn lex(input: &str) -> (Vec<Token>, Vec<ParseError>) {
    let mut state = LexState::new(input);

    while !state.is_at_end() {
        state.start = state.curr_offset;
        lex_token(&mut state);
    }

    let eof = Token::eof(state.line, state.curr_offset);
    state.tokens.push(eof);
    (state.tokens, state.errors)
}

fn lex_token(state: &mut LexState) {
    let c = state.advance();
    match c {
        '(' => state.push(TokenKind::LeftParen),
        ')' => state.push(TokenKind::RightParen),
        '{' => state.push(TokenKind::LeftBrace),
        '}' => state.push(TokenKind::RightBrace),
        ',' => state.push(TokenKind::Comma),
        '.' => state.push(TokenKind::Dot),
        '-' => state.push(TokenKind::Minus),
        '+' => state.push(TokenKind::Plus),
        ';' => state.push(TokenKind::Semicolon),
        '*' => state.push(TokenKind::Star),
        '?' => state.push(TokenKind::Question),
        ':' => state.push(TokenKind::Colon),
        '!' => state.push_one_or_two('=', TokenKind::BangEqual, TokenKind::Bang),
        '=' => state.push_one_or_two('=', TokenKind::EqualEqual, TokenKind::Equal),
        '<' => state.push_one_or_two('=', TokenKind::LessEqual, TokenKind::Less),
        '>' => state.push_one_or_two('=', TokenKind::GreaterEqual, TokenKind::Greater),
        '/' => {
            if state.next_matches('/') {
                skip_line_comment(state);
            } else if state.next_matches('*') {
                skip_block_comment(state);
            } else {
                state.push(TokenKind::Slash);
            }
        }
        ' ' | '\r' | '\t' => {
            // skip
        }
        '\n' => state.line += 1,
        '"' => lex_string(state),
        c if c.is_ascii_digit() => lex_number(state),
        c if is_identifier_start(c) => lex_keyword_or_identifier(state),
        character => state.errors.push(ParseError::UnexpectedCharacter {
            character,
            line: state.line,
        }),
    }
}

fn skip_line_comment(state: &mut LexState) {
    while let Some(c) = state.peek() {
        if c == '\n' {
            break;
        }
        state.advance();
    }
}

// Ends at the first `*/`; an inner `/*` does not open a nested level.
fn skip_block_comment(state: &mut LexState) {
    let start_line = state.line;

    loop {
        match (state.peek(), state.peek_next()) {
            (None, _) => {
                state
                    .errors
                    .push(ParseError::UnterminatedComment { start_line });
                return;
            }
            (Some('*'), Some('/')) => {
                state.curr_offset += 2;
                return;
            }
            (Some(c), _) => {
                if c == '\n' {
                    state.line += 1;
                }
                state.advance();
            }
        }
    }
}

fn lex_string(state: &mut LexState) {
    while let Some(c) = state.peek() {
        if c == '"' {
            break;
        }
        if c == '\n' {
            state.line += 1;
        }
        state.advance();
    }

    if state.is_at_end() {
        state
            .errors
            .push(ParseError::UnterminatedString { line: state.line });
        return;
    }

    // closing '"'
    state.advance();

    // remove start '"' and end '"'
    let value = Span::new(state.start + 1, state.curr_offset - 1).string_from_chars(&state.chars);
    state.push_with_literal(TokenKind::String, Some(Literal::Str(value)));
}

fn lex_number(state: &mut LexState) {
    consume_digits(state);

    // a '.' only belongs to the number when a digit follows it
    let has_fraction = state.peek() == Some('.')
        && state.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false);
    if has_fraction {
        state.advance();
        consume_digits(state);
    }

    let source = state.current_span().string_from_chars(&state.chars);
    match source.parse::<f64>() {
        Ok(num) => state.push_with_literal(TokenKind::Number, Some(Literal::Number(num))),
        Err(_) => state.errors.push(ParseError::InvalidNumber {
            lexeme: source,
            line: state.line,
        }),
    }
}

fn consume_digits(state: &mut LexState) {
    while state.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        state.advance();
    }
}

fn lex_keyword_or_identifier(state: &mut LexState) {
    while state.peek().map(is_identifier_char).unwrap_or(false) {
        state.advance();
    }

    let text = state.current_span().string_from_chars(&state.chars);
    let kind = KEYWORDS
        .get(text.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);
    state.push(kind);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, errors) = lex(input);
        assert_eq!(errors, vec![]);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_is_only_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn operators_use_longest_match() {
        use TokenKind::*;
        assert_eq!(
            kinds("! != = == < <= > >= / *"),
            vec![
                Bang,
                BangEqual,
                Equal,
                EqualEqual,
                Less,
                LessEqual,
                Greater,
                GreaterEqual,
                Slash,
                Star,
                Eof
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("var variable _under or orchid nil"),
            vec![Var, Identifier, Identifier, Or, Identifier, Nil, Eof]
        );
    }

    #[test]
    fn number_literals_are_doubles() {
        let (tokens, _) = lex("12 3.25");
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.25)));
        assert_eq!(tokens[1].lexeme, "3.25");
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let (tokens, errors) = lex("1.");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn multiline_string_counts_lines() {
        let (tokens, errors) = lex("\"a\nb\" x");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".to_string())));
        assert_eq!(tokens[0].lexeme, "\"a\nb\"");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_produces_no_token() {
        let (tokens, errors) = lex("\"abc");
        assert_eq!(errors, vec![ParseError::UnterminatedString { line: 1 }]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn whitespace_does_not_change_lines_but_newlines_do() {
        let (tokens, _) = lex(" \t\r a\n\nb");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn line_comment_runs_to_end_of_line() {
        use TokenKind::*;
        assert_eq!(kinds("a // b c\nd"), vec![Identifier, Identifier, Eof]);
    }

    #[test]
    fn block_comment_ends_at_first_close() {
        use TokenKind::*;
        assert_eq!(kinds("/**/ a"), vec![Identifier, Eof]);
        // the inner `/*` does not nest, so ` c */` is scanned as code
        assert_eq!(
            kinds("/* a /* b */ c */"),
            vec![Identifier, Star, Slash, Eof]
        );
    }

    #[test]
    fn block_comment_counts_lines() {
        let (tokens, _) = lex("/* one\ntwo\n*/ x");
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn unterminated_block_comment_reports_start_line() {
        let (_, errors) = lex("\n/* never\nclosed");
        assert_eq!(errors, vec![ParseError::UnterminatedComment { start_line: 2 }]);
    }

    #[test]
    fn bad_characters_are_reported_and_skipped() {
        let (tokens, errors) = lex("a @ b\n#");
        assert_eq!(
            errors,
            vec![
                ParseError::UnexpectedCharacter {
                    character: '@',
                    line: 1
                },
                ParseError::UnexpectedCharacter {
                    character: '#',
                    line: 2
                },
            ]
        );
        let found: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            found,
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn spans_are_character_offsets() {
        let (tokens, _) = lex("é = 1");
        // 'é' itself is rejected, but offsets after it still count characters
        assert_eq!(tokens[0].span, Span::new(2, 3));
        assert_eq!(tokens[1].span, Span::new(4, 5));
    }
}
