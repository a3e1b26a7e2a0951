use crate::ast::*;
use crate::token::{Literal, Token, TokenKind};

use super::context::Context;
use super::error::ParseError;

/// Parses a whole program. Malformed statements are reported and skipped, so
/// the returned statements are only meaningful when the error list is empty.
pub fn parse(items: &[Token]) -> (StatementList, Vec<ParseError>) {
    if items.is_empty() {
        return (vec![], vec![]);
    }

    let mut state = Context::new(items);
    let mut stmts = vec![];
    while !state.is_at_end() {
        if let Some(stmt) = parse_declaration(&mut state) {
            stmts.push(stmt);
        }
    }
    (stmts, state.into_errors())
}

fn parse_declaration(state: &mut Context) -> Option<Statement> {
    let result = if state.next_matches(&[TokenKind::Var]).is_some() {
        parse_var_declaration(state)
    } else {
        parse_stmt(state)
    };

    match result {
        Ok(stmt) => Some(stmt),
        Err(err) => {
            state.report(err);
            state.synchronize();
            None
        }
    }
}

fn parse_var_declaration(state: &mut Context) -> Result<Statement, ParseError> {
    let name = state.consume_token(TokenKind::Identifier, "Expect variable name.")?;

    let initializer = match state.next_matches(&[TokenKind::Equal]) {
        Some(_) => Some(parse_expr(state)?),
        None => None,
    };

    state.consume_token(
        TokenKind::Semicolon,
        "Expect ';' after variable declaration.",
    )?;
    Ok(Statement::Declare(name.clone(), initializer))
}

fn parse_stmt(state: &mut Context) -> Result<Statement, ParseError> {
    match state.get_curr().kind {
        TokenKind::Print => parse_print(state),
        TokenKind::If => parse_if(state),
        TokenKind::While => parse_while(state),
        TokenKind::LeftBrace => {
            parse_block_statement_list(state, "Expect '{' before block.").map(Statement::Block)
        }
        _ => parse_expr_stmt(state),
    }
}

fn parse_print(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::Print, "Expect 'print'.")?;
    let expr = parse_expr(state)?;
    state.consume_token(TokenKind::Semicolon, "Expect ';' after value.")?;
    Ok(Statement::Print(expr))
}

fn parse_expr_stmt(state: &mut Context) -> Result<Statement, ParseError> {
    let expr = parse_expr(state)?;
    state.consume_token(TokenKind::Semicolon, "Expect ';' after expression.")?;
    Ok(Statement::Expr(expr))
}

fn parse_if(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::If, "Expect 'if'.")?;
    state.consume_token(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
    let cond = parse_expr(state)?;
    state.consume_token(TokenKind::RightParen, "Expect ')' after if condition.")?;

    let then_branch = parse_block_statement_list(state, "Expect '{' before if body.")?;

    let mut else_branch = None;
    if state.next_matches(&[TokenKind::Else]).is_some() {
        let stmts = parse_block_statement_list(state, "Expect '{' before else body.")?;
        else_branch = Some(Box::new(Statement::Block(stmts)));
    }

    Ok(Statement::If(IfStmtNode {
        cond,
        then_branch: Box::new(Statement::Block(then_branch)),
        else_branch,
    }))
}

fn parse_while(state: &mut Context) -> Result<Statement, ParseError> {
    state.consume_token(TokenKind::While, "Expect 'while'.")?;
    state.consume_token(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
    let cond = parse_expr(state)?;
    state.consume_token(TokenKind::RightParen, "Expect ')' after while condition.")?;

    let body = parse_block_statement_list(state, "Expect '{' before while body.")?;

    Ok(Statement::While(WhileNode {
        cond,
        body: Box::new(Statement::Block(body)),
    }))
}

fn parse_block_statement_list(
    state: &mut Context,
    open_message: &'static str,
) -> Result<StatementList, ParseError> {
    state.consume_token(TokenKind::LeftBrace, open_message)?;

    let stmts = state.nested(|state| {
        let mut stmts = vec![];
        while !state.peek(&[TokenKind::RightBrace]) && !state.is_at_end() {
            if let Some(stmt) = parse_declaration(state) {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    })?;

    state.consume_token(TokenKind::RightBrace, "Expect '}' after block.")?;
    Ok(stmts)
}

fn parse_expr(state: &mut Context) -> Result<Expression, ParseError> {
    parse_assignment(state)
}

fn parse_assignment(state: &mut Context) -> Result<Expression, ParseError> {
    let expr = parse_logic_or(state)?;

    let Some(equals) = state.next_matches(&[TokenKind::Equal]) else {
        return Ok(expr);
    };
    let value = state.nested(parse_assignment)?;

    match expr {
        Expression::Variable(name) => Ok(Expression::Assign(AssignNode {
            name,
            value: Box::new(value),
        })),
        // reported, but the parser keeps its place: no need to synchronize
        other => {
            state.report(ParseError::InvalidAssignmentTarget(equals.clone()));
            Ok(other)
        }
    }
}

fn parse_logic_or(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(state, &[TokenKind::Or], parse_logic_and, Expression::Logical)
}

fn parse_logic_and(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(state, &[TokenKind::And], parse_equality, Expression::Logical)
}

fn parse_equality(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[TokenKind::BangEqual, TokenKind::EqualEqual],
        parse_comparison,
        Expression::Binary,
    )
}

fn parse_comparison(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ],
        parse_term,
        Expression::Binary,
    )
}

fn parse_term(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[TokenKind::Minus, TokenKind::Plus],
        parse_factor,
        Expression::Binary,
    )
}

fn parse_factor(state: &mut Context) -> Result<Expression, ParseError> {
    parse_recursive_binary(
        state,
        &[TokenKind::Slash, TokenKind::Star],
        parse_unary,
        Expression::Binary,
    )
}

fn parse_recursive_binary<F>(
    state: &mut Context,
    match_tokens: &'static [TokenKind],
    lower_fn: F,
    make_node: fn(BinaryOpNode) -> Expression,
) -> Result<Expression, ParseError>
where
    F: Fn(&mut Context) -> Result<Expression, ParseError>,
{
    let mut lhs = lower_fn(state)?;

    // every link pushes the chain built so far one level down
    let mut links = 0;
    let res = loop {
        let Some(op) = state.next_matches(match_tokens) else {
            break Ok(lhs);
        };
        if let Err(err) = state.descend() {
            break Err(err);
        }
        links += 1;
        let rhs = match lower_fn(state) {
            Ok(rhs) => rhs,
            Err(err) => break Err(err),
        };
        lhs = make_node(BinaryOpNode {
            lhs: Box::new(lhs),
            op: op.clone(),
            rhs: Box::new(rhs),
        });
    };
    state.ascend(links);
    res
}

fn parse_unary(state: &mut Context) -> Result<Expression, ParseError> {
    match state.next_matches(&[TokenKind::Bang, TokenKind::Minus]) {
        Some(op) => {
            let rhs = state.nested(parse_unary)?;
            Ok(Expression::Unary(op.clone(), Box::new(rhs)))
        }
        None => parse_primary(state),
    }
}

fn parse_primary(state: &mut Context) -> Result<Expression, ParseError> {
    let li = state.get_curr();

    let expr = match li.kind {
        TokenKind::False => Expression::Literal(Literal::Bool(false)),
        TokenKind::True => Expression::Literal(Literal::Bool(true)),
        TokenKind::Nil => Expression::Literal(Literal::Nil),
        TokenKind::Number | TokenKind::String => match &li.literal {
            Some(literal) => Expression::Literal(literal.clone()),
            None => return Err(unexpected(li, "Expect literal value.")),
        },
        TokenKind::Identifier => Expression::Variable(li.clone()),
        TokenKind::LeftParen => return parse_group(state),
        _ => return Err(unexpected(li, "Expect expression.")),
    };

    state.advance();
    Ok(expr)
}

fn parse_group(state: &mut Context) -> Result<Expression, ParseError> {
    state.consume_token(TokenKind::LeftParen, "Expect '('.")?;
    let expr = state.nested(parse_expr)?;
    state.consume_token(TokenKind::RightParen, "Expect ')' after expression.")?;
    Ok(Expression::Grouping(Box::new(expr)))
}

fn unexpected(token: &Token, message: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        token: token.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::context::MAX_NESTING;
    use crate::parse::lex;
    use pretty_assertions::assert_eq;

    fn parse_source(input: &str) -> (StatementList, Vec<ParseError>) {
        let (tokens, lex_errors) = lex(input);
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        parse(&tokens)
    }

    // Lisp-style rendering, enough to check tree shape
    fn sexp(expr: &Expression) -> String {
        match expr {
            Expression::Literal(Literal::Nil) => "nil".to_string(),
            Expression::Literal(Literal::Bool(b)) => b.to_string(),
            Expression::Literal(Literal::Number(n)) => n.to_string(),
            Expression::Literal(Literal::Str(s)) => format!("{:?}", s),
            Expression::Variable(name) => name.lexeme.clone(),
            Expression::Assign(node) => format!("(= {} {})", node.name.lexeme, sexp(&node.value)),
            Expression::Logical(node) | Expression::Binary(node) => format!(
                "({} {} {})",
                node.op.lexeme,
                sexp(&node.lhs),
                sexp(&node.rhs)
            ),
            Expression::Unary(op, rhs) => format!("({} {})", op.lexeme, sexp(rhs)),
            Expression::Grouping(inner) => format!("(group {})", sexp(inner)),
        }
    }

    fn parse_expression(input: &str) -> String {
        let (stmts, errors) = parse_source(&format!("{};", input));
        assert_eq!(errors, vec![]);
        match stmts.as_slice() {
            [Statement::Expr(expr)] => sexp(expr),
            other => panic!("unexpected statements: {:?}", other),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(parse_expression("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(parse_expression("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(parse_expression("(1 + 2) / 3"), "(/ (group (+ 1 2)) 3)");
        assert_eq!(parse_expression("-1 * !true"), "(* (- 1) (! true))");
        assert_eq!(parse_expression("--1"), "(- (- 1))");
    }

    #[test]
    fn comparison_and_equality_precedence() {
        assert_eq!(
            parse_expression("1 < 2 == 3 >= 4"),
            "(== (< 1 2) (>= 3 4))"
        );
        assert_eq!(parse_expression("1 + 2 > 3"), "(> (+ 1 2) 3)");
    }

    #[test]
    fn logical_precedence() {
        assert_eq!(
            parse_expression("a or b and c == d"),
            "(or a (and b (== c d)))"
        );
        assert_eq!(parse_expression("a and b or c"), "(or (and a b) c)");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_expression("a = b = 1 + 2"), "(= a (= b (+ 1 2)))");
        assert_eq!(parse_expression("a = b or c"), "(= a (or b c))");
    }

    #[test]
    fn invalid_assignment_target_is_recoverable() {
        let (stmts, errors) = parse_source("1 + a = 2; print 3;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ParseError::InvalidAssignmentTarget(token) if token.lexeme == "="
        ));
        // both statements still come out of the parse
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[1], Statement::Print(_)));
    }

    #[test]
    fn grouped_variable_is_not_an_assignment_target() {
        let (_, errors) = parse_source("(a) = 1;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseError::InvalidAssignmentTarget(_)));
    }

    #[test]
    fn var_declaration_with_and_without_initializer() {
        let (stmts, errors) = parse_source("var a; var b = 1;");
        assert!(errors.is_empty());
        match stmts.as_slice() {
            [Statement::Declare(a, None), Statement::Declare(b, Some(init))] => {
                assert_eq!(a.lexeme, "a");
                assert_eq!(b.lexeme, "b");
                assert_eq!(sexp(init), "1");
            }
            other => panic!("unexpected statements: {:?}", other),
        }
    }

    #[test]
    fn if_else_branches_are_blocks() {
        let (stmts, errors) = parse_source("if (a) { print 1; } else { print 2; print 3; }");
        assert!(errors.is_empty());
        let [Statement::If(node)] = stmts.as_slice() else {
            panic!("expected one if statement: {:?}", stmts);
        };
        assert_eq!(sexp(&node.cond), "a");
        assert!(matches!(node.then_branch.as_ref(), Statement::Block(s) if s.len() == 1));
        assert!(
            matches!(node.else_branch.as_deref(), Some(Statement::Block(s)) if s.len() == 2)
        );
    }

    #[test]
    fn if_body_must_be_a_block() {
        let (_, errors) = parse_source("if (a) print 1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Expect '{' before if body.");
    }

    #[test]
    fn while_body_is_a_block() {
        let (stmts, errors) = parse_source("while (i < 3) { i = i + 1; }");
        assert!(errors.is_empty());
        let [Statement::While(node)] = stmts.as_slice() else {
            panic!("expected one while statement: {:?}", stmts);
        };
        assert_eq!(sexp(&node.cond), "(< i 3)");
        assert!(matches!(node.body.as_ref(), Statement::Block(s) if s.len() == 1));
    }

    #[test]
    fn nested_blocks() {
        let (stmts, errors) = parse_source("{ var a = 1; { print a; } }");
        assert!(errors.is_empty());
        let [Statement::Block(outer)] = stmts.as_slice() else {
            panic!("expected one block: {:?}", stmts);
        };
        assert_eq!(outer.len(), 2);
        assert!(matches!(&outer[1], Statement::Block(inner) if inner.len() == 1));
    }

    #[test]
    fn independent_errors_are_all_reported() {
        let (_, errors) = parse_source("var = 1;\nprint 1 +;\nprint 2;");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "Expect variable name.");
        assert_eq!(errors[0].line(), 1);
        assert_eq!(errors[1].to_string(), "Expect expression.");
        assert_eq!(errors[1].line(), 2);
        assert_eq!(errors[1].location().as_deref(), Some("at ';'"));
    }

    #[test]
    fn synchronize_stops_before_statement_keyword() {
        let (stmts, errors) = parse_source("1 + + 2 print 3;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(stmts.as_slice(), [Statement::Print(_)]));
    }

    #[test]
    fn missing_semicolon_at_end_reports_eof() {
        let (_, errors) = parse_source("print 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Expect ';' after value.");
        assert_eq!(errors[0].location().as_deref(), Some("at end"));
    }

    #[test]
    fn unclosed_block_is_reported() {
        let (_, errors) = parse_source("{ print 1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Expect '}' after block.");
    }

    #[test]
    fn reserved_keywords_are_not_expressions() {
        let (_, errors) = parse_source("class;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location().as_deref(), Some("at 'class'"));
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let depth = MAX_NESTING / 2;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_expression(&source).starts_with("(group (group"));

        let chain = format!("1{}", " + 1".repeat(depth));
        parse_expression(&chain);
        parse_expression(&format!("{}1", "-".repeat(depth)));
    }

    #[test]
    fn deep_nesting_is_a_parse_error() {
        for source in [
            format!("print {}1{};", "(".repeat(200_000), ")".repeat(200_000)),
            format!("print 1{};", " + 1".repeat(200_000)),
            format!("print {}1;", "!".repeat(200_000)),
            format!("{}{}", "{".repeat(200_000), "}".repeat(200_000)),
            format!("a{} 1;", " = a".repeat(200_000)),
        ] {
            let (_, errors) = parse_source(&source);
            assert!(
                errors.iter().any(|e| matches!(e, ParseError::TooMuchNesting(_))),
                "{:?}",
                &errors[..errors.len().min(3)]
            );
        }

        let (stmts, errors) = parse_source(&format!(
            "print {}1{};\nprint 2;",
            "(".repeat(MAX_NESTING + 2),
            ")".repeat(MAX_NESTING + 2)
        ));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Too much nesting.");
        assert_eq!(errors[0].location().as_deref(), Some("at '('"));
        // recovery picks up at the next statement
        assert!(matches!(stmts.as_slice(), [Statement::Print(_)]));
    }

    #[test]
    fn empty_token_list() {
        let (stmts, errors) = parse(&[]);
        assert!(stmts.is_empty());
        assert!(errors.is_empty());
    }
}
