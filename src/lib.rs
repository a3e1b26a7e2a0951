pub mod ast;
pub mod interpret;
pub mod parse;
pub mod report;
pub mod span;
pub mod token;

use log::{debug, trace};

use crate::interpret::Interpreter;
use crate::report::Reporter;

/// How one unit of source ended; maps onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    StaticError,
    RuntimeError,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::StaticError => 65,
            Outcome::RuntimeError => 70,
        }
    }
}

/// Scans, parses and, when both were clean, evaluates `input`.
///
/// Every scan and parse error is reported before anything runs; if there was
/// at least one, nothing is evaluated. A runtime error is reported once and
/// ends the run.
pub fn run(input: &str, itp: &mut Interpreter, reporter: &mut dyn Reporter) -> Outcome {
    let (tokens, lex_errors) = parse::lex(input);
    for token in &tokens {
        debug!("{} - {}: {:?}", token.span, token.kind, token.lexeme);
    }

    let (stmts, parse_errors) = parse::parse(&tokens);
    trace!("{:?}", &stmts);

    let static_errors = lex_errors.len() + parse_errors.len();
    if static_errors > 0 {
        for err in lex_errors.iter().chain(parse_errors.iter()) {
            reporter.static_error(err.line(), err.location().as_deref(), &err.to_string());
        }
        debug!("{} static errors, skipping evaluation", static_errors);
        return Outcome::StaticError;
    }

    match itp.interpret(&stmts) {
        Ok(()) => Outcome::Success,
        Err(err) => {
            reporter.runtime_error(err.line(), &err.to_string());
            Outcome::RuntimeError
        }
    }
}
