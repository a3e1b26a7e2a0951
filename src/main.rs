use std::{cell::RefCell, process::ExitCode, rc::Rc};

use log::{debug, error, info};
use lox_tree::{interpret::Interpreter, report::StderrReporter, run};
use rustyline::{error::ReadlineError, DefaultEditor};

type DynResult = Result<(), Box<dyn std::error::Error>>;

const EXIT_USAGE: u8 = 64;
const EXIT_IO: u8 = 74;

fn main() -> ExitCode {
    // loaded first so `.env` can carry RUST_LOG
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Err(e) = dotenv {
        debug!("dotenvy load with error {}", e);
    }

    let args = std::env::args().collect::<Vec<String>>();
    debug!("{:?}", args);

    match args.as_slice() {
        [_] => match repl() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("REPL failed: {}", err);
                ExitCode::from(EXIT_IO)
            }
        },
        [_, path] => read_from_file(path),
        _ => {
            eprintln!("Usage: lox-tree [script]");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn read_from_file(file_path: &str) -> ExitCode {
    info!("Read from file {}", file_path);
    let contents = match std::fs::read_to_string(file_path) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Could not read `{}`: {}", file_path, err);
            return ExitCode::from(EXIT_IO);
        }
    };

    let stdout = Rc::new(RefCell::new(std::io::stdout()));
    let mut itp = Interpreter::new(stdout);
    let outcome = run(&contents, &mut itp, &mut StderrReporter);
    debug!("{:?}", outcome);
    ExitCode::from(outcome.exit_code())
}

fn repl() -> DynResult {
    info!("Running in REPL mode");

    let mut rl = DefaultEditor::new()?;

    let stdout = Rc::new(RefCell::new(std::io::stdout()));
    let mut itp = Interpreter::new(stdout);
    itp.set_echo_expressions(true);

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                rl.add_history_entry(&line)?;
                // errors were already reported; the session keeps going
                let outcome = run(line.trim_end(), &mut itp, &mut StderrReporter);
                debug!("{:?}", outcome);
            }
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => break,
            Err(err) => {
                return Err(Box::new(err));
            }
        }
    }

    Ok(())
}
