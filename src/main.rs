use std::env;
use std::fs;
use std::process;

use tracing::debug;

use fable::evaluator;
use fable::lexer;
use fable::object::Environment;
use fable::parser::Parser;
use fable::repl;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => repl::run(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: fable [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading file '{}': {}", path, err);
            process::exit(1);
        }
    };
    debug!(path, bytes = source.len(), "loaded script");

    if let Err(message) = run_source(&source) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

// One whole-file run against a fresh session. The first error wins; there is
// no recovery past it.
fn run_source(source: &str) -> Result<(), String> {
    let tokens = lexer::tokenize(source).map_err(|err| err.to_string())?;
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program().map_err(|err| err.to_string())?;

    let mut env = Environment::new();
    let root = env.root();
    evaluator::eval(&program, &mut env, root).map_err(|err| err.to_string())?;

    Ok(())
}
