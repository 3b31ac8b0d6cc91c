use std::io;
use std::io::BufRead;
use std::io::Write;

use tracing::debug;

use crate::evaluator;
use crate::lexer;
use crate::object::Environment;
use crate::parser::Parser;

/// Line-mode loop: one persistent session, each line runs the whole
/// lexer/parser/evaluator pipeline and prints its value or error. An empty
/// line, `exit`, or end of input leaves the loop.
pub fn run() {
    let stdin = io::stdin();

    let mut env = Environment::new();
    let root = env.root();

    loop {
        print!(">> ");
        io::stdout().flush().expect("Error flushing stdout");

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .expect("Error reading from stdin");
        if read == 0 {
            return;
        }

        let source = line.trim();
        if source.is_empty() || source == "exit" {
            return;
        }

        let tokens = match lexer::tokenize(source) {
            Ok(tokens) => tokens,
            Err(err) => {
                println!("Error: {}", err);
                continue;
            }
        };
        debug!(tokens = tokens.len(), "tokenized line");

        let mut parser = Parser::new(tokens);
        let program = match parser.parse_program() {
            Ok(program) => program,
            Err(err) => {
                println!("Error: {}", err);
                continue;
            }
        };
        debug!(statements = program.statements.len(), "parsed line");

        // Errors abandon the line but keep the session; bindings made by
        // earlier lines stay visible to later ones.
        match evaluator::eval(&program, &mut env, root) {
            Ok(value) => println!("{}", value),
            Err(err) => println!("Error: {}", err),
        }
    }
}
