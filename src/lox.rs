//! One interpreter session: scan → parse → resolve → interpret.

use std::io::Write;

use log::{debug, info};

use crate::interpreter::Interpreter;
use crate::parser::parse_program;
use crate::reporter::Reporter;
use crate::resolver::resolve_program;
use crate::scanner::scan_tokens;

/// Outcome of running one chunk of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// A lexical, syntax or resolution error; nothing was executed.
    StaticError,
    /// Execution started and halted on a runtime error.
    RuntimeError,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::StaticError => 65,
            Status::RuntimeError => 70,
        }
    }
}

/// Keeps one [`Interpreter`] alive across runs, so globals and resolved
/// closures from earlier REPL lines stay usable in later ones.
pub struct Lox<R> {
    interpreter: Interpreter,
    reporter: R,
}

impl<R: Reporter> Lox<R> {
    /// A session printing program output to standard output.
    pub fn new(reporter: R) -> Self {
        Self {
            interpreter: Interpreter::new(),
            reporter,
        }
    }

    pub fn with_output(out: Box<dyn Write>, reporter: R) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
            reporter,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn run(&mut self, source: &str) -> Status {
        info!("Running {} byte(s) of source", source.len());

        let (tokens, lex_error) = scan_tokens(source, &mut self.reporter);
        let (statements, parse_error) = parse_program(&tokens, &mut self.reporter);

        if lex_error || parse_error {
            debug!("Static errors before resolution, not running");
            return Status::StaticError;
        }

        if resolve_program(&mut self.interpreter, &statements, &mut self.reporter) {
            debug!("Resolution errors, not running");
            return Status::StaticError;
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Status::Success,
            Err(e) => {
                debug!("Runtime error: {}", e);
                self.reporter.report(&e);
                Status::RuntimeError
            }
        }
    }
}
