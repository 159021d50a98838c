//! Diagnostic sinks shared by every pass.

use std::io::Write;

use crate::error::LoxError;

/// Receives diagnostics from the scanner, parser, resolver and interpreter.
/// Reporting never fails and never aborts the caller.
pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, error: &LoxError) {
        (**self).report(error)
    }
}

/// Renders each diagnostic to a writer (stderr in the binary).
pub struct WriteReporter<W> {
    writer: W,
}

impl<W> WriteReporter<W> {
    pub fn new(writer: W) -> WriteReporter<W> {
        WriteReporter { writer }
    }
}

impl<W> Reporter for WriteReporter<W>
where
    W: Write,
{
    fn report(&mut self, error: &LoxError) {
        // Diagnostics are best effort; a closed stderr is not an error.
        _ = writeln!(self.writer, "{}", error);
    }
}

/// Keeps diagnostics in memory, in the order they were reported.
#[derive(Debug, Default)]
pub struct VecReporter {
    pub errors: Vec<LoxError>,
}

impl VecReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered diagnostics, one string each.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl Reporter for VecReporter {
    fn report(&mut self, error: &LoxError) {
        let line = error.line().unwrap_or(0);
        let message = error.message();

        self.errors.push(match error {
            LoxError::Lex { .. } => LoxError::lex(line, message),
            LoxError::Parse { .. } => LoxError::parse(line, error.location(), message),
            LoxError::Resolve { .. } => LoxError::resolve(line, error.location(), message),
            _ => LoxError::runtime(line, message),
        });
    }
}
