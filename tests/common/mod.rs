#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::reporter::VecReporter;
use rox::{Lox, Status};

/// Output sink the test keeps a handle to after the interpreter owns it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("program output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Outcome {
    pub status: Status,
    pub stdout: String,
    pub errors: Vec<String>,
}

/// A session whose output and diagnostics can be inspected between runs.
pub struct Session {
    pub lox: Lox<VecReporter>,
    pub out: SharedBuffer,
}

impl Session {
    pub fn new() -> Self {
        let out = SharedBuffer::default();
        let lox = Lox::with_output(Box::new(out.clone()), VecReporter::new());
        Self { lox, out }
    }

    pub fn run(&mut self, source: &str) -> Status {
        self.lox.run(source)
    }

    pub fn errors(&self) -> Vec<String> {
        self.lox.reporter().messages()
    }
}

pub fn run(source: &str) -> Outcome {
    let mut session = Session::new();
    let status = session.run(source);

    Outcome {
        status,
        stdout: session.out.contents(),
        errors: session.errors(),
    }
}
