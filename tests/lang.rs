//! Runs every program under `tests/lox/` and compares against the
//! expectations written in its comments:
//!
//! * `// out: text`    one line of expected standard output
//! * `// error: text`  one line of expected diagnostics
//! * `// status: runtime` or `// status: static` for a failing program

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rox::Status;

struct Expectation {
    stdout: String,
    errors: Vec<String>,
    status: Status,
}

fn expectation(source: &str) -> Expectation {
    let mut stdout = String::new();
    let mut errors = Vec::new();
    let mut status = Status::Success;

    for line in source.lines() {
        let Some((_, comment)) = line.split_once("//") else {
            continue;
        };
        let comment = comment.trim_start();

        if let Some(text) = comment.strip_prefix("out: ") {
            stdout.push_str(text);
            stdout.push('\n');
        } else if let Some(text) = comment.strip_prefix("error: ") {
            // Runtime diagnostics span two lines, written as `msg | [line N]`.
            errors.push(text.replace(" | ", "\n"));
        } else if let Some(kind) = comment.strip_prefix("status: ") {
            status = match kind.trim() {
                "runtime" => Status::RuntimeError,
                "static" => Status::StaticError,
                other => panic!("unknown status '{}'", other),
            };
        }
    }

    Expectation {
        stdout,
        errors,
        status,
    }
}

fn programs() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("lox");

    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("cannot read {:?}: {}", dir, e))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "lox"))
        .collect();

    paths.sort();
    paths
}

#[test]
fn lox_programs_behave_as_annotated() {
    let paths = programs();
    assert!(!paths.is_empty(), "no programs found under tests/lox");

    for path in paths {
        let source = fs::read_to_string(&path).expect("program is readable");
        let expected = expectation(&source);
        let outcome = common::run(&source);

        assert_eq!(outcome.stdout, expected.stdout, "stdout of {:?}", path);
        assert_eq!(outcome.errors, expected.errors, "diagnostics of {:?}", path);
        assert_eq!(outcome.status, expected.status, "status of {:?}", path);
    }
}
