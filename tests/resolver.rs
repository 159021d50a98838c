mod common;

use common::{run, Session};
use pretty_assertions::assert_eq;
use rox::ast::{Expr, Stmt};
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::reporter::VecReporter;
use rox::resolver::Resolver;
use rox::scanner::scan_tokens;
use rox::Status;

fn resolve_errors(source: &str) -> Vec<String> {
    let outcome = run(source);
    assert_eq!(outcome.status, Status::StaticError, "source: {}", source);
    assert_eq!(outcome.stdout, "", "nothing may run after a resolution error");
    outcome.errors
}

#[test]
fn self_referencing_global_initializer_blocks_the_whole_program() {
    assert_eq!(
        resolve_errors("print \"before\";\nvar a = a;\nprint \"after\";"),
        vec!["[line 2] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn redeclared_global_reads_its_previous_value() {
    let outcome = run("var a = 1;\nvar a = a + 1;\nprint a;");
    assert_eq!(outcome.status, Status::Success, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.stdout, "2\n");
}

#[test]
fn repl_line_may_redeclare_a_global_from_an_earlier_line() {
    let mut session = Session::new();

    assert_eq!(session.run("var a = 1;"), Status::Success);
    assert_eq!(session.run("var a = a + 1;"), Status::Success);
    assert_eq!(session.run("print a;"), Status::Success);
    assert_eq!(session.out.contents(), "2\n");

    // A name never defined before is still caught.
    assert_eq!(session.run("var b = b;"), Status::StaticError);
    assert_eq!(
        session.errors(),
        vec!["[line 1] Error at 'b': Can't read local variable in its own initializer."]
    );
}

#[test]
fn self_referencing_local_initializer() {
    assert_eq!(
        resolve_errors("var a = 1;\n{\n  var a = a + 1;\n}"),
        vec!["[line 3] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn top_level_return() {
    assert_eq!(
        resolve_errors("return 1;"),
        vec!["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn initializer_may_return_without_value_only() {
    assert_eq!(
        resolve_errors("class A { init() { return 1; } }"),
        vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
    );

    let outcome = run("class A { init() { return; } }\nprint A();");
    assert_eq!(outcome.status, Status::Success);
    assert_eq!(outcome.stdout, "A instance\n");
}

#[test]
fn this_and_super_outside_methods() {
    assert_eq!(
        resolve_errors("print this;\nfun f() { super.g(); }"),
        vec![
            "[line 1] Error at 'this': Can't use 'this' outside of a class.",
            "[line 2] Error at 'super': Can't use 'super' outside of a class.",
        ]
    );
}

#[test]
fn super_without_superclass() {
    assert_eq!(
        resolve_errors("class A { f() { super.f(); } }"),
        vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn class_cannot_inherit_from_itself() {
    assert_eq!(
        resolve_errors("class A < A {}"),
        vec!["[line 1] Error at 'A': A class can't inherit from itself."]
    );
}

#[test]
fn duplicate_local_declaration() {
    assert_eq!(
        resolve_errors("fun f() {\n  var a = 1;\n  var a = 2;\n}"),
        vec!["[line 3] Error at 'a': Already a variable with this name in this scope."]
    );

    // Globals may be redeclared.
    let outcome = run("var a = 1; var a = 2; print a;");
    assert_eq!(outcome.stdout, "2\n");
}

#[test]
fn all_resolution_errors_are_reported_in_one_pass() {
    let errors = resolve_errors("return;\nprint this;\nclass A < A {}");
    assert_eq!(errors.len(), 3);
}

#[test]
fn distances_count_scopes_crossed() {
    let source = "{ var a = 1; { { print a; } } }\nprint g;";
    let mut reporter = VecReporter::new();
    let (tokens, _) = scan_tokens(source, &mut reporter);
    let statements = Parser::new(&tokens).parse();

    let mut interpreter = Interpreter::with_output(Box::new(std::io::sink()));
    let mut resolver = Resolver::new(&mut interpreter);
    resolver.resolve(&statements);
    assert!(!resolver.had_error());

    let inner_a = match &statements[0] {
        Stmt::Block(outer) => match &outer[1] {
            Stmt::Block(middle) => match &middle[0] {
                Stmt::Block(inner) => match &inner[0] {
                    Stmt::Print(Expr::Variable { id, .. }) => *id,
                    other => panic!("unexpected {:?}", other),
                },
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        },
        other => panic!("unexpected {:?}", other),
    };

    let global_g = match &statements[1] {
        Stmt::Print(Expr::Variable { id, .. }) => *id,
        other => panic!("unexpected {:?}", other),
    };

    assert_eq!(interpreter.local_depth(inner_a), Some(2));
    assert_eq!(interpreter.local_depth(global_g), None);
}

#[test]
fn static_scoping_ignores_later_shadowing() {
    let outcome = run(
        "var a = \"global\";\n\
         {\n\
           fun show() { print a; }\n\
           show();\n\
           var a = \"block\";\n\
           show();\n\
         }",
    );

    assert_eq!(outcome.stdout, "global\nglobal\n");
}

#[test]
fn repl_lines_can_refer_to_earlier_globals() {
    let mut session = Session::new();

    assert_eq!(session.run("fun make() { var n = 0; fun inc() { n = n + 1; return n; } return inc; }"), Status::Success);
    assert_eq!(session.run("var counter = make();"), Status::Success);
    assert_eq!(session.run("print counter(); print counter();"), Status::Success);
    assert_eq!(session.out.contents(), "1\n2\n");
}
