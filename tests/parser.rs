use pretty_assertions::assert_eq;
use rox::ast::{Expr, Stmt};
use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::reporter::VecReporter;
use rox::scanner::scan_tokens;

fn parse(source: &str) -> (Vec<Stmt>, Vec<String>) {
    let mut reporter = VecReporter::new();
    let (tokens, _) = scan_tokens(source, &mut reporter);
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();
    let errors = parser.errors().iter().map(ToString::to_string).collect();
    (statements, errors)
}

fn printed(source: &str) -> Vec<String> {
    let (statements, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    statements.iter().map(AstPrinter::print_stmt).collect()
}

#[test]
fn precedence_and_left_associativity() {
    assert_eq!(
        printed("print 1 - 2 - 3 * 4 / -5 == !true;"),
        vec!["(print (== (- (- 1.0 2.0) (/ (* 3.0 4.0) (- 5.0))) (! true)))"]
    );
}

#[test]
fn logical_operators_bind_below_equality() {
    assert_eq!(
        printed("a or b and c == d;"),
        vec!["(; (or a (and b (== c d))))"]
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 3;"), vec!["(; (= a (= b 3.0)))"]);
}

#[test]
fn chained_calls_and_property_access() {
    assert_eq!(
        printed("a.b.c()(x).d = 1;"),
        vec!["(; (= (. (call (call (. (. a b) c)) x) d) 1.0))"]
    );
}

#[test]
fn for_loop_is_lowered_to_while() {
    assert_eq!(
        printed("for (var i = 0; i < 3; i = i + 1) print i;"),
        vec!["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
    );
}

#[test]
fn empty_for_clauses_loop_forever() {
    assert_eq!(printed("for (;;) {}"), vec!["(while true (block))"]);
}

#[test]
fn class_with_superclass_and_methods() {
    assert_eq!(
        printed("class B < A { init(x) { this.x = x; } get() { return super.get(); } }"),
        vec![
            "(class B < A (fun init(x) (; (= (. this x) x))) (fun get() (return (call (super get)))))"
        ]
    );
}

#[test]
fn invalid_assignment_target_is_reported_without_stopping() {
    let (statements, errors) = parse("1 + 2 = 3; print 4;");

    assert_eq!(
        errors,
        vec!["[line 1] Error at '=': Invalid assignment target."]
    );
    assert_eq!(statements.len(), 2);
}

#[test]
fn synchronize_surfaces_multiple_errors() {
    let source = "var = 1;\nprint (2;\nvar ok = 3;\nfun f( { }\nprint ok;";
    let (statements, errors) = parse(source);

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Expect variable name.",
            "[line 2] Error at ';': Expect ')' after expression.",
            "[line 4] Error at '{': Expect parameter name.",
        ]
    );

    let printed: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();
    assert_eq!(printed, vec!["(var ok 3.0)", "(print ok)"]);
}

#[test]
fn error_at_end_of_input() {
    let (_, errors) = parse("print 1");
    assert_eq!(errors, vec!["[line 1] Error at end: Expect ';' after value."]);
}

#[test]
fn too_many_arguments_is_reported_but_kept() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));
    let (statements, errors) = parse(&source);

    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("Can't have more than 255 arguments."));

    match &statements[..] {
        [Stmt::Expression(Expr::Call { arguments, .. })] => assert_eq!(arguments.len(), 256),
        other => panic!("unexpected statements {:?}", other),
    }
}

#[test]
fn too_many_parameters_is_reported_but_kept() {
    let params: Vec<String> = (0..260).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));
    let (statements, errors) = parse(&source);

    // One report per parameter past the limit.
    assert_eq!(errors.len(), 5);
    assert!(errors
        .iter()
        .all(|e| e.ends_with("Can't have more than 255 parameters.")));

    match &statements[..] {
        [Stmt::Function(decl)] => assert_eq!(decl.params.len(), 260),
        other => panic!("unexpected statements {:?}", other),
    }
}

#[test]
fn reference_nodes_get_distinct_ids() {
    let (statements, _) = parse("a; a;");

    let ids: Vec<_> = statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected {:?}", other),
        })
        .collect();

    assert_ne!(ids[0], ids[1]);
}
