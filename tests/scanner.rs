use pretty_assertions::assert_eq;
use rox::reporter::VecReporter;
use rox::scanner::{scan_tokens, Scanner};
use rox::token::{Token, TokenType};

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

    assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn test_scanner_01_symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn two_char_operators_win_over_prefixes() {
    assert_token_sequence(
        "!= == <= >= ! = < >",
        &[
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::BANG, "!"),
            (TokenType::EQUAL, "="),
            (TokenType::LESS, "<"),
            (TokenType::GREATER, ">"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keywords_and_identifiers() {
    assert_token_sequence(
        "class classy _under fun funny this super2",
        &[
            (TokenType::CLASS, "class"),
            (TokenType::IDENTIFIER, "classy"),
            (TokenType::IDENTIFIER, "_under"),
            (TokenType::FUN, "fun"),
            (TokenType::IDENTIFIER, "funny"),
            (TokenType::THIS, "this"),
            (TokenType::IDENTIFIER, "super2"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn numbers_do_not_swallow_bare_dots() {
    let tokens: Vec<Token> = Scanner::new("12.5 7. .5")
        .filter_map(Result::ok)
        .collect();

    let kinds: Vec<&str> = tokens.iter().map(|t| t.token_type.name()).collect();
    assert_eq!(
        kinds,
        vec!["NUMBER", "NUMBER", "DOT", "DOT", "NUMBER", "EOF"]
    );

    assert!(matches!(tokens[0].token_type, TokenType::NUMBER(n) if n == 12.5));
    assert!(matches!(tokens[1].token_type, TokenType::NUMBER(n) if n == 7.0));
    assert!(matches!(tokens[4].token_type, TokenType::NUMBER(n) if n == 5.0));
}

#[test]
fn strings_span_lines_without_escapes() {
    let tokens: Vec<Token> = Scanner::new("\"a\nb\\n\" x")
        .filter_map(Result::ok)
        .collect();

    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "a\nb\\n"),
        other => panic!("expected string, got {:?}", other),
    }
    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[1].lexeme, "x");
}

#[test]
fn comments_are_skipped_and_lines_counted() {
    let source = "// line one\n/* two\nthree */ a /* x /* y */ z */ b\n";
    let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(lexemes, vec!["a", "b", ""]);
    assert_eq!(tokens[0].line, 3);
    assert_eq!(tokens[2].line, 4);
}

#[test]
fn deeply_nested_block_comment() {
    let mut source = String::new();
    for _ in 0..50 {
        source.push_str("/* ");
    }
    source.push_str("print 1;\n");
    for _ in 0..50 {
        source.push_str(" */");
    }
    source.push_str(" after");

    let results: Vec<_> = Scanner::new(&source).collect();
    assert!(results.iter().all(Result::is_ok));

    let tokens: Vec<Token> = results.into_iter().filter_map(Result::ok).collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].lexeme, "after");
    assert_eq!(tokens[0].line, 2);
}

#[test]
fn unterminated_block_comment_is_reported() {
    let mut reporter = VecReporter::new();
    let (tokens, had_error) = scan_tokens("a /* open /* inner */\n", &mut reporter);

    assert!(had_error);
    assert_eq!(
        reporter.messages(),
        vec!["[line 2] Error: Unterminated block comment.".to_string()]
    );
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].token_type, TokenType::EOF);
}

#[test]
fn test_unexpected_chars_token_sequence() {
    let results: Vec<_> = Scanner::new(",.$(#").collect();

    // COMMA, DOT, error, LEFT_PAREN, error, EOF
    assert_eq!(results.len(), 6, "Expected 6 items in result");

    let error_count = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(error_count, 2, "Expected 2 error messages");

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.to_string(), "[line 1] Error: Unexpected character.");
    }

    assert!(matches!(&results[3], Ok(t) if t.token_type == TokenType::LEFT_PAREN));
}

#[test]
fn non_ascii_character_is_reported_once() {
    let results: Vec<_> = Scanner::new("a é b").collect();

    let errors = results.iter().filter(|r| r.is_err()).count();
    let lexemes: Vec<String> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|t| t.lexeme.clone())
        .collect();

    assert_eq!(errors, 1);
    assert_eq!(lexemes, vec!["a", "b", ""]);
}

#[test]
fn unterminated_string_reports_and_continues() {
    let mut reporter = VecReporter::new();
    let (tokens, had_error) = scan_tokens("print 1;\n\"abc", &mut reporter);

    assert!(had_error);
    assert_eq!(
        reporter.messages(),
        vec!["[line 2] Error: Unterminated string.".to_string()]
    );

    let kinds: Vec<&str> = tokens.iter().map(|t| t.token_type.name()).collect();
    assert_eq!(kinds, vec!["PRINT", "NUMBER", "SEMICOLON", "EOF"]);
}

#[test]
fn scanning_continues_after_errors() {
    let mut reporter = VecReporter::new();
    let (tokens, _) = scan_tokens("@ var x = 1; # print x;", &mut reporter);

    assert_eq!(reporter.errors.len(), 2);
    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(
        lexemes,
        vec!["var", "x", "=", "1", ";", "print", "x", ";", ""]
    );
}

#[test]
fn token_display_matches_tokenize_output() {
    let tokens: Vec<Token> = Scanner::new("var n = 42; \"hi\" 1.5")
        .filter_map(Result::ok)
        .collect();
    let lines: Vec<String> = tokens.iter().map(ToString::to_string).collect();

    assert_eq!(
        lines,
        vec![
            "VAR var null",
            "IDENTIFIER n null",
            "EQUAL = null",
            "NUMBER 42 42.0",
            "SEMICOLON ; null",
            "STRING \"hi\" hi",
            "NUMBER 1.5 1.5",
            "EOF  null",
        ]
    );
}

#[test]
fn scanner_is_fused_after_eof() {
    let mut scanner = Scanner::new("");
    assert!(matches!(scanner.next(), Some(Ok(t)) if t.token_type == TokenType::EOF));
    assert!(scanner.next().is_none());
    assert!(scanner.next().is_none());
}
