use loxlet::error::LoxError;
use loxlet::scanner::Scanner;
use loxlet::token::{Token, TokenType};

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let scanner = Scanner::new(source.as_bytes().to_vec());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    assert_eq!(
        tokens.len(),
        expected.len(),
        "token count mismatch for {:?}: {:?}",
        source,
        tokens
    );

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn scans_punctuation() {
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
fn scans_operators_with_maximal_munch() {
    assert_token_sequence(
        "! != = == < <= > >= =< ==>",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::EQUAL, "="),
            (TokenType::LESS, "<"),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::GREATER, ">"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scans_keywords_including_let_and_in() {
    assert_token_sequence(
        "let x = 1 in x and y or class",
        &[
            (TokenType::LET, "let"),
            (TokenType::IDENTIFIER, "x"),
            (TokenType::EQUAL, "="),
            (TokenType::NUMBER(1.0), "1"),
            (TokenType::IN, "in"),
            (TokenType::IDENTIFIER, "x"),
            (TokenType::AND, "and"),
            (TokenType::IDENTIFIER, "y"),
            (TokenType::OR, "or"),
            (TokenType::CLASS, "class"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keyword_prefixes_stay_identifiers() {
    assert_token_sequence(
        "lettuce inn fortune classic",
        &[
            (TokenType::IDENTIFIER, "lettuce"),
            (TokenType::IDENTIFIER, "inn"),
            (TokenType::IDENTIFIER, "fortune"),
            (TokenType::IDENTIFIER, "classic"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scans_number_payloads() {
    let scanner = Scanner::new(b"12 12.5 7. 0.25".to_vec());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    let numbers: Vec<f64> = tokens
        .iter()
        .filter_map(|t| match t.token_type {
            TokenType::NUMBER(n) => Some(n),
            _ => None,
        })
        .collect();

    // `7.` scans as the number 7 followed by a dot.
    assert_eq!(numbers, vec![12.0, 12.5, 7.0, 0.25]);
    assert!(tokens
        .iter()
        .any(|t| t.token_type == TokenType::DOT && t.line == 0));
}

#[test]
fn scans_string_payload_with_quotes_stripped() {
    let scanner = Scanner::new(b"\"hello world\"".to_vec());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    assert_eq!(tokens.len(), 2);
    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "hello world"),
        other => panic!("expected string token, got {:?}", other),
    }
    assert_eq!(tokens[0].lexeme, "\"hello world\"");
}

#[test]
fn lines_are_zero_based_and_strings_span_newlines() {
    let scanner = Scanner::new(b"a\nb \"x\ny\" c".to_vec());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    assert_eq!(tokens[0].lexeme, "a");
    assert_eq!(tokens[0].line, 0);

    assert_eq!(tokens[1].lexeme, "b");
    assert_eq!(tokens[1].line, 1);

    match &tokens[2].token_type {
        TokenType::STRING(s) => assert_eq!(s, "x\ny"),
        other => panic!("expected string token, got {:?}", other),
    }

    // `c` sits on the line after the embedded newline.
    assert_eq!(tokens[3].lexeme, "c");
    assert_eq!(tokens[3].line, 2);
}

#[test]
fn comments_run_to_end_of_line() {
    assert_token_sequence(
        "x // rest is ignored != ==\ny",
        &[
            (TokenType::IDENTIFIER, "x"),
            (TokenType::IDENTIFIER, "y"),
            (TokenType::EOF, ""),
        ],
    );

    let scanner = Scanner::new(b"x // comment\ny".to_vec());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();
    assert_eq!(tokens[1].line, 1);
}

#[test]
fn unexpected_characters_are_errors_in_stream() {
    let scanner = Scanner::new(b",.$(#".to_vec());
    let results: Vec<Result<Token, LoxError>> = scanner.collect();

    // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF.
    assert_eq!(results.len(), 6);

    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(results[3].is_ok());
    assert!(results[5].is_ok());

    let errors: Vec<&LoxError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(errors.len(), 2);

    for err in errors {
        let rendered = err.to_string();
        assert!(
            rendered.contains("Unexpected character"),
            "got: {}",
            rendered
        );
        assert!(rendered.starts_with("[line 0]"), "got: {}", rendered);
    }
}

#[test]
fn unterminated_string_is_an_error() {
    let scanner = Scanner::new(b"\"abc".to_vec());
    let results: Vec<Result<Token, LoxError>> = scanner.collect();

    assert_eq!(results.len(), 2);
    match &results[0] {
        Err(e) => assert!(e.to_string().contains("Unterminated string."), "{}", e),
        Ok(t) => panic!("expected error, got token {:?}", t),
    }
    assert!(matches!(
        &results[1],
        Ok(Token {
            token_type: TokenType::EOF,
            ..
        })
    ));
}

#[test]
fn scan_tokens_partitions_tokens_from_errors() {
    let (tokens, errors) = Scanner::new(b"var x = $ 1;".to_vec()).scan_tokens();

    assert_eq!(errors.len(), 1);
    assert_eq!(
        tokens.iter().map(|t| t.lexeme.as_str()).collect::<Vec<_>>(),
        vec!["var", "x", "=", "1", ";", ""],
    );
    assert_eq!(tokens.last().unwrap().token_type, TokenType::EOF);
}
