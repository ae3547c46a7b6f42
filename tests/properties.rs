use proptest::prelude::*;

use loxlet::scanner::Scanner;
use loxlet::token::TokenType;
use loxlet::value::Value;

static FIXED_LEXEMES: &[&str] = &[
    "(", ")", "{", "}", ",", ".", ";", "+", "-", "*", "/", "!", "!=", "=", "==", "<", "<=", ">",
    ">=", "and", "or", "if", "else", "while", "for", "fun", "return", "var", "nil", "true",
    "false", "print", "let", "in", "class", "super", "this",
];

/// One well-formed lexeme: punctuation/keyword, identifier, number, or a
/// quoted string without embedded quotes.
fn lexeme() -> BoxedStrategy<String> {
    prop_oneof![
        prop::sample::select(FIXED_LEXEMES).prop_map(str::to_string),
        prop::string::string_regex("[a-z_][a-z0-9_]{0,7}").unwrap(),
        prop::string::string_regex("(0|[1-9][0-9]{0,3})(\\.[0-9]{1,2})?").unwrap(),
        prop::string::string_regex("\"[a-z ]{0,10}\"").unwrap(),
    ]
    .boxed()
}

proptest! {
    /// Scanning, re-assembling the lexemes with single spaces, and scanning
    /// again reproduces the same token stream.
    #[test]
    fn tokenization_survives_lexeme_reassembly(lexemes in prop::collection::vec(lexeme(), 0..40)) {
        let source = lexemes.join(" ");

        let (first, errors) = Scanner::new(source.clone().into_bytes()).scan_tokens();
        prop_assert!(errors.is_empty(), "scan errors in {:?}: {:?}", source, errors);

        let reassembled = first
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let (second, errors) = Scanner::new(reassembled.into_bytes()).scan_tokens();
        prop_assert!(errors.is_empty());

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(&a.token_type, &b.token_type);
            prop_assert_eq!(&a.lexeme, &b.lexeme);
        }
    }

    /// A number literal with no trailing zeros displays back exactly as it
    /// was written.
    #[test]
    fn scanned_numbers_display_back(
        text in prop::string::string_regex("(0|[1-9][0-9]{0,5})(\\.[0-9]{0,3}[1-9])?").unwrap()
    ) {
        let (tokens, errors) = Scanner::new(text.clone().into_bytes()).scan_tokens();
        prop_assert!(errors.is_empty());

        match &tokens[0].token_type {
            TokenType::NUMBER(n) => {
                prop_assert_eq!(Value::Number(*n).to_string(), text);
            }
            other => prop_assert!(false, "expected number token, got {:?}", other),
        }
    }

    /// Arbitrary bytes never panic the scanner, and the token side of the
    /// stream always terminates with EOF.
    #[test]
    fn scanner_is_total_over_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let (tokens, _errors) = Scanner::new(bytes).scan_tokens();

        let last = tokens.last().expect("EOF token always present");
        prop_assert_eq!(&last.token_type, &TokenType::EOF);
    }
}
