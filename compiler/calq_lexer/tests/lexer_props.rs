use calq_lexer::{Lexer, TokenType};
use proptest::prelude::*;

fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

proptest! {
    #[test]
    fn numbers_lex_to_their_value(value in 0.0f64..1.0e9) {
        let text = format!("{value}");
        let tokens = Lexer::tokenize(&text);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].token_type, &TokenType::Number(value));
    }

    #[test]
    fn lexemes_cover_the_source(words in proptest::collection::vec("[a-z]{1,6}|[0-9]{1,4}|[-+*/^(),=<>]", 1..12)) {
        let source = words.join(" ");
        let tokens = Lexer::tokenize(&source);
        prop_assert_eq!(tokens.len(), words.len());
        for (token, word) in tokens.iter().zip(&words) {
            prop_assert_eq!(&token.lexeme, word);
            prop_assert_eq!(&source[token.location.offset..token.location.offset + word.len()], word.as_str());
        }
    }
}

#[test]
fn test_lexer_logs_without_panicking() {
    init_test_logger();
    let tokens = Lexer::tokenize("sin(x) # 2");
    assert!(tokens
        .iter()
        .any(|t| t.token_type == TokenType::Invalid("#".to_string())));
}
