//! Raw token definitions driven by `logos`.

use logos::Logos;

/// Raw token type produced by the logos state machine.
///
/// [`crate::Lexer`] converts these into [`crate::TokenType`] values carrying
/// source locations. Function names and the `and`/`or`/`if` keywords are plain
/// words here; the parser decides what a word means from its position.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum LogosToken {
    /// Digits with an optional fraction and exponent (`3`, `2.5`, `1e-3`),
    /// or a fraction with no integer part (`.5`)
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Identifiers, function names and word operators
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Word(String),

    // Compound relational operators (must win over their single-char prefixes)
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `<>`
    #[token("<>")]
    NotEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,

    // Single-character operators
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `^`
    #[token("^")]
    Caret,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `=`
    #[token("=")]
    Equal,

    // Delimiters
    /// `,`
    #[token(",")]
    Comma,
    /// `(`
    #[token("(")]
    LeftParen,
    /// `)`
    #[token(")")]
    RightParen,

    /// Whitespace, skipped
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    Whitespace,
}
