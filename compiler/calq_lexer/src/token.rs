//! Semantic tokens and source locations.

use std::fmt;

/// Represents a token's location in the source text.
///
/// Line and column numbers are 1-based; the byte offset is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// The 1-based line number
    pub line: usize,
    /// The 1-based column number, counted in characters
    pub column: usize,
    /// The 0-based byte offset from the start of the source
    pub offset: usize,
}

impl Location {
    /// Location of the first character of a source.
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

/// The kind of a token, with its payload for numbers and words.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Literals and identifiers
    /// Numeric literal
    Number(f64),
    /// Identifier, function name or word operator
    Word(String),

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `>=`
    GreaterEqual,
    /// `>`
    Greater,

    // Punctuation
    /// `,`
    Comma,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,

    /// Input the lexer could not classify
    Invalid(String),
}

impl TokenType {
    /// Canonical source text for the token kind.
    pub fn text(&self) -> String {
        match self {
            TokenType::Number(n) => format!("{n}"),
            TokenType::Word(w) | TokenType::Invalid(w) => w.clone(),
            other => other.symbol().unwrap_or_default().to_string(),
        }
    }

    /// Operator or punctuation symbol, if the kind is one.
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Caret => "^",
            TokenType::Less => "<",
            TokenType::LessEqual => "<=",
            TokenType::Equal => "=",
            TokenType::NotEqual => "<>",
            TokenType::GreaterEqual => ">=",
            TokenType::Greater => ">",
            TokenType::Comma => ",",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::Number(_) | TokenType::Word(_) | TokenType::Invalid(_) => return None,
        };
        Some(s)
    }

    /// Returns true if this is the word `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, TokenType::Word(w) if w == word)
    }
}

/// A token together with the text it was read from and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of the token
    pub token_type: TokenType,
    /// The original source text of the token
    pub lexeme: String,
    /// The location of the token in the source text
    pub location: Location,
}

impl Token {
    /// Creates a new token.
    pub fn new<S: Into<String>>(token_type: TokenType, lexeme: S, location: Location) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            location,
        }
    }

    /// Creates a token that does not come from the source, using the
    /// canonical text of its kind as the lexeme.
    pub fn synthetic(token_type: TokenType, location: Location) -> Self {
        let lexeme = token_type.text();
        Self {
            token_type,
            lexeme,
            location,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Number(n) => write!(f, "number {n}"),
            TokenType::Word(w) => write!(f, "'{w}'"),
            TokenType::Invalid(s) => write!(f, "invalid input '{s}'"),
            other => write!(f, "'{}'", other.symbol().unwrap_or_default()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.token_type, self.location)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
