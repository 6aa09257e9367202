//! Lexer implementation for calq expressions
//! Converts source text into a stream of tokens for the parser

use logos::Logos;
use std::ops::Range;

use crate::token::{Location, Token, TokenType};
use crate::LogosToken;

/// The main lexer struct that holds the state of the lexing process
pub struct Lexer<'a> {
    /// The source text being lexed
    source: &'a str,
    /// Location of the byte at `location.offset`
    location: Location,
    /// The inner Logos lexer
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            location: Location::start(),
            inner: LogosToken::lexer(source),
        }
    }

    /// Lex a whole source into a token buffer.
    pub fn tokenize(source: &'a str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Location just past the last character of the source, where the
    /// end-of-input marker sits.
    pub fn end_location(source: &str) -> Location {
        advance(Location::start(), source)
    }

    /// Move the tracked location forward to the start of `span`.
    /// Columns count characters, not bytes.
    fn sync_position_to(&mut self, span: &Range<usize>) {
        let skipped = &self.source[self.location.offset..span.start];
        self.location = advance(self.location, skipped);
    }

    /// Convert a LogosToken to our semantic TokenType
    fn convert_token(logos_token: LogosToken) -> TokenType {
        match logos_token {
            LogosToken::Number(n) => TokenType::Number(n),
            LogosToken::Word(w) => TokenType::Word(w),

            LogosToken::LessEqual => TokenType::LessEqual,
            LogosToken::NotEqual => TokenType::NotEqual,
            LogosToken::GreaterEqual => TokenType::GreaterEqual,
            LogosToken::Plus => TokenType::Plus,
            LogosToken::Minus => TokenType::Minus,
            LogosToken::Star => TokenType::Star,
            LogosToken::Slash => TokenType::Slash,
            LogosToken::Caret => TokenType::Caret,
            LogosToken::Less => TokenType::Less,
            LogosToken::Greater => TokenType::Greater,
            LogosToken::Equal => TokenType::Equal,

            LogosToken::Comma => TokenType::Comma,
            LogosToken::LeftParen => TokenType::LeftParen,
            LogosToken::RightParen => TokenType::RightParen,

            // Skipped by logos, never produced
            LogosToken::Whitespace => TokenType::Invalid(String::new()),
        }
    }
}

/// Walk `text` from `from`, returning the location just after it.
fn advance(from: Location, text: &str) -> Location {
    let mut location = from;
    let mut iter = text.chars().peekable();
    while let Some(c) = iter.next() {
        match c {
            '\n' => {
                location.line += 1;
                location.column = 1;
            }
            '\r' => {
                // Windows line endings count once
                if iter.peek() == Some(&'\n') {
                    iter.next();
                }
                location.line += 1;
                location.column = 1;
            }
            _ => location.column += 1,
        }
    }
    location.offset = from.offset + text.len();
    location
}

impl Lexer<'_> {
    /// Get the next token from the source text
    pub fn next_token(&mut self) -> Option<Token> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let lexeme = &self.source[span.clone()];

        self.sync_position_to(&span);
        let location = self.location;

        let token_type = match result {
            Ok(logos_token) => Self::convert_token(logos_token),
            Err(()) => {
                #[cfg(feature = "logging")]
                log::debug!("Invalid input '{}' at {}", lexeme, location);
                TokenType::Invalid(lexeme.to_string())
            }
        };

        #[cfg(feature = "logging")]
        log::trace!("Lexed {:?} '{}' at {}", token_type, lexeme, location);

        Some(Token::new(token_type, lexeme, location))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
