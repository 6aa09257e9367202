//! calq lexical analyzer
//!
//! Converts expression source text into the token buffer consumed by the
//! parser. Whitespace is insignificant; anything the lexer does not recognise
//! is kept as an [`TokenType::Invalid`] token so the parser can report it at
//! the right position (and the correction search can delete it).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod lexer;
pub mod logos_token;
pub mod token;

// Re-export the main types for convenience
pub use lexer::Lexer;
pub use logos_token::LogosToken;
pub use token::{Location, Token, TokenType};
