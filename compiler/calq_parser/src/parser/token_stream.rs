use calq_lexer::{Lexer, Location, Token, TokenType};

/// The lexed input, kept as an editable buffer.
///
/// The parser reads it through a [`TokenStream`] cursor that always starts
/// from the first token, so a buffer can be edited and parsed again from
/// scratch. End of input is implicit: it sits just past the last token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
    end: Location,
}

/// One single-token edit of a [`TokenBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert { index: usize, token: Token },
    Delete { index: usize },
    Substitute { index: usize, token: Token },
}

/// What it takes to revert an applied [`Edit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Undo {
    Remove { index: usize },
    Restore { index: usize, token: Token },
    Replace { index: usize, token: Token },
}

impl TokenBuffer {
    /// Create a buffer from tokens and the location of the end of input
    pub fn new(tokens: Vec<Token>, end: Location) -> Self {
        TokenBuffer { tokens, end }
    }

    /// Lex `source` into a buffer
    pub fn from_source(source: &str) -> Self {
        Self::new(Lexer::tokenize(source), Lexer::end_location(source))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Location of the token at `index`, or of the end of input past the last token
    pub fn location_at(&self, index: usize) -> Location {
        self.tokens
            .get(index)
            .map(|t| t.location)
            .unwrap_or(self.end)
    }

    /// A cursor positioned at the first token
    pub fn stream(&self) -> TokenStream<'_> {
        TokenStream {
            tokens: &self.tokens,
            end: self.end,
            position: 0,
        }
    }

    /// Insert `token` before position `index` (`index == len()` appends)
    pub fn insert(&mut self, index: usize, token: Token) {
        self.tokens.insert(index, token);
    }

    pub fn remove(&mut self, index: usize) -> Token {
        self.tokens.remove(index)
    }

    /// Replace the token at `index`, returning the one it displaced
    pub fn replace(&mut self, index: usize, token: Token) -> Token {
        std::mem::replace(&mut self.tokens[index], token)
    }

    /// Apply an edit and return how to revert it.
    pub fn apply(&mut self, edit: Edit) -> Undo {
        match edit {
            Edit::Insert { index, token } => {
                self.insert(index, token);
                Undo::Remove { index }
            }
            Edit::Delete { index } => {
                let token = self.remove(index);
                Undo::Restore { index, token }
            }
            Edit::Substitute { index, token } => {
                let token = self.replace(index, token);
                Undo::Replace { index, token }
            }
        }
    }

    /// Revert an edit previously returned by [`TokenBuffer::apply`].
    /// Undos must be applied in reverse order of their edits.
    pub fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Remove { index } => {
                self.remove(index);
            }
            Undo::Restore { index, token } => self.insert(index, token),
            Undo::Replace { index, token } => {
                self.replace(index, token);
            }
        }
    }

    /// Source text rebuilt from the token lexemes, separated by spaces
    pub fn to_source(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A read cursor over a [`TokenBuffer`]
pub struct TokenStream<'a> {
    /// The tokens being parsed
    tokens: &'a [Token],
    /// Where the end-of-input marker sits
    end: Location,
    /// Current position in the token stream
    position: usize,
}

impl<'a> TokenStream<'a> {
    /// Get the current token without advancing; `None` at end of input
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    pub fn peek_type(&self) -> Option<&'a TokenType> {
        self.peek().map(|t| &t.token_type)
    }

    /// Move past the current token
    pub fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Index of the current token (equal to the token count at end of input)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Location of the current token or of the end of input
    pub fn location(&self) -> Location {
        self.peek().map(|t| t.location).unwrap_or(self.end)
    }

    /// Check if we're at the end of input
    pub fn is_empty(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stream_walks_tokens() {
        let buffer = TokenBuffer::from_source("1 + x");
        let mut stream = buffer.stream();
        assert_eq!(stream.peek_type(), Some(&TokenType::Number(1.0)));
        stream.advance();
        stream.advance();
        assert_eq!(stream.position(), 2);
        assert_eq!(stream.peek_type(), Some(&TokenType::Word("x".into())));
        stream.advance();
        assert!(stream.is_empty());
        assert_eq!(stream.location(), Location { line: 1, column: 6, offset: 5 });
        stream.advance();
        assert_eq!(stream.position(), 3);
    }

    #[test]
    fn test_edits_round_trip_through_undo() {
        let original = TokenBuffer::from_source("3 2 )");
        let mut buffer = original.clone();
        let star = Token::synthetic(TokenType::Star, buffer.location_at(1));
        let plus = Token::synthetic(TokenType::Plus, buffer.location_at(0));

        for edit in [
            Edit::Insert { index: 1, token: star.clone() },
            Edit::Insert { index: 3, token: star },
            Edit::Delete { index: 2 },
            Edit::Substitute { index: 0, token: plus },
        ] {
            let undo = buffer.apply(edit);
            assert_ne!(buffer, original);
            buffer.undo(undo);
            assert_eq!(buffer, original);
        }
    }

    #[test]
    fn test_to_source() {
        let mut buffer = TokenBuffer::from_source("3 2");
        let star = Token::synthetic(TokenType::Star, buffer.location_at(1));
        buffer.apply(Edit::Insert { index: 1, token: star });
        assert_eq!(buffer.to_source(), "3 * 2");
    }
}
