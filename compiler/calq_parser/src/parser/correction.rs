//! Single-edit error correction.
//!
//! When a parse fails, the search edits the token buffer one token at a time
//! and reparses from scratch after every edit. Insertions are tried first,
//! then deletions, then substitutions; each phase walks backward from the
//! token where the first parse failed.

use std::fmt;

use calq_ast::{BinaryOperator, Expression, UnaryOperator};
use calq_lexer::{Location, Token, TokenType};

use super::grammar::Grammar;
use super::token_stream::{Edit, TokenBuffer};

/// Which kind of edit repaired the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionKind {
    Insertion,
    Deletion,
    Substitution,
}

/// The edit that made a failing input parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub kind: CorrectionKind,
    /// Token index the edit applied at, in the uncorrected buffer
    pub index: usize,
    /// Token added by an insertion or substitution
    pub inserted: Option<Token>,
    /// Token dropped by a deletion or substitution
    pub removed: Option<Token>,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lexeme = |token: &Option<Token>| {
            token
                .as_ref()
                .map(|t| t.lexeme.clone())
                .unwrap_or_default()
        };
        match self.kind {
            CorrectionKind::Insertion => write!(
                f,
                "inserted '{}' at token {}",
                lexeme(&self.inserted),
                self.index
            ),
            CorrectionKind::Deletion => write!(
                f,
                "deleted '{}' at token {}",
                lexeme(&self.removed),
                self.index
            ),
            CorrectionKind::Substitution => write!(
                f,
                "replaced '{}' with '{}' at token {}",
                lexeme(&self.removed),
                lexeme(&self.inserted),
                self.index
            ),
        }
    }
}

impl Correction {
    /// The buffer edit this correction stands for
    pub fn edit(&self) -> Option<Edit> {
        match self.kind {
            CorrectionKind::Insertion => Some(Edit::Insert {
                index: self.index,
                token: self.inserted.clone()?,
            }),
            CorrectionKind::Deletion => Some(Edit::Delete { index: self.index }),
            CorrectionKind::Substitution => Some(Edit::Substitute {
                index: self.index,
                token: self.inserted.clone()?,
            }),
        }
    }
}

/// The fixed candidate token set, in trial order, located at `location`.
pub fn candidates(location: Location) -> Vec<Token> {
    let mut types = vec![
        TokenType::Number(1.0),
        TokenType::Star,
        TokenType::Slash,
        TokenType::Plus,
        TokenType::Minus,
        TokenType::Caret,
        TokenType::Less,
        TokenType::Greater,
        TokenType::Equal,
        TokenType::Comma,
        TokenType::LeftParen,
        TokenType::RightParen,
        TokenType::Word("x".to_string()),
    ];
    types.extend(
        UnaryOperator::FUNCTIONS
            .iter()
            .map(|op| TokenType::Word(op.name().to_string())),
    );
    types.extend(
        BinaryOperator::FUNCTIONS
            .iter()
            .map(|op| TokenType::Word(op.name().to_string())),
    );
    types.extend([
        TokenType::LessEqual,
        TokenType::NotEqual,
        TokenType::GreaterEqual,
        TokenType::Word("if".to_string()),
    ]);

    types
        .into_iter()
        .map(|token_type| Token::synthetic(token_type, location))
        .collect()
}

/// Search for one edit that makes `buffer` parse, starting at token `anchor`.
///
/// Trials run speculatively and leave the registry alone; only the accepted
/// edit is parsed again with `grammar`. The buffer is left unchanged
/// whatever the outcome.
pub(crate) fn correct(
    grammar: &Grammar<'_>,
    buffer: &mut TokenBuffer,
    anchor: usize,
) -> Option<(Expression, Correction)> {
    let anchor = anchor.min(buffer.len());
    let speculative = grammar.speculative();

    let (tree, correction) = try_insertions(&speculative, buffer, anchor)
        .or_else(|| try_deletions(&speculative, buffer, anchor))
        .or_else(|| try_substitutions(&speculative, buffer, anchor))?;

    let undo = buffer.apply(correction.edit()?);
    let committed = grammar.commit(buffer, tree);
    buffer.undo(undo);
    match committed {
        Ok(expr) => Some((expr, correction)),
        Err(err) => {
            log::warn!("Accepted correction failed to reparse: {}", err);
            None
        }
    }
}

/// Apply `edit`, reparse, and roll it back.
fn trial(grammar: &Grammar<'_>, buffer: &mut TokenBuffer, edit: Edit) -> Option<Expression> {
    log::trace!("Trying {:?}", edit);
    let undo = buffer.apply(edit);
    let result = grammar.parse(buffer);
    buffer.undo(undo);
    result.ok()
}

fn try_insertions(
    grammar: &Grammar<'_>,
    buffer: &mut TokenBuffer,
    anchor: usize,
) -> Option<(Expression, Correction)> {
    for index in (0..=anchor).rev() {
        for token in candidates(buffer.location_at(index)) {
            let edit = Edit::Insert {
                index,
                token: token.clone(),
            };
            if let Some(expr) = trial(grammar, buffer, edit) {
                return Some((
                    expr,
                    Correction {
                        kind: CorrectionKind::Insertion,
                        index,
                        inserted: Some(token),
                        removed: None,
                    },
                ));
            }
        }
    }
    None
}

fn try_deletions(
    grammar: &Grammar<'_>,
    buffer: &mut TokenBuffer,
    anchor: usize,
) -> Option<(Expression, Correction)> {
    for index in (0..=anchor).rev() {
        let removed = match buffer.get(index) {
            Some(token) => token.clone(),
            None => continue,
        };
        if let Some(expr) = trial(grammar, buffer, Edit::Delete { index }) {
            return Some((
                expr,
                Correction {
                    kind: CorrectionKind::Deletion,
                    index,
                    inserted: None,
                    removed: Some(removed),
                },
            ));
        }
    }
    None
}

fn try_substitutions(
    grammar: &Grammar<'_>,
    buffer: &mut TokenBuffer,
    anchor: usize,
) -> Option<(Expression, Correction)> {
    for index in (0..=anchor).rev() {
        let removed = match buffer.get(index) {
            Some(token) => token.clone(),
            None => continue,
        };
        for token in candidates(removed.location) {
            let edit = Edit::Substitute {
                index,
                token: token.clone(),
            };
            if let Some(expr) = trial(grammar, buffer, edit) {
                return Some((
                    expr,
                    Correction {
                        kind: CorrectionKind::Substitution,
                        index,
                        inserted: Some(token),
                        removed: Some(removed),
                    },
                ));
            }
        }
    }
    None
}
