use std::fmt::Write;

use calq_lexer::Location;

/// Why a parse failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A specific token (such as `)` or `,`) was required but something else appeared
    UnexpectedToken,
    /// Input ended where an operand was required
    PrematureEof,
    /// An identifier outside the active allow-list
    UnknownVariable,
    /// A complete expression was followed by unconsumed tokens
    IncompleteExpression,
    /// The current token cannot begin an operand
    BadFactor,
    /// Parentheses, unary minus or function calls nested past the configured limit
    NestingTooDeep,
}

impl ErrorKind {
    /// Stable reason code for the kind.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "expected",
            ErrorKind::PrematureEof => "premature-eof",
            ErrorKind::UnknownVariable => "unknown-variable",
            ErrorKind::IncompleteExpression => "incomplete",
            ErrorKind::BadFactor => "bad-factor",
            ErrorKind::NestingTooDeep => "nesting-too-deep",
        }
    }

    /// Whether a single-token edit could plausibly repair this kind of error.
    /// Unknown variables and runaway nesting are not typos.
    pub fn is_correctable(self) -> bool {
        !matches!(self, ErrorKind::UnknownVariable | ErrorKind::NestingTooDeep)
    }
}

/// A parse failure, anchored at a token of the input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {location}")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub message: String,
    /// Index of the offending token; the token count when input ran out
    pub token_index: usize,
    /// Source location of the offending token or of the end of input
    pub location: Location,
    /// Text of the token that was required, for [`ErrorKind::UnexpectedToken`]
    pub expected: Option<String>,
}

impl SyntaxError {
    pub fn new<S: Into<String>>(
        kind: ErrorKind,
        message: S,
        token_index: usize,
        location: Location,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            token_index,
            location,
            expected: None,
        }
    }

    pub fn with_expected<S: Into<String>>(mut self, expected: S) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Render the error against the source it came from, with a caret under
    /// the offending position:
    ///
    /// ```text
    /// error[bad-factor]: Expected a factor
    ///  --> 1:5
    ///   |
    /// 1 | 3 + )
    ///   |     ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        let line_no = self.location.line.max(1);
        let gutter = " ".repeat(line_no.to_string().len());
        let line = source.lines().nth(line_no - 1).unwrap_or("");

        let _ = writeln!(out, "error[{}]: {}", self.kind.code(), self.message);
        let _ = writeln!(out, "{gutter}--> {}", self.location);
        let _ = writeln!(out, "{gutter} |");
        let _ = writeln!(out, "{line_no} | {line}");
        let _ = write!(
            out,
            "{gutter} | {}^",
            " ".repeat(self.location.column.saturating_sub(1))
        );
        if let Some(expected) = &self.expected {
            let _ = write!(out, "\n{gutter} = expected '{expected}'");
        }
        out
    }
}
