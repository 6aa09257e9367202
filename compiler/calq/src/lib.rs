//! calq: parse, normalize and evaluate arithmetic and logical expressions.
//!
//! ```
//! let value = calq::evaluate_str("2^2^3 - max(1, 6)").unwrap();
//! assert_eq!(value, 250.0);
//! ```
//!
//! For variables, build a [`Parser`] over a [`VariableRegistry`], parse once
//! and evaluate as often as the values change:
//!
//! ```
//! use calq::{Parser, VariableRegistry};
//!
//! let registry = VariableRegistry::new();
//! let parser = Parser::with_registry(&registry);
//! let expr = parser.parse("3*x^2 + x - 6").unwrap();
//!
//! let x = registry.lookup_or_create("x");
//! x.set_value(2.0);
//! assert_eq!(expr.evaluate(), 8.0);
//! ```

use std::num::ParseFloatError;

pub use calq_ast::{
    to_json, AstError, BinaryOperator, ExprFactory, Expression, PolynomialNode, UnaryOperator,
};
pub use calq_env::{global, Variable, VariableRegistry};
pub use calq_lexer::{Lexer, Location, Token, TokenType};
pub use calq_parser::{
    Correction, CorrectionKind, ErrorKind, ParseReport, Parser, ParserConfig, SyntaxError,
};

/// Parse `text` against the process-wide registry and evaluate it once.
pub fn evaluate_str(text: &str) -> Result<f64, SyntaxError> {
    Parser::new().parse(text).map(|expr| expr.evaluate())
}

/// Errors reported by the `calq` command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid assignment '{0}': expected name=value")]
    InvalidAssignment(String),

    #[error("invalid value in '{text}': {source}")]
    InvalidValue {
        text: String,
        #[source]
        source: ParseFloatError,
    },

    /// A parse failure, already rendered against its input
    #[error("{rendered}")]
    Syntax {
        rendered: String,
        #[source]
        source: SyntaxError,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for the error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Syntax { .. } => 1,
            _ => 2,
        }
    }
}

/// Split a `name=value` command-line assignment.
pub fn parse_assignment(text: &str) -> Result<(String, f64), CliError> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| CliError::InvalidAssignment(text.to_string()))?;
    let name = name.trim();
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_identifier {
        return Err(CliError::InvalidAssignment(text.to_string()));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|source| CliError::InvalidValue {
            text: text.to_string(),
            source,
        })?;
    Ok((name.to_string(), value))
}

/// How one command-line invocation parses its expression.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Variable values to set before evaluating
    pub assignments: Vec<(String, f64)>,
    /// Names the parser accepts when restricted
    pub allow: Vec<String>,
    /// Restrict variables even when `allow` is empty
    pub strict: bool,
    pub config: ParserConfig,
}

/// A private registry plus the options to parse against it.
#[derive(Debug, Default)]
pub struct Session {
    registry: VariableRegistry,
    options: Options,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Session {
            registry: VariableRegistry::new(),
            options,
        }
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// A parser configured from the session options. Allowed names are
    /// registered so the allow-list can refer to them.
    pub fn parser(&self) -> Parser<'_> {
        let mut parser =
            Parser::with_registry(&self.registry).with_config(self.options.config.clone());
        if self.options.strict || !self.options.allow.is_empty() {
            parser.allow(None);
            for name in &self.options.allow {
                parser.allow(Some(&self.registry.lookup_or_create(name)));
            }
        }
        parser
    }

    /// Parse `text`, rendering any error against it.
    pub fn parse(&self, text: &str) -> Result<ParseReport, CliError> {
        let parser = self.parser();
        parser
            .parse_with_report(text)
            .map_err(|source| CliError::Syntax {
                rendered: parser.explain(text, &source),
                source,
            })
    }

    /// Parse `text`, apply the assignments and evaluate.
    pub fn evaluate(&self, text: &str) -> Result<(ParseReport, f64), CliError> {
        let report = self.parse(text)?;
        for (name, value) in &self.options.assignments {
            self.registry.lookup_or_create(name).set_value(*value);
        }
        let value = report.expression.evaluate();
        log::debug!("{} = {}", report.expression, value);
        Ok((report, value))
    }
}

/// The JSON document printed by `calq eval --json`.
pub fn report_json(text: &str, report: &ParseReport, value: f64) -> Result<String, CliError> {
    let document = serde_json::json!({
        "input": text,
        "normalized": report.expression.to_string(),
        "correction": report.correction.as_ref().map(|c| c.to_string()),
        "value": value,
        "tree": serde_json::to_value(&report.expression)?,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}
