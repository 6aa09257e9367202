//! Expression parser for calq.
//!
//! Text is lexed into a [`TokenBuffer`] and parsed by precedence climbing.
//! Every node is built through an [`ExprFactory`], so constant subtrees are
//! folded and single-variable polynomials collapsed while parsing. A failed
//! parse triggers a single-token correction search before the error is
//! reported.

pub mod correction;
pub mod diagnostics;
mod grammar;
pub mod token_stream;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use calq_ast::{ExprFactory, Expression, DEFAULT_MAX_POLYNOMIAL_DEGREE};
use calq_env::{Variable, VariableRegistry};

pub use correction::{Correction, CorrectionKind};
pub use diagnostics::{ErrorKind, SyntaxError};
pub use grammar::{infix_operator, PI_NAME};
pub use token_stream::{TokenBuffer, TokenStream};

use grammar::Grammar;

/// Default limit on nested factors (parentheses, calls, prefix minus,
/// right-hand operands) and on the height of the built tree.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Run the correction search when a parse fails
    pub correct_errors: bool,
    /// Highest integer power folded into a polynomial node
    pub max_polynomial_degree: usize,
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            correct_errors: true,
            max_polynomial_degree: DEFAULT_MAX_POLYNOMIAL_DEGREE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// A successful parse, with the edit that made it possible if the input
/// needed one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub expression: Expression,
    pub correction: Option<Correction>,
}

impl ParseReport {
    pub fn was_corrected(&self) -> bool {
        self.correction.is_some()
    }
}

/// Parses expression text against a variable registry.
///
/// Identifiers resolve through the registry, so every parser sharing a
/// registry sees one [`Variable`] per name. By default any identifier is
/// accepted and registered on first use; after the first call to
/// [`Parser::allow`] only allowed variables (and `pi`) are.
#[derive(Debug)]
pub struct Parser<'r> {
    registry: &'r VariableRegistry,
    allowed: Option<HashSet<Variable>>,
    config: ParserConfig,
}

impl Parser<'static> {
    /// Create a parser over the process-wide registry
    pub fn new() -> Self {
        Parser::with_registry(calq_env::global())
    }
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Parser<'r> {
    /// Create a parser over its own registry
    pub fn with_registry(registry: &'r VariableRegistry) -> Self {
        Parser {
            registry,
            allowed: None,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r VariableRegistry {
        self.registry
    }

    /// Restrict the identifiers this parser accepts.
    ///
    /// The first call switches the parser to restricted mode whatever its
    /// argument; `allow(None)` on a fresh parser therefore leaves only
    /// literals and `pi` usable. A variable argument is added to the
    /// allowed set. Allowed variables must come from this parser's registry.
    pub fn allow(&mut self, variable: Option<&Variable>) {
        let allowed = self.allowed.get_or_insert_with(|| {
            log::debug!("Restricting parser to allowed variables");
            HashSet::new()
        });
        if let Some(variable) = variable {
            allowed.insert(variable.clone());
        }
    }

    /// Whether [`Parser::allow`] has been called
    pub fn is_restricted(&self) -> bool {
        self.allowed.is_some()
    }

    /// Parse `text` into an expression tree.
    pub fn parse(&self, text: &str) -> Result<Expression, SyntaxError> {
        self.parse_with_report(text).map(|report| report.expression)
    }

    /// Parse `text`, reporting whether a correction was needed.
    ///
    /// Names are registered only once the input (or its correction) is known
    /// to parse, so a failed parse leaves the registry as it was.
    pub fn parse_with_report(&self, text: &str) -> Result<ParseReport, SyntaxError> {
        let mut buffer = TokenBuffer::from_source(text);
        log::trace!("Parsing {} tokens: {}", buffer.len(), text);
        let grammar = self.grammar();

        let error = match grammar.speculative().parse(&buffer) {
            Ok(tree) => {
                return Ok(ParseReport {
                    expression: grammar.commit(&buffer, tree)?,
                    correction: None,
                })
            }
            Err(error) => error,
        };

        if !self.config.correct_errors || buffer.is_empty() || !error.kind.is_correctable() {
            return Err(error);
        }

        log::debug!("Parse failed: {}; searching for a correction", error);
        match correction::correct(&grammar, &mut buffer, error.token_index) {
            Some((expression, correction)) => {
                log::debug!("Recovered by {}", correction);
                Ok(ParseReport {
                    expression,
                    correction: Some(correction),
                })
            }
            None => {
                log::debug!("No single-token correction for: {}", text);
                Err(error)
            }
        }
    }

    /// Render `error` against `text`, adding the edit the correction search
    /// would make when there is one.
    pub fn explain(&self, text: &str, error: &SyntaxError) -> String {
        let mut rendered = error.render(text);
        let mut buffer = TokenBuffer::from_source(text);
        if buffer.is_empty() || !error.kind.is_correctable() {
            return rendered;
        }
        let grammar = self.grammar().speculative();
        if let Some((_, correction)) = correction::correct(&grammar, &mut buffer, error.token_index)
        {
            rendered.push_str(&format!("\n  = help: {correction}"));
        }
        rendered
    }

    fn grammar(&self) -> Grammar<'_> {
        Grammar {
            registry: self.registry,
            allowed: self.allowed.as_ref(),
            factory: ExprFactory::with_max_polynomial_degree(self.config.max_polynomial_degree),
            max_depth: self.config.max_nesting_depth,
            register: true,
        }
    }
}
