//! Tests for the parser module

mod expressions;

use super::*;
use calq_env::VariableRegistry;

/// A parser over `registry` with the correction search switched off, so
/// errors come back exactly as the grammar raised them.
fn strict(registry: &VariableRegistry) -> Parser<'_> {
    Parser::with_registry(registry).with_config(ParserConfig {
        correct_errors: false,
        ..ParserConfig::default()
    })
}
