//! Expression trees for calq.
//!
//! This crate defines the closed set of expression nodes, their evaluation,
//! and the [`ExprFactory`] smart constructors that fold constants and collapse
//! single-variable polynomials while a tree is being built.

pub mod ast;
pub mod factory;

// Re-export commonly used types
pub use ast::{
    BinaryExpressionNode, BinaryOperator, ConditionalNode, Expression, PolynomialNode,
    UnaryExpressionNode, UnaryOperator,
};
pub use factory::{ExprFactory, DEFAULT_MAX_POLYNOMIAL_DEGREE};

/// Errors raised while exporting a tree.
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[cfg(feature = "serde")]
    #[error("failed to serialize expression: {0}")]
    Json(#[from] serde_json::Error),
}

/// A result type for AST operations.
pub type Result<T> = std::result::Result<T, AstError>;

/// Serializes an expression tree to a pretty-printed JSON string.
///
/// Variables are written with their name and current value.
///
/// # Example
///
/// ```
/// use calq_ast::{to_json, ExprFactory, BinaryOperator};
///
/// let f = ExprFactory::new();
/// let expr = f.binary(BinaryOperator::Add, f.literal(1.0), f.literal(2.0));
/// let json = to_json(&expr).unwrap();
/// assert!(json.contains(r#""Literal": 3.0"#));
/// ```
#[cfg(feature = "serde")]
pub fn to_json(expr: &Expression) -> Result<String> {
    Ok(serde_json::to_string_pretty(expr)?)
}
