//! Smart constructors for [`Expression`] trees.
//!
//! The parser never builds nodes directly; it goes through [`ExprFactory`],
//! which normalizes while it builds:
//!
//! - operations whose operands are all literals are folded to a literal,
//! - `x^n` (integer `n`), `k*x` and `k*p` (integer `k`) become polynomials,
//! - sums and differences of polynomials in the same variable, or of a
//!   polynomial and a literal or its own variable, are merged into one
//!   polynomial,
//! - a conditional with a literal test is replaced by the selected branch.
//!
//! Every transformation writes into fresh coefficient storage, so no two
//! nodes ever share a coefficient sequence.

use std::borrow::Cow;

use calq_env::Variable;

use crate::ast::{
    BinaryExpressionNode, BinaryOperator, ConditionalNode, Expression, PolynomialNode,
    UnaryExpressionNode, UnaryOperator,
};

/// Largest power turned into a polynomial by default.
pub const DEFAULT_MAX_POLYNOMIAL_DEGREE: usize = 64;

/// Builds normalized expression nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprFactory {
    max_polynomial_degree: usize,
}

impl Default for ExprFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprFactory {
    pub fn new() -> Self {
        Self::with_max_polynomial_degree(DEFAULT_MAX_POLYNOMIAL_DEGREE)
    }

    /// A factory that leaves `x^n` as a generic power when `n` exceeds
    /// `max_degree`, bounding the size of coefficient sequences.
    pub fn with_max_polynomial_degree(max_degree: usize) -> Self {
        Self {
            max_polynomial_degree: max_degree,
        }
    }

    pub fn max_polynomial_degree(&self) -> usize {
        self.max_polynomial_degree
    }

    /// An expression whose value is always `value`.
    pub fn literal(&self, value: f64) -> Expression {
        Expression::Literal(value)
    }

    /// `operator(operand)`, folded when the operand is a literal.
    pub fn unary(&self, operator: UnaryOperator, operand: Expression) -> Expression {
        match operand {
            Expression::Literal(v) => Expression::Literal(operator.apply(v)),
            operand => Expression::Unary(Box::new(UnaryExpressionNode { operator, operand })),
        }
    }

    /// `operator(left, right)` with constant folding and polynomial collapsing.
    pub fn binary(
        &self,
        operator: BinaryOperator,
        left: Expression,
        right: Expression,
    ) -> Expression {
        use BinaryOperator::{Add, Mul, Pow, Sub};

        match (operator, left, right) {
            (op, Expression::Literal(a), Expression::Literal(b)) => {
                Expression::Literal(op.apply(a, b))
            }

            (Pow, Expression::Variable(variable), Expression::Literal(n)) => {
                match self.monomial_degree(n) {
                    Some(degree) => {
                        Expression::Polynomial(PolynomialNode::monomial(variable, degree, 1.0))
                    }
                    None => generic(Pow, Expression::Variable(variable), Expression::Literal(n)),
                }
            }

            (Mul, Expression::Literal(k), Expression::Polynomial(poly)) if is_integral(k) => {
                Expression::Polynomial(scale(&poly, k))
            }
            (Mul, Expression::Literal(k), Expression::Variable(variable)) if is_integral(k) => {
                Expression::Polynomial(PolynomialNode::monomial(variable, 1, k))
            }

            (op @ (Add | Sub), left, right) => match polynomial_sum(op, &left, &right) {
                Some(poly) => Expression::Polynomial(poly),
                None => generic(op, left, right),
            },

            (op, left, right) => generic(op, left, right),
        }
    }

    /// `if test then consequent else alternative`.
    ///
    /// A literal test picks its branch now; the other branch is dropped
    /// without ever being evaluated.
    pub fn if_then_else(
        &self,
        test: Expression,
        consequent: Expression,
        alternative: Expression,
    ) -> Expression {
        match test {
            Expression::Literal(t) => {
                if t != 0.0 {
                    consequent
                } else {
                    alternative
                }
            }
            test => Expression::Conditional(Box::new(ConditionalNode {
                test,
                consequent,
                alternative,
            })),
        }
    }

    fn monomial_degree(&self, exponent: f64) -> Option<usize> {
        if is_integral(exponent) && exponent >= 0.0 && exponent <= self.max_polynomial_degree as f64
        {
            Some(exponent as usize)
        } else {
            None
        }
    }
}

fn generic(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(Box::new(BinaryExpressionNode {
        left,
        operator,
        right,
    }))
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.floor() == value
}

fn scale(poly: &PolynomialNode, factor: f64) -> PolynomialNode {
    PolynomialNode {
        coefficients: poly.coefficients.iter().map(|c| c * factor).collect(),
        variable: poly.variable.clone(),
    }
}

/// Merge `left op right` (`op` is `+` or `-`) into one polynomial when at
/// least one side is a polynomial and the other is a polynomial in the same
/// variable, a literal, or that bare variable.
fn polynomial_sum(
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
) -> Option<PolynomialNode> {
    let variable = match (left, right) {
        (Expression::Polynomial(p), Expression::Polynomial(q)) => {
            if p.variable != q.variable {
                return None;
            }
            &p.variable
        }
        (Expression::Polynomial(p), other) | (other, Expression::Polynomial(p)) => match other {
            Expression::Literal(_) => &p.variable,
            Expression::Variable(v) if *v == p.variable => &p.variable,
            _ => return None,
        },
        _ => return None,
    };

    let a = coefficients_of(left, variable)?;
    let b = coefficients_of(right, variable)?;
    let len = a.len().max(b.len());
    let coefficients = (0..len)
        .map(|i| {
            op.apply(
                a.get(i).copied().unwrap_or(0.0),
                b.get(i).copied().unwrap_or(0.0),
            )
        })
        .collect();

    Some(PolynomialNode {
        coefficients,
        variable: variable.clone(),
    })
}

/// Coefficients of `expr` viewed as a polynomial in `variable`.
fn coefficients_of<'e>(expr: &'e Expression, variable: &Variable) -> Option<Cow<'e, [f64]>> {
    match expr {
        Expression::Literal(c) => Some(Cow::Owned(vec![*c])),
        Expression::Variable(v) if v == variable => Some(Cow::Owned(vec![0.0, 1.0])),
        Expression::Polynomial(p) if p.variable == *variable => {
            Some(Cow::Borrowed(p.coefficients.as_slice()))
        }
        _ => None,
    }
}
