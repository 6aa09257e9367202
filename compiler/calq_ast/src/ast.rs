// Expression tree for calq.
// Nodes are built once by the factory and only ever read afterwards;
// variable slots are the single mutable part.

use std::fmt;

use calq_env::Variable;
#[cfg(feature = "serde")]
use serde::Serialize;

/// An evaluable expression tree.
///
/// Every node except [`Expression::Variable`] owns its children. Variables are
/// shared handles, so setting a variable's value changes the result of every
/// tree that mentions it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Expression {
    Literal(f64),
    Unary(Box<UnaryExpressionNode>),
    Binary(Box<BinaryExpressionNode>),
    Conditional(Box<ConditionalNode>),
    Polynomial(PolynomialNode),
    Variable(Variable),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct UnaryExpressionNode {
    pub operator: UnaryOperator,
    pub operand: Expression,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BinaryExpressionNode {
    pub left: Expression,
    pub operator: BinaryOperator,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConditionalNode {
    pub test: Expression,
    pub consequent: Expression,
    pub alternative: Expression,
}

/// A polynomial in one variable.
///
/// `coefficients[i]` multiplies `variable^i`, so the degree is
/// `coefficients.len() - 1`. The sequence is never empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PolynomialNode {
    pub(crate) coefficients: Vec<f64>,
    pub(crate) variable: Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum UnaryOperator {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceil,
    Cos,
    Exp,
    Floor,
    Log,
    Neg,
    Round,
    Sin,
    Sqrt,
    Tan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Atan2,
    Max,
    Min,
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    And,
    Or,
}

impl UnaryOperator {
    /// Operators callable by name, in the order the parser tries them.
    pub const FUNCTIONS: [UnaryOperator; 13] = [
        UnaryOperator::Abs,
        UnaryOperator::Acos,
        UnaryOperator::Asin,
        UnaryOperator::Atan,
        UnaryOperator::Ceil,
        UnaryOperator::Cos,
        UnaryOperator::Exp,
        UnaryOperator::Floor,
        UnaryOperator::Log,
        UnaryOperator::Round,
        UnaryOperator::Sin,
        UnaryOperator::Sqrt,
        UnaryOperator::Tan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnaryOperator::Abs => "abs",
            UnaryOperator::Acos => "acos",
            UnaryOperator::Asin => "asin",
            UnaryOperator::Atan => "atan",
            UnaryOperator::Ceil => "ceil",
            UnaryOperator::Cos => "cos",
            UnaryOperator::Exp => "exp",
            UnaryOperator::Floor => "floor",
            UnaryOperator::Log => "log",
            UnaryOperator::Neg => "neg",
            UnaryOperator::Round => "round",
            UnaryOperator::Sin => "sin",
            UnaryOperator::Sqrt => "sqrt",
            UnaryOperator::Tan => "tan",
        }
    }

    /// Look up a function by name. Negation has no function syntax.
    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::FUNCTIONS.into_iter().find(|op| op.name() == name)
    }

    /// Apply the operator. Domain errors come back as NaN or infinity.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOperator::Abs => x.abs(),
            UnaryOperator::Acos => x.acos(),
            UnaryOperator::Asin => x.asin(),
            UnaryOperator::Atan => x.atan(),
            UnaryOperator::Ceil => x.ceil(),
            UnaryOperator::Cos => x.cos(),
            UnaryOperator::Exp => x.exp(),
            UnaryOperator::Floor => x.floor(),
            UnaryOperator::Log => x.ln(),
            UnaryOperator::Neg => -x,
            // Halfway cases go to the even neighbour
            UnaryOperator::Round => x.round_ties_even(),
            UnaryOperator::Sin => x.sin(),
            UnaryOperator::Sqrt => x.sqrt(),
            UnaryOperator::Tan => x.tan(),
        }
    }
}

impl BinaryOperator {
    /// Operators written as two-argument function calls.
    pub const FUNCTIONS: [BinaryOperator; 3] = [
        BinaryOperator::Atan2,
        BinaryOperator::Max,
        BinaryOperator::Min,
    ];

    /// Source spelling: a symbol for infix operators, a name otherwise.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Pow => "^",
            BinaryOperator::Atan2 => "atan2",
            BinaryOperator::Max => "max",
            BinaryOperator::Min => "min",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Gt => ">",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::FUNCTIONS.into_iter().find(|op| op.name() == name)
    }

    pub fn is_function(self) -> bool {
        Self::FUNCTIONS.contains(&self)
    }

    /// Apply the operator. Comparisons and logic yield exactly 1.0 or 0.0.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        fn truth(condition: bool) -> f64 {
            if condition {
                1.0
            } else {
                0.0
            }
        }
        match self {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::Div => a / b,
            BinaryOperator::Pow => a.powf(b),
            BinaryOperator::Atan2 => a.atan2(b),
            BinaryOperator::Max => {
                if a < b {
                    b
                } else {
                    a
                }
            }
            BinaryOperator::Min => {
                if a < b {
                    a
                } else {
                    b
                }
            }
            BinaryOperator::Lt => truth(a < b),
            BinaryOperator::Le => truth(a <= b),
            BinaryOperator::Eq => truth(a == b),
            BinaryOperator::Ne => truth(a != b),
            BinaryOperator::Ge => truth(a >= b),
            BinaryOperator::Gt => truth(a > b),
            BinaryOperator::And => truth(a != 0.0 && b != 0.0),
            BinaryOperator::Or => truth(a != 0.0 || b != 0.0),
        }
    }
}

impl Expression {
    /// Calculate the expression's value given the current variable values.
    pub fn evaluate(&self) -> f64 {
        match self {
            Expression::Literal(v) => *v,
            Expression::Unary(node) => node.operator.apply(node.operand.evaluate()),
            Expression::Binary(node) => node
                .operator
                .apply(node.left.evaluate(), node.right.evaluate()),
            Expression::Conditional(node) => {
                if node.test.evaluate() != 0.0 {
                    node.consequent.evaluate()
                } else {
                    node.alternative.evaluate()
                }
            }
            Expression::Polynomial(poly) => poly.evaluate(),
            Expression::Variable(var) => var.value(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }

    pub fn as_polynomial(&self) -> Option<&PolynomialNode> {
        match self {
            Expression::Polynomial(poly) => Some(poly),
            _ => None,
        }
    }
}

impl PolynomialNode {
    /// Build a polynomial from coefficients in ascending power.
    /// Returns `None` for an empty coefficient list.
    pub fn new(coefficients: Vec<f64>, variable: Variable) -> Option<Self> {
        if coefficients.is_empty() {
            return None;
        }
        Some(Self {
            coefficients,
            variable,
        })
    }

    /// `coefficient * variable^degree`
    pub fn monomial(variable: Variable, degree: usize, coefficient: f64) -> Self {
        let mut coefficients = vec![0.0; degree + 1];
        coefficients[degree] = coefficient;
        Self {
            coefficients,
            variable,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Number of non-zero coefficients.
    pub fn terms(&self) -> usize {
        self.coefficients.iter().filter(|c| **c != 0.0).count()
    }

    /// Horner's rule, highest power first. A constant polynomial never reads
    /// its variable.
    pub fn evaluate(&self) -> f64 {
        let (last, rest) = match self.coefficients.split_last() {
            Some(split) => split,
            None => return 0.0,
        };
        if rest.is_empty() {
            return *last;
        }
        let x = self.variable.value();
        rest.iter().rev().fold(*last, |acc, c| acc * x + c)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{v}"),
            Expression::Unary(node) => match node.operator {
                UnaryOperator::Neg => write!(f, "(-{})", node.operand),
                op => write!(f, "{}({})", op.name(), node.operand),
            },
            Expression::Binary(node) => {
                if node.operator.is_function() {
                    write!(f, "{}({}, {})", node.operator.name(), node.left, node.right)
                } else {
                    write!(f, "({} {} {})", node.left, node.operator.name(), node.right)
                }
            }
            Expression::Conditional(node) => write!(
                f,
                "if({}, {}, {})",
                node.test, node.consequent, node.alternative
            ),
            Expression::Polynomial(poly) => write!(f, "{poly}"),
            Expression::Variable(var) => write!(f, "{var}"),
        }
    }
}

impl fmt::Display for PolynomialNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.variable.name();
        let terms: Vec<(usize, f64)> = self
            .coefficients
            .iter()
            .copied()
            .enumerate()
            .rev()
            .filter(|(_, c)| *c != 0.0)
            .collect();
        if terms.is_empty() {
            return write!(f, "0");
        }
        if terms.len() > 1 {
            write!(f, "(")?;
        }
        for (i, (power, coefficient)) in terms.iter().enumerate() {
            let magnitude = if i == 0 {
                *coefficient
            } else {
                write!(f, " {} ", if *coefficient < 0.0 { '-' } else { '+' })?;
                coefficient.abs()
            };
            match (power, magnitude) {
                (0, c) => write!(f, "{c}")?,
                (_, c) if c == 1.0 => {}
                (_, c) if c == -1.0 => write!(f, "-")?,
                (_, c) => write!(f, "{c}*")?,
            }
            match power {
                0 => {}
                1 => write!(f, "{name}")?,
                p => write!(f, "{name}^{p}")?,
            }
        }
        if terms.len() > 1 {
            write!(f, ")")?;
        }
        Ok(())
    }
}
