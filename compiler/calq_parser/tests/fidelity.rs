//! Normalization must not change what an expression evaluates to.
//!
//! Random expressions in one variable are rendered to text, parsed (which
//! folds constants and collapses polynomials) and compared against a direct
//! evaluation of the same tree.

use calq_env::VariableRegistry;
use calq_parser::Parser;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Term {
    Number(u8),
    X,
    Neg(Box<Term>),
    Add(Box<Term>, Box<Term>),
    Sub(Box<Term>, Box<Term>),
    Mul(Box<Term>, Box<Term>),
    Pow(Box<Term>, u8),
}

impl Term {
    fn source(&self) -> String {
        match self {
            Term::Number(n) => n.to_string(),
            Term::X => "x".to_string(),
            Term::Neg(t) => format!("(-{})", t.source()),
            Term::Add(a, b) => format!("({} + {})", a.source(), b.source()),
            Term::Sub(a, b) => format!("({} - {})", a.source(), b.source()),
            Term::Mul(a, b) => format!("({} * {})", a.source(), b.source()),
            Term::Pow(a, n) => format!("({} ^ {})", a.source(), n),
        }
    }

    fn value(&self, x: f64) -> f64 {
        match self {
            Term::Number(n) => f64::from(*n),
            Term::X => x,
            Term::Neg(t) => -t.value(x),
            Term::Add(a, b) => a.value(x) + b.value(x),
            Term::Sub(a, b) => a.value(x) - b.value(x),
            Term::Mul(a, b) => a.value(x) * b.value(x),
            Term::Pow(a, n) => a.value(x).powf(f64::from(*n)),
        }
    }

    /// The value with every intermediate taken in absolute value, a bound on
    /// the rounding error either evaluation order can accumulate.
    fn magnitude(&self, x: f64) -> f64 {
        match self {
            Term::Number(n) => f64::from(*n),
            Term::X => x.abs(),
            Term::Neg(t) => t.magnitude(x),
            Term::Add(a, b) | Term::Sub(a, b) => a.magnitude(x) + b.magnitude(x),
            Term::Mul(a, b) => a.magnitude(x) * b.magnitude(x),
            Term::Pow(a, n) => a.magnitude(x).powf(f64::from(*n)),
        }
    }
}

fn close(expected: f64, actual: f64, scale: f64) -> bool {
    (expected - actual).abs() <= 1e-9 * scale.max(1.0)
}

fn term() -> impl Strategy<Value = Term> {
    let leaf = prop_oneof![(0u8..6).prop_map(Term::Number), Just(Term::X)];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| Term::Neg(Box::new(t))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Term::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Term::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Term::Mul(Box::new(a), Box::new(b))),
            (inner, 0u8..4).prop_map(|(a, n)| Term::Pow(Box::new(a), n)),
        ]
    })
}

proptest! {
    #[test]
    fn parsed_tree_evaluates_like_the_source(t in term(), x in -2.0f64..2.0) {
        let registry = VariableRegistry::new();
        let parser = Parser::with_registry(&registry);
        let source = t.source();

        let expr = parser.parse(&source).map_err(|e| TestCaseError::fail(e.to_string()))?;
        registry.lookup_or_create("x").set_value(x);

        let expected = t.value(x);
        let actual = expr.evaluate();
        prop_assert!(
            close(expected, actual, t.magnitude(x)),
            "{} at x = {}: expected {}, got {}", source, x, expected, actual
        );
    }

    #[test]
    fn reparsing_the_rendered_tree_preserves_value(t in term(), x in -2.0f64..2.0) {
        let registry = VariableRegistry::new();
        let parser = Parser::with_registry(&registry);
        registry.lookup_or_create("x").set_value(x);

        let first = parser.parse(&t.source()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let rendered = first.to_string();
        let second = parser.parse(&rendered).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let (a, b) = (first.evaluate(), second.evaluate());
        prop_assert!(
            close(a, b, t.magnitude(x)),
            "{} rendered as {}: {} vs {}", t.source(), rendered, a, b
        );
    }
}
