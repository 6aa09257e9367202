use super::*;
use crate::tests::init_test_logger;
use calq_ast::{BinaryOperator, UnaryOperator};
use pretty_assertions::assert_eq;

fn value(input: &str) -> f64 {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);
    parser
        .parse(input)
        .unwrap_or_else(|e| panic!("{input}: {e}"))
        .evaluate()
}

#[test]
fn test_constant_input_folds_to_literal() {
    init_test_logger();
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    let expr = parser.parse("3+2*4").unwrap();
    assert_eq!(expr, Expression::Literal(11.0));
    assert!(registry.is_empty());
}

#[test]
fn test_operator_precedence() {
    assert_eq!(value("2 + 3 * 4"), 14.0);
    assert_eq!(value("(2 + 3) * 4"), 20.0);
    assert_eq!(value("10 - 4 - 3"), 3.0);
    assert_eq!(value("12 / 3 / 2"), 2.0);
    assert_eq!(value("2^2^3"), 256.0);
    assert_eq!(value("2 * 3 ^ 2"), 18.0);
}

#[test]
fn test_prefix_minus_binding() {
    // Looser than `*` and `^`, tighter than `+`
    assert_eq!(value("-2^2"), -4.0);
    assert_eq!(value("-2 * 3 + 10"), 4.0);
    assert_eq!(value("2 * -3"), -6.0);
    assert_eq!(value("- - 3"), 3.0);
    assert_eq!(value("1 - -1"), 2.0);
}

#[test]
fn test_relational_and_logic() {
    assert_eq!(value("1 < 2 and 3 > 4"), 0.0);
    assert_eq!(value("1 < 2 or 3 > 4"), 1.0);
    // `or` binds tighter than `and`
    assert_eq!(value("0 and 1 or 1"), 0.0);
    assert_eq!(value("2 <> 3"), 1.0);
    assert_eq!(value("1 + 1 = 2"), 1.0);
}

#[test]
fn test_function_calls() {
    assert_eq!(value("max(2, 3)"), 3.0);
    assert_eq!(value("min(2, 3) + abs(-4)"), 6.0);
    assert_eq!(value("sqrt(16)"), 4.0);
    assert_eq!(value("if(2 > 1, 10, 20)"), 10.0);
    assert!((value("atan2(1, 1)") - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    assert_eq!(value("pi"), std::f64::consts::PI);
}

#[test]
fn test_ieee_results_are_not_errors() {
    assert_eq!(value("1/0"), f64::INFINITY);
    assert!(value("0/0").is_nan());
    assert!(value("log(-1)").is_nan());
    assert_eq!(value("log(0)"), f64::NEG_INFINITY);
}

#[test]
fn test_polynomial_collapsing() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    let expr = parser.parse("3*x^2 + x - 6").unwrap();
    let poly = expr.as_polynomial().expect("polynomial");
    assert_eq!(poly.coefficients(), &[-6.0, 1.0, 3.0]);
    assert_eq!(poly.variable().name(), "x");
    assert_eq!(expr.to_string(), "(3*x^2 + x - 6)");

    let x = registry.get("x").unwrap();
    x.set_value(2.0);
    assert_eq!(expr.evaluate(), 8.0);

    let square = parser.parse("x^2 + 2*x + 1").unwrap();
    assert_eq!(square.as_polynomial().unwrap().coefficients(), &[1.0, 2.0, 1.0]);
    assert_eq!(square.evaluate(), 9.0);
}

#[test]
fn test_non_polynomial_shapes_stay_generic() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    // Literal on the right of `*`
    match parser.parse("x*2").unwrap() {
        Expression::Binary(node) => assert_eq!(node.operator, BinaryOperator::Mul),
        other => panic!("expected a binary node, got {other:?}"),
    }
    // Fractional exponent
    assert!(matches!(parser.parse("x^2.5").unwrap(), Expression::Binary(_)));
    // Variable plus literal without any polynomial involved
    assert!(matches!(parser.parse("x + 1").unwrap(), Expression::Binary(_)));
    // Two different variables
    assert!(matches!(parser.parse("x^2 + y^2").unwrap(), Expression::Binary(_)));
}

#[test]
fn test_polynomial_degree_limit() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry).with_config(ParserConfig {
        max_polynomial_degree: 2,
        ..ParserConfig::default()
    });

    assert!(parser.parse("x^2").unwrap().as_polynomial().is_some());
    assert!(matches!(parser.parse("x^3").unwrap(), Expression::Binary(_)));
}

#[test]
fn test_negated_polynomial_is_unary() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    match parser.parse("-x^3").unwrap() {
        Expression::Unary(node) => {
            assert_eq!(node.operator, UnaryOperator::Neg);
            assert!(node.operand.as_polynomial().is_some());
        }
        other => panic!("expected negation, got {other:?}"),
    }
}

#[test]
fn test_literal_condition_drops_branch() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    let expr = parser.parse("if(0, x, 137)").unwrap();
    assert_eq!(expr, Expression::Literal(137.0));

    let live = parser.parse("if(x, 1, 2)").unwrap();
    assert!(matches!(live, Expression::Conditional(_)));
}

#[test]
fn test_variables_share_identity() {
    let registry = VariableRegistry::new();
    let a = Parser::with_registry(&registry);
    let b = Parser::with_registry(&registry);

    let first = a.parse("x + 1").unwrap();
    let second = b.parse("x * x").unwrap();
    assert_eq!(registry.len(), 1);

    registry.lookup_or_create("x").set_value(3.0);
    assert_eq!(first.evaluate(), 4.0);
    assert_eq!(second.evaluate(), 9.0);
}

#[test]
fn test_syntax_errors() {
    let registry = VariableRegistry::new();
    let parser = strict(&registry);

    let err = parser.parse("3 +").unwrap_err();
    assert_eq!(err.kind, ErrorKind::PrematureEof);
    assert_eq!(err.token_index, 2);
    assert_eq!(err.location.column, 4);

    let err = parser.parse("(3").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    assert_eq!(err.expected.as_deref(), Some(")"));

    let err = parser.parse("max(1 2)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    assert_eq!(err.expected.as_deref(), Some(","));
    assert_eq!(err.token_index, 3);

    let err = parser.parse(")").unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadFactor);
    assert_eq!(err.token_index, 0);

    let err = parser.parse("3 4").unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteExpression);
    assert_eq!(err.token_index, 1);

    let err = parser.parse("2 $ 3").unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteExpression);
}

#[test]
fn test_empty_input() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    for input in ["", "   "] {
        let err = parser.parse(input).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PrematureEof);
        assert_eq!(err.token_index, 0);
    }
}

#[test]
fn test_nesting_limit() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry).with_config(ParserConfig {
        max_nesting_depth: 4,
        ..ParserConfig::default()
    });

    assert_eq!(parser.parse("(((1)))").unwrap(), Expression::Literal(1.0));

    let err = parser.parse("((((1))))").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep);
    assert_eq!(err.token_index, 4);
}

#[test]
fn test_long_operator_chain_is_bounded() {
    init_test_logger();
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    let products = vec!["x"; 20_000].join(" * ");
    let err = parser.parse(&products).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep);

    let limit = DEFAULT_MAX_NESTING_DEPTH;
    let fits = vec!["x"; limit + 1].join(" * ");
    assert!(parser.parse(&fits).is_ok());
    let over = vec!["x"; limit + 2].join(" * ");
    assert_eq!(parser.parse(&over).unwrap_err().kind, ErrorKind::NestingTooDeep);
}

#[test]
fn test_long_folding_chains_parse() {
    let registry = VariableRegistry::new();
    let parser = Parser::with_registry(&registry);

    let ones = vec!["1"; 20_000].join(" + ");
    assert_eq!(parser.parse(&ones).unwrap(), Expression::Literal(20_000.0));

    let terms = vec!["2*x"; 20_000].join(" + ");
    let expr = parser.parse(&terms).unwrap();
    assert!(matches!(expr, Expression::Polynomial(_)), "{expr}");
    registry.lookup_or_create("x").set_value(0.5);
    assert_eq!(expr.evaluate(), 20_000.0);
}

#[test]
fn test_allow_list() {
    let registry = VariableRegistry::new();
    let x = registry.lookup_or_create("x");
    let mut parser = Parser::with_registry(&registry);
    assert!(!parser.is_restricted());

    parser.allow(Some(&x));
    assert!(parser.is_restricted());
    assert!(parser.parse("x^2 + pi").is_ok());

    let err = parser.parse("w").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownVariable);
    assert_eq!(err.expected.as_deref(), Some("w"));
    // Rejected names are never registered
    assert!(!registry.contains("w"));
}

#[test]
fn test_allow_none_locks_out_variables() {
    let registry = VariableRegistry::new();
    let mut parser = Parser::with_registry(&registry);
    parser.allow(None);

    assert_eq!(parser.parse("x").unwrap_err().kind, ErrorKind::UnknownVariable);
    assert_eq!(parser.parse("2 * pi").unwrap().evaluate(), 2.0 * std::f64::consts::PI);
}
