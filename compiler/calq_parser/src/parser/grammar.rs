//! Precedence-climbing grammar for calq expressions.
//!
//! ```text
//! expr    --> factor ( infix expr )*        (climbing on binding powers)
//! factor  --> NUMBER
//!           | "(" expr ")"
//!           | "-" expr@35
//!           | UNARY_FN "(" expr ")"
//!           | BINARY_FN "(" expr "," expr ")"
//!           | "if" "(" expr "," expr "," expr ")"
//!           | "pi"
//!           | VARIABLE
//! ```

use std::collections::HashSet;
use std::f64::consts::PI;

use calq_ast::{BinaryOperator, ExprFactory, Expression, UnaryOperator};
use calq_env::{Variable, VariableRegistry};
use calq_lexer::TokenType;

use super::diagnostics::{ErrorKind, SyntaxError};
use super::token_stream::{TokenBuffer, TokenStream};

/// Name of the built-in constant for pi.
pub const PI_NAME: &str = "pi";

/// Binding power of the operand of prefix minus: tighter than `+ -`,
/// looser than `* /`.
const NEGATION_POWER: u8 = 35;

/// Left and right binding powers of an infix operator token.
///
/// Higher binds tighter. Left-associative operators use `r = l + 1`,
/// right-associative ones `r = l`.
pub fn infix_operator(token_type: &TokenType) -> Option<(BinaryOperator, u8, u8)> {
    let entry = match token_type {
        TokenType::Word(w) if w == "and" => (BinaryOperator::And, 5, 6),
        TokenType::Word(w) if w == "or" => (BinaryOperator::Or, 10, 11),

        TokenType::Less => (BinaryOperator::Lt, 20, 21),
        TokenType::LessEqual => (BinaryOperator::Le, 20, 21),
        TokenType::Equal => (BinaryOperator::Eq, 20, 21),
        TokenType::NotEqual => (BinaryOperator::Ne, 20, 21),
        TokenType::GreaterEqual => (BinaryOperator::Ge, 20, 21),
        TokenType::Greater => (BinaryOperator::Gt, 20, 21),

        TokenType::Plus => (BinaryOperator::Add, 30, 31),
        TokenType::Minus => (BinaryOperator::Sub, 30, 31),

        TokenType::Slash => (BinaryOperator::Div, 40, 41),
        TokenType::Star => (BinaryOperator::Mul, 40, 41),

        TokenType::Caret => (BinaryOperator::Pow, 50, 50),

        _ => return None,
    };
    Some(entry)
}

/// Everything a parse consults besides the tokens.
#[derive(Clone, Copy)]
pub(crate) struct Grammar<'p> {
    pub registry: &'p VariableRegistry,
    /// `None` means any variable name is accepted
    pub allowed: Option<&'p HashSet<Variable>>,
    pub factory: ExprFactory,
    /// Limit on both parser recursion and the height of the built tree
    pub max_depth: usize,
    /// Register unknown names; a speculative grammar resolves them to
    /// detached variables instead
    pub register: bool,
}

/// A built subtree and the height of its chain of operator nodes.
/// Literals, variables and polynomials have height 0.
struct Subtree {
    expr: Expression,
    height: usize,
}

impl<'p> Grammar<'p> {
    /// The same grammar, leaving the registry untouched.
    pub fn speculative(&self) -> Grammar<'p> {
        Grammar {
            register: false,
            ..*self
        }
    }

    /// Parse the whole buffer from its first token. Every token must be
    /// consumed.
    pub fn parse(&self, buffer: &TokenBuffer) -> Result<Expression, SyntaxError> {
        let mut stream = buffer.stream();
        let subtree = self.parse_expr(&mut stream, 0, 0)?;
        if !stream.is_empty() {
            return Err(error(&stream, ErrorKind::IncompleteExpression, "Incomplete expression"));
        }
        Ok(subtree.expr)
    }

    /// Turn a tree from a successful speculative parse of `buffer` into one
    /// whose variables live in the registry.
    pub fn commit(&self, buffer: &TokenBuffer, tree: Expression) -> Result<Expression, SyntaxError> {
        if self.register && self.allowed.is_none() {
            self.parse(buffer)
        } else {
            Ok(tree)
        }
    }

    fn parse_expr(
        &self,
        stream: &mut TokenStream<'_>,
        min_precedence: u8,
        depth: usize,
    ) -> Result<Subtree, SyntaxError> {
        let mut lhs = self.parse_factor(stream, depth)?;

        while let Some(token_type) = stream.peek_type() {
            let (operator, left, right) = match infix_operator(token_type) {
                Some(entry) => entry,
                None => break,
            };
            if left < min_precedence {
                break;
            }
            stream.advance();
            let rhs = self.parse_expr(stream, right, depth + 1)?;
            let expr = self.factory.binary(operator, lhs.expr, rhs.expr);
            lhs = self.node(stream, expr, &[lhs.height, rhs.height])?;
        }

        Ok(lhs)
    }

    fn parse_factor(
        &self,
        stream: &mut TokenStream<'_>,
        depth: usize,
    ) -> Result<Subtree, SyntaxError> {
        let token = match stream.peek() {
            Some(token) => token,
            None => return Err(error(stream, ErrorKind::PrematureEof, "Expected a factor")),
        };

        if depth >= self.max_depth {
            return Err(too_deep(stream));
        }
        let depth = depth + 1;

        match &token.token_type {
            TokenType::Number(value) => {
                stream.advance();
                Ok(leaf(self.factory.literal(*value)))
            }
            TokenType::Word(word) => self.parse_word(stream, word, depth),
            TokenType::LeftParen => {
                stream.advance();
                let enclosed = self.parse_expr(stream, 0, depth)?;
                expect(stream, TokenType::RightParen)?;
                Ok(enclosed)
            }
            TokenType::Minus => {
                stream.advance();
                let operand = self.parse_expr(stream, NEGATION_POWER, depth)?;
                let expr = self.factory.unary(UnaryOperator::Neg, operand.expr);
                self.node(stream, expr, &[operand.height])
            }
            _ => Err(error(stream, ErrorKind::BadFactor, "Expected a factor")),
        }
    }

    /// A word at factor position: function call, conditional, pi, or variable.
    fn parse_word(
        &self,
        stream: &mut TokenStream<'_>,
        word: &str,
        depth: usize,
    ) -> Result<Subtree, SyntaxError> {
        if let Some(operator) = UnaryOperator::from_function_name(word) {
            stream.advance();
            let [operand] = self.parse_arguments::<1>(stream, depth)?;
            let expr = self.factory.unary(operator, operand.expr);
            return self.node(stream, expr, &[operand.height]);
        }

        if let Some(operator) = BinaryOperator::from_function_name(word) {
            stream.advance();
            let [left, right] = self.parse_arguments::<2>(stream, depth)?;
            let expr = self.factory.binary(operator, left.expr, right.expr);
            return self.node(stream, expr, &[left.height, right.height]);
        }

        if word == "if" {
            stream.advance();
            let [test, consequent, alternative] = self.parse_arguments::<3>(stream, depth)?;
            let heights = [test.height, consequent.height, alternative.height];
            let expr = self
                .factory
                .if_then_else(test.expr, consequent.expr, alternative.expr);
            return self.node(stream, expr, &heights);
        }

        if word == PI_NAME {
            stream.advance();
            return Ok(leaf(self.factory.literal(PI)));
        }

        let variable = match self.allowed {
            None if self.register => self.registry.lookup_or_create(word),
            None => self
                .registry
                .get(word)
                .unwrap_or_else(|| Variable::new(word)),
            Some(allowed) => match self.registry.get(word) {
                Some(variable) if allowed.contains(&variable) => variable,
                _ => {
                    log::debug!("Rejecting variable '{}' outside the allow-list", word);
                    return Err(error(stream, ErrorKind::UnknownVariable, "Unknown variable")
                        .with_expected(word));
                }
            },
        };
        stream.advance();
        Ok(leaf(Expression::Variable(variable)))
    }

    /// `"(" expr ("," expr){N-1} ")"`
    fn parse_arguments<const N: usize>(
        &self,
        stream: &mut TokenStream<'_>,
        depth: usize,
    ) -> Result<[Subtree; N], SyntaxError> {
        expect(stream, TokenType::LeftParen)?;
        let mut arguments = Vec::with_capacity(N);
        for i in 0..N {
            if i > 0 {
                expect(stream, TokenType::Comma)?;
            }
            arguments.push(self.parse_expr(stream, 0, depth)?);
        }
        expect(stream, TokenType::RightParen)?;
        match arguments.try_into() {
            Ok(arguments) => Ok(arguments),
            // The loop pushes exactly N arguments
            Err(_) => unreachable!("argument count mismatch"),
        }
    }

    /// Measure a node the factory just built over operands of the given
    /// heights. Folded results are leaves; anything else sits one level
    /// above its tallest operand and must stay within `max_depth`.
    fn node(
        &self,
        stream: &TokenStream<'_>,
        expr: Expression,
        operands: &[usize],
    ) -> Result<Subtree, SyntaxError> {
        let height = match expr {
            Expression::Literal(_) | Expression::Variable(_) | Expression::Polynomial(_) => 0,
            _ => 1 + operands.iter().copied().max().unwrap_or(0),
        };
        if height > self.max_depth {
            return Err(too_deep(stream));
        }
        Ok(Subtree { expr, height })
    }
}

fn leaf(expr: Expression) -> Subtree {
    Subtree { expr, height: 0 }
}

fn too_deep(stream: &TokenStream<'_>) -> SyntaxError {
    error(stream, ErrorKind::NestingTooDeep, "Expression nested too deeply")
}

fn error(stream: &TokenStream<'_>, kind: ErrorKind, message: &str) -> SyntaxError {
    SyntaxError::new(kind, message, stream.position(), stream.location())
}

fn expect(stream: &mut TokenStream<'_>, expected: TokenType) -> Result<(), SyntaxError> {
    if stream.peek_type() == Some(&expected) {
        stream.advance();
        return Ok(());
    }
    let text = expected.text();
    Err(error(
        stream,
        ErrorKind::UnexpectedToken,
        &format!("'{text}' expected"),
    )
    .with_expected(text))
}
