//! Turns a typed string into a symbolic expression.
//!
//! Grammar, lowest precedence first:
//! ```text
//! sum      := product (('+' | '-') product)*
//! product  := unary (('*' | '/') unary | power)*        // second branch is implicit '*'
//! unary    := '-' unary | '+' unary | operator sum | power
//! operator := '[' 'd' ('^' n)? '/' 'd' var ('^' n)? ']'
//! power    := primary ('^' unary)?                       // right associative
//! primary  := number | '(' sum ')' | function '(' sum ')' | identifier
//! ```
//! The differentiation operator applies to everything after it in the enclosing
//! sum, so `[d/dx]x^2 + 1` is the derivative of `x^2 + 1`.
//!
//!# Example
//! ```
//! use RustedCalc::symbolic::symbolic_engine::Expr;
//! let parsed = Expr::parse_expression("2x^2 + sin(x)").unwrap();
//! assert_eq!(parsed.all_arguments_are_variables(), vec!["x".to_string()]);
//! ```
use crate::errors::ParseError;
use crate::symbolic::symbolic_engine::{Expr, is_reserved_constant, is_valid_variable};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{cut, map, opt, recognize},
    error::{ErrorKind, ParseError as NomParseError},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded},
};

#[derive(Debug, Clone, PartialEq)]
enum FailureKind {
    Syntax,
    UnclosedParenthesis,
    TooDeep,
    UnknownFunction(String),
    InvalidNumber(String),
    InvalidOrder(String),
    InvalidVariable(String),
    MalformedOperator(String),
}

/// Nesting levels (parentheses, signs, exponents, operators) accepted before
/// the input is rejected.
pub const MAX_NESTING: usize = 64;

/// nom error carrying the remaining input, from which the position is recovered
#[derive(Debug, Clone, PartialEq)]
struct Failure<'a> {
    input: &'a str,
    kind: FailureKind,
}

impl<'a> Failure<'a> {
    fn new(input: &'a str, kind: FailureKind) -> Self {
        Failure { input, kind }
    }

    fn into_parse_error(self, full: &str) -> ParseError {
        let byte_pos = full.len().saturating_sub(self.input.len());
        let position = full[..byte_pos].chars().count();
        match self.kind {
            FailureKind::Syntax => match self.input.chars().next() {
                None => ParseError::UnexpectedEnd,
                Some(found) => ParseError::UnexpectedChar { found, position },
            },
            FailureKind::UnclosedParenthesis => ParseError::UnclosedParenthesis { position },
            FailureKind::TooDeep => ParseError::TooDeeplyNested { max: MAX_NESTING },
            FailureKind::UnknownFunction(name) => ParseError::UnknownFunction(name),
            FailureKind::InvalidNumber(text) => ParseError::InvalidNumber(text),
            FailureKind::InvalidOrder(text) => ParseError::InvalidOrder(text),
            FailureKind::InvalidVariable(text) => ParseError::InvalidVariable(text),
            FailureKind::MalformedOperator(text) => ParseError::MalformedOperator(text),
        }
    }
}

impl<'a> NomParseError<&'a str> for Failure<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Failure::new(input, FailureKind::Syntax)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, O> = IResult<&'a str, O, Failure<'a>>;

/// A grammar rule that knows how deep it is nested.
type Rule<'a> = fn(&'a str, usize) -> PResult<'a, Expr>;

fn fail<'a, O>(input: &'a str, kind: FailureKind) -> PResult<'a, O> {
    Err(nom::Err::Failure(Failure::new(input, kind)))
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = Failure<'a>>
where
    F: Parser<&'a str, Output = O, Error = Failure<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Runs `rule` at the same level.
fn at<'a>(rule: Rule<'a>, depth: usize) -> impl FnMut(&'a str) -> PResult<'a, Expr> {
    move |input| rule(input, depth)
}

/// Runs `rule` one level deeper, failing past [`MAX_NESTING`].
fn deeper<'a>(rule: Rule<'a>, depth: usize) -> impl FnMut(&'a str) -> PResult<'a, Expr> {
    move |input| {
        if depth >= MAX_NESTING {
            return fail(input, FailureKind::TooDeep);
        }
        rule(input, depth + 1)
    }
}

/// Parses the whole input into an expression.
pub fn parse_expression_func(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    match sum(input, 0) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) if rest.starts_with(')') => Err(ParseError::UnmatchedParenthesis {
            position: input[..input.len() - rest.len()].chars().count(),
        }),
        Ok((rest, _)) => Err(Failure::new(rest, FailureKind::Syntax).into_parse_error(input)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into_parse_error(input)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedEnd),
    }
}

fn sum(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (input, first) = product(input, depth)?;
    fold_many0(
        pair(ws(one_of("+-")), cut(at(product, depth))),
        move || first.clone(),
        |acc, (op, rhs)| match op {
            '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
            _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
        },
    )
    .parse(input)
}

fn product(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (input, first) = unary(input, depth)?;
    fold_many0(
        alt((
            pair(ws(one_of("*/")), cut(at(unary, depth))),
            map(at(power, depth), |factor| ('*', factor)),
        )),
        move || first.clone(),
        |acc, (op, rhs)| match op {
            '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
            _ => Expr::Div(Box::new(acc), Box::new(rhs)),
        },
    )
    .parse(input)
}

fn unary(input: &str, depth: usize) -> PResult<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), cut(deeper(unary, depth))), |operand| match operand {
            Expr::Const(c) => Expr::Const(-c),
            other => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
        }),
        preceded(ws(char('+')), cut(deeper(unary, depth))),
        at(derivative_operator, depth),
        at(power, depth),
    ))
    .parse(input)
}

fn power(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (input, base) = primary(input, depth)?;
    let (input, exponent) = opt(preceded(ws(char('^')), cut(deeper(unary, depth)))).parse(input)?;
    let expr = match exponent {
        Some(exponent) => Expr::Pow(Box::new(base), Box::new(exponent)),
        None => base,
    };
    Ok((input, expr))
}

fn primary(input: &str, depth: usize) -> PResult<'_, Expr> {
    ws(alt((
        number,
        at(parenthesized, depth),
        at(function_or_variable, depth),
    )))
    .parse(input)
}

/// unsigned decimal number with optional fraction and exponent
fn number(input: &str) -> PResult<'_, Expr> {
    let (rest, whole) = digit0(input)?;
    let (rest, fraction) = opt(preceded(char('.'), digit0)).parse(rest)?;
    if whole.is_empty() && fraction.is_none_or(|digits| digits.is_empty()) {
        return Err(nom::Err::Error(Failure::new(input, FailureKind::Syntax)));
    }
    // `2e` is 2 times the constant e, so the exponent needs its digits
    let (rest, _) = opt((one_of("eE"), opt(one_of("+-")), digit1)).parse(rest)?;
    let text = &input[..input.len() - rest.len()];
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, Expr::Const(value))),
        Err(_) => fail(input, FailureKind::InvalidNumber(text.to_string())),
    }
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parenthesized(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (after_open, _) = char('(').parse(input)?;
    let (rest, inner) = cut(deeper(sum, depth)).parse(after_open)?;
    match char::<&str, Failure>(')').parse(rest) {
        Ok((rest, _)) => Ok((rest, inner)),
        Err(_) => fail(input, FailureKind::UnclosedParenthesis),
    }
}

fn function_or_variable(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (rest, name) = identifier(input)?;
    let (after_ws, _) = multispace0(rest)?;
    let called = after_ws.starts_with('(');
    match (function_builder(name), called) {
        (Some(build), true) => {
            let (rest, argument) = parenthesized(after_ws, depth)?;
            Ok((rest, build(argument)))
        }
        // a function name must be followed by its argument
        (Some(_), false) => fail(after_ws, FailureKind::Syntax),
        (None, true) => fail(input, FailureKind::UnknownFunction(name.to_string())),
        (None, false) => Ok((rest, Expr::Var(name.to_string()))),
    }
}

type FunctionBuilder = fn(Expr) -> Expr;

fn function_builder(name: &str) -> Option<FunctionBuilder> {
    let builder: FunctionBuilder = match name {
        "exp" => |a| Expr::Exp(Box::new(a)),
        "ln" | "log" => |a| Expr::Ln(Box::new(a)),
        "log10" => |a| Expr::Div(Box::new(Expr::Ln(Box::new(a))), Box::new(Expr::Ln(Box::new(Expr::Const(10.0))))),
        "sqrt" => |a| Expr::Pow(Box::new(a), Box::new(Expr::Const(0.5))),
        "sin" => |a| Expr::sin(Box::new(a)),
        "cos" => |a| Expr::cos(Box::new(a)),
        "tan" | "tg" => |a| Expr::tg(Box::new(a)),
        "cot" | "ctg" => |a| Expr::ctg(Box::new(a)),
        "asin" | "arcsin" => |a| Expr::arcsin(Box::new(a)),
        "acos" | "arccos" => |a| Expr::arccos(Box::new(a)),
        "atan" | "arctan" | "arctg" => |a| Expr::arctg(Box::new(a)),
        "acot" | "arccot" | "arcctg" => |a| Expr::arcctg(Box::new(a)),
        _ => return None,
    };
    Some(builder)
}

/// `[d/dx] body` or `[d^n/dx^n] body`
fn derivative_operator(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (after_ws, _) = multispace0(input)?;
    let (inside, _) = char('[').parse(after_ws)?;
    let (after_inner, inner) = take_while(|c| c != ']').parse(inside)?;
    let Some(after_close) = after_inner.strip_prefix(']') else {
        return fail(after_ws, FailureKind::MalformedOperator(after_ws.trim_end().to_string()));
    };
    let (var, order) = match operator_parts(inner) {
        Ok(parsed) => parsed,
        Err(kind) => return fail(after_ws, kind),
    };
    let (rest, body) = cut(deeper(sum, depth)).parse(after_close)?;
    Ok((rest, Expr::Derivative(Box::new(body), var, order)))
}

/// Reads `d^n/dv^n` (or `d/dv`) into the variable name and the order.
fn operator_parts(inner: &str) -> Result<(String, usize), FailureKind> {
    let malformed = || FailureKind::MalformedOperator(format!("[{}]", inner));
    let (numerator, denominator) = inner.split_once('/').ok_or_else(malformed)?;

    let numerator = numerator.trim();
    let top_order = match numerator.strip_prefix('d') {
        Some("") => None,
        Some(rest) => match rest.trim_start().strip_prefix('^') {
            Some(order) => Some(order.trim()),
            None => return Err(malformed()),
        },
        None => return Err(malformed()),
    };

    let denominator = denominator.trim();
    let Some(denominator) = denominator.strip_prefix('d') else {
        return Err(malformed());
    };
    let (var, bottom_order) = match denominator.split_once('^') {
        Some((var, order)) => (var.trim(), Some(order.trim())),
        None => (denominator.trim(), None),
    };
    if !is_valid_variable(var) || is_reserved_constant(var) {
        return Err(FailureKind::InvalidVariable(var.to_string()));
    }

    let order_text = match (top_order, bottom_order) {
        (None, None) => return Ok((var.to_string(), 1)),
        (Some(top), Some(bottom)) if top == bottom => top,
        (Some(top), None) | (None, Some(top)) => return Err(FailureKind::InvalidOrder(top.to_string())),
        _ => return Err(malformed()),
    };
    match order_text.parse::<usize>() {
        Ok(order) if order >= 1 => Ok((var.to_string(), order)),
        _ => Err(FailureKind::InvalidOrder(order_text.to_string())),
    }
}

impl Expr {
    /// EXPRESSION PARSING FROM STRINGS

    /// Parses a mathematical expression from string representation.
    ///
    /// # Supported Syntax
    /// - Variables: x, y, var_name; constants pi and e
    /// - Numbers: 3.14, 2, 1e-6
    /// - Operators: +, -, *, /, ^ and implicit multiplication (2x, 3(x+1))
    /// - Functions: sin, cos, tan/tg, cot/ctg, asin, acos, atan, acot, exp, ln/log, log10, sqrt
    /// - Differentiation operator: [d/dx] f, [d^2/dx^2] f
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        let parsed = parse_expression_func(input);
        match &parsed {
            Ok(expr) => log::debug!("parsed '{}' into {}", input, expr),
            Err(err) => log::debug!("failed to parse '{}': {}", input, err),
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Box<Expr> {
        Box::new(Expr::Var("x".to_string()))
    }

    #[test]
    fn test_parse_exponential() {
        let expr = parse_expression_func("exp(x)").unwrap();
        assert_eq!(expr, Expr::Exp(x()));
    }

    #[test]
    fn test_parse_constant() {
        assert_eq!(parse_expression_func("42").unwrap(), Expr::Const(42.0));
        assert_eq!(parse_expression_func("1e-3").unwrap(), Expr::Const(0.001));
        assert_eq!(parse_expression_func(".5").unwrap(), Expr::Const(0.5));
        assert_eq!(parse_expression_func("2.5").unwrap(), Expr::Const(2.5));
        assert_eq!(parse_expression_func("2.").unwrap(), Expr::Const(2.0));
        assert_eq!(parse_expression_func("1.5e2").unwrap(), Expr::Const(150.0));
    }

    #[test]
    fn test_fraction_at_end_of_input_is_kept() {
        assert_eq!(
            parse_expression_func("x^0.5").unwrap(),
            Expr::Pow(x(), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(
            parse_expression_func("x + 0.5").unwrap(),
            Expr::Add(x(), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(
            parse_expression_func("2.5x").unwrap(),
            Expr::Const(2.5) * Expr::Var("x".to_string())
        );
    }

    #[test]
    fn test_trailing_e_is_the_constant() {
        assert_eq!(
            parse_expression_func("2e").unwrap(),
            Expr::Const(2.0) * Expr::Var("e".to_string())
        );
        assert!(parse_expression_func(".").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}x{}", "(".repeat(n), ")".repeat(n));
        assert!(parse_expression_func(&nested(MAX_NESTING - 1)).is_ok());
        let too_deep = ParseError::TooDeeplyNested { max: MAX_NESTING };
        assert_eq!(parse_expression_func(&nested(300)).unwrap_err(), too_deep);
        assert_eq!(parse_expression_func(&nested(5000)).unwrap_err(), too_deep);
        let signs = format!("{}x", "-".repeat(300));
        assert_eq!(parse_expression_func(&signs).unwrap_err(), too_deep);
        let tower = format!("x{}", "^x".repeat(300));
        assert_eq!(parse_expression_func(&tower).unwrap_err(), too_deep);
        let operators = format!("{}x", "[d/dx]".repeat(300));
        assert_eq!(parse_expression_func(&operators).unwrap_err(), too_deep);
    }

    #[test]
    fn test_parse_negative_constant() {
        assert_eq!(parse_expression_func("-3").unwrap(), Expr::Const(-3.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_expression_func("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_subtraction_is_left_associative() {
        let expr = parse_expression_func("x^2 - x - 1").unwrap();
        let expected = Expr::Pow(x(), Box::new(Expr::Const(2.0))) - *x() - Expr::Const(1.0);
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse_expression_func("1 + 2 * x ^ 2").unwrap();
        let expected = Expr::Const(1.0)
            + Expr::Const(2.0) * Expr::Pow(x(), Box::new(Expr::Const(2.0)));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_power_is_right_associative() {
        let expr = parse_expression_func("2^3^x").unwrap();
        let expected = Expr::Pow(
            Box::new(Expr::Const(2.0)),
            Box::new(Expr::Pow(Box::new(Expr::Const(3.0)), x())),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_unary_minus_binds_weaker_than_power() {
        let expr = parse_expression_func("-x^2").unwrap();
        let expected = -Expr::Pow(x(), Box::new(Expr::Const(2.0)));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_implicit_multiplication() {
        let expr = parse_expression_func("2x").unwrap();
        assert_eq!(expr, Expr::Const(2.0) * Expr::Var("x".to_string()));
        let expr = parse_expression_func("(x+1)(x-1)").unwrap();
        let expected = (*x() + Expr::Const(1.0)) * (*x() - Expr::Const(1.0));
        assert_eq!(expr, expected);
        let expr = parse_expression_func("3sin(x)").unwrap();
        assert_eq!(expr, Expr::Const(3.0) * Expr::sin(x()));
    }

    #[test]
    fn test_implicit_multiplication_does_not_swallow_subtraction() {
        let expr = parse_expression_func("2 -1").unwrap();
        assert_eq!(expr, Expr::Const(2.0) - Expr::Const(1.0));
    }

    #[test]
    fn test_parse_with_brackets() {
        let expr = parse_expression_func("(x + y) * z").unwrap();
        let expected = (Expr::Var("x".to_string()) + Expr::Var("y".to_string()))
            * Expr::Var("z".to_string());
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_functions_and_aliases() {
        assert_eq!(parse_expression_func("tan(x)").unwrap(), Expr::tg(x()));
        assert_eq!(parse_expression_func("tg(x)").unwrap(), Expr::tg(x()));
        assert_eq!(parse_expression_func("log(x)").unwrap(), Expr::Ln(x()));
        assert_eq!(parse_expression_func("atan(x)").unwrap(), Expr::arctg(x()));
        assert_eq!(
            parse_expression_func("sqrt(x)").unwrap(),
            Expr::Pow(x(), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(
            parse_expression_func("sin(cos(x))").unwrap(),
            Expr::sin(Box::new(Expr::cos(x())))
        );
    }

    #[test]
    fn test_unclosed_parenthesis() {
        let err = parse_expression_func("sin(x").unwrap_err();
        assert_eq!(err, ParseError::UnclosedParenthesis { position: 3 });
        let err = parse_expression_func("(x + y").unwrap_err();
        assert_eq!(err, ParseError::UnclosedParenthesis { position: 0 });
    }

    #[test]
    fn test_unmatched_parenthesis() {
        let err = parse_expression_func("x + 1)").unwrap_err();
        assert_eq!(err, ParseError::UnmatchedParenthesis { position: 5 });
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(parse_expression_func("x +").unwrap_err(), ParseError::UnexpectedEnd);
        assert!(parse_expression_func("x * * 2").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_expression_func("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_unknown_function() {
        let err = parse_expression_func("foo(x)").unwrap_err();
        assert_eq!(err, ParseError::UnknownFunction("foo".to_string()));
    }

    #[test]
    fn test_function_without_argument() {
        assert!(parse_expression_func("sin").is_err());
        assert!(parse_expression_func("sin x").is_err());
    }

    #[test]
    fn test_parse_first_order_operator() {
        let expr = parse_expression_func("[d/dx]x^2 + 1").unwrap();
        let body = Expr::Pow(x(), Box::new(Expr::Const(2.0))) + Expr::Const(1.0);
        assert_eq!(expr, Expr::Derivative(Box::new(body), "x".to_string(), 1));
    }

    #[test]
    fn test_parse_higher_order_operator() {
        let expr = parse_expression_func("[d^3/dt^3] sin(t)").unwrap();
        let body = Expr::sin(Box::new(Expr::Var("t".to_string())));
        assert_eq!(expr, Expr::Derivative(Box::new(body), "t".to_string(), 3));
    }

    #[test]
    fn test_operator_rejects_bad_order() {
        let err = parse_expression_func("[d^0/dx^0]x").unwrap_err();
        assert_eq!(err, ParseError::InvalidOrder("0".to_string()));
        let err = parse_expression_func("[d^abc/dx^abc]x").unwrap_err();
        assert_eq!(err, ParseError::InvalidOrder("abc".to_string()));
        let err = parse_expression_func("[d^/dx^]x").unwrap_err();
        assert_eq!(err, ParseError::InvalidOrder("".to_string()));
    }

    #[test]
    fn test_operator_rejects_bad_variable() {
        let err = parse_expression_func("[d/d1x]x").unwrap_err();
        assert_eq!(err, ParseError::InvalidVariable("1x".to_string()));
        let err = parse_expression_func("[d/dpi]x").unwrap_err();
        assert_eq!(err, ParseError::InvalidVariable("pi".to_string()));
        let err = parse_expression_func("[d/d]x").unwrap_err();
        assert_eq!(err, ParseError::InvalidVariable("".to_string()));
    }

    #[test]
    fn test_operator_without_body() {
        assert_eq!(parse_expression_func("[d/dx]").unwrap_err(), ParseError::UnexpectedEnd);
    }

    #[test]
    fn test_unclosed_operator() {
        let err = parse_expression_func("[d/dx x").unwrap_err();
        assert!(matches!(err, ParseError::MalformedOperator(_)));
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let expr = parse_expression_func("x^2 * sin(x) - 3/(x + 1)").unwrap();
        let reparsed = parse_expression_func(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed);
    }
}
