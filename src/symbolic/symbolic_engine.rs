//! # Symbolic Engine Module
//!
//! Core expression tree of the calculator. Every other symbolic module extends
//! [`Expr`] with one capability:
//! - `parse_expr` turns typed text into an `Expr`
//! - `symbolic_engine_derivatives` differentiates
//! - `symbolic_simplify` simplifies
//! - `symbolic_lambdify` compiles into closures for plotting
//! - `symbolic_tex` renders TeX for the result list and the live preview
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: Uses `Box<Expr>` for nested expressions.
//! 2. **Operator Overloading**: `std::ops` traits give `x + y * z` syntax.
//! 3. **Unevaluated Derivative**: `Derivative(body, var, order)` keeps the
//!    `[d^n/dx^n]` operator notation as typed, so the preview can render it and
//!    the rest of the engine can evaluate it on demand.
//! 4. **Non-standard Function Names**: Uses mathematical notation (tg, ctg)
//!    for trigonometric functions.

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::f64;
use std::fmt;

/// Names the parser and the evaluator treat as mathematical constants.
pub const RESERVED_CONSTANTS: [&str; 2] = ["pi", "e"];

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y", "velocity")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Cotangent function: cot(x) - uses mathematical notation 'ctg'
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Arccotangent function: arccot(x) - uses mathematical notation 'arcctg'
    arcctg(Box<Expr>),
    /// Unevaluated derivative `d^order/d var^order` of the body
    Derivative(Box<Expr>, String, usize),
}

/// Display implementation for pretty printing symbolic expressions.
///
/// The output is fully parenthesised and can be fed back to the parser.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => {
                if *val < 0.0 {
                    write!(f, "({})", val)
                } else {
                    write!(f, "{}", val)
                }
            }
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
            Expr::Derivative(body, var, 1) => write!(f, "[d/d{}]({})", var, body),
            Expr::Derivative(body, var, order) => {
                write!(f, "[d^{}/d{}^{}]({})", order, var, order, body)
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Returns the single argument of a one-argument function node.
    pub fn function_argument(&self) -> Option<&Expr> {
        match self {
            Expr::Exp(arg)
            | Expr::Ln(arg)
            | Expr::sin(arg)
            | Expr::cos(arg)
            | Expr::tg(arg)
            | Expr::ctg(arg)
            | Expr::arcsin(arg)
            | Expr::arccos(arg)
            | Expr::arctg(arg)
            | Expr::arcctg(arg) => Some(arg),
            _ => None,
        }
    }

    /// Rebuilds a one-argument function node of the same kind around a new argument.
    /// Returns `self` unchanged for any other node.
    pub fn with_function_argument(&self, arg: Expr) -> Expr {
        let arg = Box::new(arg);
        match self {
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Ln(_) => Expr::Ln(arg),
            Expr::sin(_) => Expr::sin(arg),
            Expr::cos(_) => Expr::cos(arg),
            Expr::tg(_) => Expr::tg(arg),
            Expr::ctg(_) => Expr::ctg(arg),
            Expr::arcsin(_) => Expr::arcsin(arg),
            Expr::arccos(_) => Expr::arccos(arg),
            Expr::arctg(_) => Expr::arctg(arg),
            Expr::arcctg(_) => Expr::arcctg(arg),
            _ => self.clone(),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Derivative(body, _, _) => body.contains_variable(var_name),
            other => other
                .function_argument()
                .is_some_and(|arg| arg.contains_variable(var_name)),
        }
    }

    /// Names of all variables in the expression, sorted and without duplicates.
    /// Reserved constants (`pi`, `e`) are not variables and are skipped.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names.into_iter().collect()
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                if !is_reserved_constant(name) {
                    names.insert(name.clone());
                }
            }
            Expr::Const(_) => {}
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::Derivative(body, _, _) => body.collect_variables(names),
            other => {
                if let Some(arg) = other.function_argument() {
                    arg.collect_variables(names);
                }
            }
        }
    }
}

/// true for `pi` and `e`
pub fn is_reserved_constant(name: &str) -> bool {
    RESERVED_CONSTANTS.contains(&name)
}

/// Numerical value of a reserved constant.
pub fn constant_value(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(f64::consts::PI),
        "e" => Some(f64::consts::E),
        _ => None,
    }
}

/// true if `name` is an identifier: a letter or `_` followed by letters, digits or `_`
pub fn is_valid_variable(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
