//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of [`Expr`].
//!
//! ## Key Methods
//! - `diff(var)` - one application of the differentiation rules, no simplification
//! - `try_diff(var)` - `diff` behind a check of the variable name
//! - `n_th_derivative1D(var, n)` - repeated differentiation with simplification between steps
//! - `expand_derivatives()` - evaluates every unevaluated `Derivative` node in the tree
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Differentiation Rules**: product rule, quotient rule and chain rule
//!    for all supported functions.
//! 2. **General Power Rule**: `f^g` is differentiated as a constant power, an
//!    exponential or the full `f^g * (g' ln f + g f'/f)` depending on which side
//!    depends on the variable.
//! 3. **Nested Operators**: a `Derivative` node met while differentiating is
//!    evaluated first, so `[d/dx]([d/dx] x^3)` equals the second derivative.

use crate::errors::DifferentiationError;
use crate::symbolic::symbolic_engine::{Expr, is_reserved_constant, is_valid_variable};

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements all standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// The result is not simplified.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x"); // 2*x^(2-1)*1
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) => diff_power(base, exp, var),
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::cos(expr.clone())),
                    Box::new(Expr::Const(2.0)),
                )),
            ),
            Expr::ctg(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Pow(
                    Box::new(Expr::sin(expr.clone())),
                    Box::new(Expr::Const(2.0)),
                )),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(one_minus_square(expr)),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Pow(
                    Box::new(one_minus_square(expr)),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arctg(expr) => Expr::Div(Box::new(expr.diff(var)), Box::new(one_plus_square(expr))),
            Expr::arcctg(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(one_plus_square(expr)),
            ),
            Expr::Derivative(body, dvar, order) => {
                body.n_th_derivative1D(dvar, *order).diff(var)
            }
        }
    } // end of diff

    /// Checks the variable name and differentiates once.
    pub fn try_diff(&self, var: &str) -> Result<Expr, DifferentiationError> {
        check_variable(var)?;
        Ok(self.diff(var))
    }

    /// Computes the nth derivative of a single-variable expression.
    ///
    /// Repeatedly applies differentiation and simplification.
    /// `n = 0` returns the simplified expression itself.
    pub fn n_th_derivative1D(&self, var_name: &str, n: usize) -> Expr {
        let mut expr = self.clone();
        for _ in 0..n {
            expr = expr.diff(var_name).simplify();
        }
        expr.simplify()
    }

    /// Replaces every `Derivative` node by the derivative it denotes.
    pub fn expand_derivatives(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.expand_derivatives()),
                Box::new(rhs.expand_derivatives()),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.expand_derivatives()),
                Box::new(rhs.expand_derivatives()),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.expand_derivatives()),
                Box::new(rhs.expand_derivatives()),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.expand_derivatives()),
                Box::new(rhs.expand_derivatives()),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.expand_derivatives()),
                Box::new(exp.expand_derivatives()),
            ),
            Expr::Derivative(body, var, order) => {
                let mut expr = body.expand_derivatives();
                for _ in 0..*order {
                    expr = expr.diff(var);
                }
                expr
            }
            other => match other.function_argument() {
                Some(arg) => other.with_function_argument(arg.expand_derivatives()),
                None => other.clone(),
            },
        }
    }

    /// true if the tree holds at least one unevaluated `Derivative`
    pub fn has_derivative_operator(&self) -> bool {
        match self {
            Expr::Var(_) | Expr::Const(_) => false,
            Expr::Derivative(..) => true,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.has_derivative_operator() || rhs.has_derivative_operator(),
            other => other
                .function_argument()
                .is_some_and(|arg| arg.has_derivative_operator()),
        }
    }
}

/// Rejects names that cannot be a variable of differentiation.
pub fn check_variable(var: &str) -> Result<(), DifferentiationError> {
    if is_reserved_constant(var) {
        return Err(DifferentiationError::ReservedSymbol(var.to_string()));
    }
    if !is_valid_variable(var) {
        return Err(DifferentiationError::InvalidVariable(var.to_string()));
    }
    Ok(())
}

fn diff_power(base: &Expr, exp: &Expr, var: &str) -> Expr {
    let base_depends = base.contains_variable(var) || base.has_derivative_operator();
    let exp_depends = exp.contains_variable(var) || exp.has_derivative_operator();
    let whole = Expr::Pow(Box::new(base.clone()), Box::new(exp.clone()));
    match (base_depends, exp_depends) {
        (_, false) => Expr::Mul(
            Box::new(Expr::Mul(
                Box::new(exp.clone()),
                Box::new(Expr::Pow(
                    Box::new(base.clone()),
                    Box::new(Expr::Sub(Box::new(exp.clone()), Box::new(Expr::Const(1.0)))),
                )),
            )),
            Box::new(base.diff(var)),
        ),
        // a^g = exp(g ln a)
        (false, true) => Expr::Mul(
            Box::new(Expr::Mul(Box::new(whole), Box::new(Expr::Ln(Box::new(base.clone()))))),
            Box::new(exp.diff(var)),
        ),
        (true, true) => Expr::Mul(
            Box::new(whole),
            Box::new(Expr::Add(
                Box::new(Expr::Mul(
                    Box::new(exp.diff(var)),
                    Box::new(Expr::Ln(Box::new(base.clone()))),
                )),
                Box::new(Expr::Div(
                    Box::new(Expr::Mul(Box::new(exp.clone()), Box::new(base.diff(var)))),
                    Box::new(base.clone()),
                )),
            )),
        ),
    }
}

fn one_minus_square(expr: &Expr) -> Expr {
    Expr::Sub(
        Box::new(Expr::Const(1.0)),
        Box::new(Expr::Pow(Box::new(expr.clone()), Box::new(Expr::Const(2.0)))),
    )
}

fn one_plus_square(expr: &Expr) -> Expr {
    Expr::Add(
        Box::new(Expr::Const(1.0)),
        Box::new(Expr::Pow(Box::new(expr.clone()), Box::new(Expr::Const(2.0)))),
    )
}
