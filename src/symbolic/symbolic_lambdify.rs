//! LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
//!
//! [`Expr::compile`] turns an expression into a [`Compiled`] closure tree. The
//! closures index into a slice of argument values ordered like the sorted list of
//! free variables, so evaluating a point costs no name lookups.
//!
//! Evaluation is fallible: a variable missing from the scope is reported when the
//! function is called, not when it is compiled, and a result that is not a finite
//! real number is an [`EvalError::NonFinite`].
use crate::errors::EvalError;
use crate::symbolic::symbolic_engine::{Expr, constant_value};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Closure over an argument slice, the building block of [`Compiled`].
pub type ArgsFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A compiled expression bound to one variable, ready for plotting.
pub type UnaryFn = Box<dyn Fn(f64) -> Result<f64, EvalError> + Send + Sync>;

impl Expr {
    /// Builds a closure taking the values of `vars` in the same order.
    ///
    /// Reserved constants (`pi`, `e`) not listed in `vars` evaluate to their value.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x * y").unwrap();
    /// let func = f.lambdify1(&["x", "y"]);
    /// assert_eq!(func(&[2.0, 3.0]), 6.0);
    /// ```
    pub fn lambdify1(&self, vars: &[&str]) -> ArgsFn {
        match self {
            Expr::Var(name) => match (vars.iter().position(|&x| x == name), constant_value(name)) {
                (Some(index), _) => Box::new(move |args| args[index]),
                (None, Some(val)) => Box::new(move |_| val),
                (None, None) => Box::new(|_| f64::NAN),
            },
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.lambdify1(vars);
                let rf = rhs.lambdify1(vars);
                Box::new(move |args| lf(args) + rf(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.lambdify1(vars);
                let rf = rhs.lambdify1(vars);
                Box::new(move |args| lf(args) - rf(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.lambdify1(vars);
                let rf = rhs.lambdify1(vars);
                Box::new(move |args| lf(args) * rf(args))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.lambdify1(vars);
                let rf = rhs.lambdify1(vars);
                Box::new(move |args| lf(args) / rf(args))
            }
            Expr::Pow(b, e) => {
                let bf = b.lambdify1(vars);
                let ef = e.lambdify1(vars);
                Box::new(move |args| bf(args).powf(ef(args)))
            }
            Expr::Exp(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).exp())
            }
            Expr::Ln(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).ln())
            }
            Expr::sin(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).sin())
            }
            Expr::cos(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).cos())
            }
            Expr::tg(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).tan())
            }
            Expr::ctg(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| 1.0 / f(args).tan())
            }
            Expr::arcsin(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).asin())
            }
            Expr::arccos(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).acos())
            }
            Expr::arctg(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| f(args).atan())
            }
            Expr::arcctg(e) => {
                let f = e.lambdify1(vars);
                Box::new(move |args| (PI / 2.0) - f(args).atan())
            }
            Expr::Derivative(..) => self.expand_derivatives().lambdify1(vars),
        }
    } // end of lambdify

    /// Compiles the expression over all of its free variables.
    pub fn compile(&self) -> Compiled {
        let expr = self.expand_derivatives();
        let vars = expr.all_arguments_are_variables();
        let names: Vec<&str> = vars.iter().map(|x| x.as_str()).collect();
        let func: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync> = Arc::from(expr.lambdify1(&names));
        Compiled { expr, vars, func }
    }
}

/// An expression compiled to closures, together with the variables it needs.
#[derive(Clone)]
pub struct Compiled {
    expr: Expr,
    vars: Vec<String>,
    func: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
}

impl fmt::Debug for Compiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("expr", &self.expr.to_string())
            .field("vars", &self.vars)
            .finish()
    }
}

impl Compiled {
    /// Free variables, sorted.
    pub fn variables(&self) -> &[String] {
        &self.vars
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates with variable values taken from `scope`.
    pub fn evaluate(&self, scope: &HashMap<String, f64>) -> Result<f64, EvalError> {
        let args = self
            .vars
            .iter()
            .map(|name| {
                scope
                    .get(name)
                    .copied()
                    .ok_or_else(|| EvalError::UnboundVariable(name.clone()))
            })
            .collect::<Result<Vec<f64>, EvalError>>()?;
        finite((self.func)(&args))
    }

    /// Fixes `var` as the only argument.
    ///
    /// Any other free variable makes every call fail with
    /// [`EvalError::UnboundVariable`]; an expression without variables gives a
    /// constant function.
    pub fn bind(&self, var: &str) -> UnaryFn {
        if let Some(unbound) = self.vars.iter().find(|name| name.as_str() != var) {
            let unbound = unbound.clone();
            return Box::new(move |_| Err(EvalError::UnboundVariable(unbound.clone())));
        }
        let func = Arc::clone(&self.func);
        if self.vars.is_empty() {
            Box::new(move |_| finite(func(&[])))
        } else {
            Box::new(move |x| finite(func(&[x])))
        }
    }
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite { value })
    }
}
