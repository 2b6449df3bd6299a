//! # Symbolic Expression Simplification Module
//!
//! Algebraic simplification of [`Expr`], used on every derivative before it is
//! shown and by the "simplify" operation of the calculator.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: arithmetic on numerical constants is evaluated
//! 2. **Algebraic Identities**: `x + 0 = x`, `x * 1 = x`, `x^0 = 1`, `ln(e) = 1` ...
//! 3. **Term Collection**: a sum is flattened into terms and like terms are added,
//!    `3x + 2x = 5x`, `sin(x) - sin(x) = 0`
//! 4. **Factor Collection**: a product or quotient is flattened into factors and
//!    like factors are merged, `x * x^2 = x^3`, `x^2 / x = x`
//! 5. **Fixpoint**: the passes are repeated until the tree stops changing
//!
//! Any subexpression that is not a constant, a variable or an integer power
//! (`sin(x)`, `(x + 1)`, `x^0.5`) is an opaque *atom*: it is compared with other
//! atoms through its printed form, so `sin(x) + 2sin(x)` collects to `3sin(x)`.
//!
//! Collected sums are written highest degree first with the constant term last,
//! which makes the output deterministic: `1 + x^2 + x` always becomes `x^2 + x + 1`.

use crate::symbolic::symbolic_engine::Expr;
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

/// Upper bound on the number of full simplification passes.
const MAX_SIMPLIFY_PASSES: usize = 16;

/// A collected coefficient this small relative to the terms that produced it
/// is cancellation noise and is dropped.
const CANCELLATION: f64 = 1e-14;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Simplifies the expression until it stops changing.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("x + x").unwrap();
    /// assert_eq!(expr.simplify(), Expr::Const(2.0) * Expr::Var("x".to_string()));
    /// ```
    pub fn simplify(&self) -> Expr {
        let mut current = self.simplify_();
        for _ in 1..MAX_SIMPLIFY_PASSES {
            let next = current.simplify_();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// One bottom-up simplification pass.
    ///
    /// Children are simplified first, then the rules for the node itself are applied.
    /// `Derivative` nodes are evaluated here.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b), // (a) + (b) = (a + b)
                    _ => collect_sum(&Expr::Add(Box::new(lhs), Box::new(rhs))),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b), // (a) - (b) = (a - b)
                    _ if lhs == rhs => Expr::Const(0.0),                     // x - x = 0
                    _ => collect_sum(&Expr::Sub(Box::new(lhs), Box::new(rhs))),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b), // (a) * (b) = (a * b)
                    (Expr::Const(0.0), _) | (_, Expr::Const(0.0)) => Expr::Const(0.0), // 0 * x = 0
                    (Expr::Const(1.0), _) => rhs,                           // 1 * x = x
                    (_, Expr::Const(1.0)) => lhs,                           // x * 1 = x
                    _ => collect_product(&Expr::Mul(Box::new(lhs), Box::new(rhs))),
                }
            }
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b), // (a) / (b) = (a / b)
                    (Expr::Const(0.0), _) => Expr::Const(0.0), // 0 / x = 0
                    (_, Expr::Const(1.0)) => lhs,              // x / 1 = x
                    (_, Expr::Const(0.0)) => Expr::Div(Box::new(lhs), Box::new(rhs)),
                    _ => collect_product(&Expr::Div(Box::new(lhs), Box::new(rhs))),
                }
            }
            Expr::Pow(base, exp) => simplify_power(base.simplify_(), exp.simplify_()),
            Expr::Derivative(body, var, order) => body.n_th_derivative1D(var, *order),
            Expr::Exp(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(0.0) => Expr::Const(1.0), // exp(0) = 1
                    Expr::Ln(inner) => *inner.clone(),    // exp(ln(x)) = x
                    _ => Expr::Exp(Box::new(expr)),
                }
            }
            Expr::Ln(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(1.0) => Expr::Const(0.0),               // ln(1) = 0
                    Expr::Var(name) if name == "e" => Expr::Const(1.0), // ln(e) = 1
                    Expr::Exp(inner) => *inner.clone(),                 // ln(exp(x)) = x
                    _ => Expr::Ln(Box::new(expr)),
                }
            }
            Expr::sin(expr) => match expr.simplify_() {
                Expr::Const(0.0) => Expr::Const(0.0),
                expr => Expr::sin(Box::new(expr)),
            },
            Expr::cos(expr) => match expr.simplify_() {
                Expr::Const(0.0) => Expr::Const(1.0),
                expr => Expr::cos(Box::new(expr)),
            },
            Expr::tg(expr) => match expr.simplify_() {
                Expr::Const(0.0) => Expr::Const(0.0),
                expr => Expr::tg(Box::new(expr)),
            },
            Expr::ctg(expr) => Expr::ctg(Box::new(expr.simplify_())),
            Expr::arcsin(expr) => match expr.simplify_() {
                Expr::Const(0.0) => Expr::Const(0.0),
                expr => Expr::arcsin(Box::new(expr)),
            },
            Expr::arccos(expr) => match expr.simplify_() {
                Expr::Const(1.0) => Expr::Const(0.0),
                expr => Expr::arccos(Box::new(expr)),
            },
            Expr::arctg(expr) => match expr.simplify_() {
                Expr::Const(0.0) => Expr::Const(0.0),
                expr => Expr::arctg(Box::new(expr)),
            },
            Expr::arcctg(expr) => Expr::arcctg(Box::new(expr.simplify_())),
        }
    }

    /// true if some constant in the tree is infinite or NaN
    pub fn has_non_finite_constant(&self) -> bool {
        match self {
            Expr::Const(c) => !c.is_finite(),
            Expr::Var(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.has_non_finite_constant() || rhs.has_non_finite_constant(),
            Expr::Derivative(body, _, _) => body.has_non_finite_constant(),
            other => other
                .function_argument()
                .is_some_and(|arg| arg.has_non_finite_constant()),
        }
    }
}

fn simplify_power(base: Expr, exp: Expr) -> Expr {
    match (&base, &exp) {
        (Expr::Const(a), Expr::Const(b)) if a.powf(*b).is_finite() => Expr::Const(a.powf(*b)),
        (_, Expr::Const(0.0)) => Expr::Const(1.0), // x ^ 0 = 1
        (_, Expr::Const(1.0)) => base,             // x ^ 1 = x
        (Expr::Const(1.0), _) => Expr::Const(1.0), // 1 ^ x = 1
        _ if integer_power(&exp).is_some() => {
            collect_product(&Expr::Pow(Box::new(base), Box::new(exp)))
        }
        // (x^a)^b = x^(a*b) needs x >= 0 on both sides, so a must not be an integer
        (Expr::Pow(inner_base, inner_exp), Expr::Const(_))
            if matches!(inner_exp.as_ref(), Expr::Const(a) if a.fract() != 0.0) =>
        {
            Expr::Pow(
                inner_base.clone(),
                Box::new(Expr::Mul(inner_exp.clone(), Box::new(exp)).simplify_()),
            )
        }
        _ => Expr::Pow(Box::new(base), Box::new(exp)),
    }
}

fn integer_exponent(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n.abs() < 1e6 {
        Some(n as i64)
    } else {
        None
    }
}

fn integer_power(exp: &Expr) -> Option<i64> {
    match exp {
        Expr::Const(n) => integer_exponent(*n),
        _ => None,
    }
}

/// true if `total` is what is left after terms of size `scale` cancelled out
fn cancelled(total: f64, scale: f64) -> bool {
    total == 0.0 || total.abs() <= CANCELLATION * scale
}

/// A factor that term collection does not look into.
///
/// Atoms are compared by rank and printed form; plain variables rank first so
/// that they lead a product (`2x sin(x)` rather than `2 sin(x) x`).
#[derive(Clone, Debug)]
struct Atom {
    rank: u8,
    name: String,
    expr: Expr,
}

impl Atom {
    fn of(expr: Expr) -> Self {
        let rank = if matches!(expr, Expr::Var(_)) { 0 } else { 1 };
        Atom {
            rank,
            name: expr.to_string(),
            expr,
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.name == other.name
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.rank, &self.name).cmp(&(other.rank, &other.name))
    }
}

/// Represents the non-numeric part of a term: atoms with their integer exponents.
///
/// `3x^2 sin(x)` has key `{x: 2, sin(x): 1}` and coefficient `3`;
/// a constant has the empty key.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
struct MonomialKey(BTreeMap<Atom, i64>);

impl MonomialKey {
    fn absorb(&mut self, other: MonomialKey, power: i64) {
        for (atom, exp) in other.0 {
            *self.0.entry(atom).or_insert(0) += exp * power;
        }
    }

    fn push_atom(&mut self, expr: Expr, exp: i64) {
        *self.0.entry(Atom::of(expr)).or_insert(0) += exp;
    }

    fn degree(&self) -> i64 {
        self.0.values().filter(|exp| **exp > 0).sum()
    }
}

/// Flatten nested Add/Sub expressions into a list of terms.
///
/// Subtraction becomes addition of the negated term and a constant factor is
/// distributed over a sum: `a - 2(b + c)` gives `[a, -2*b, -2*c]`.
fn flatten_add(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_add(a, out);
            flatten_add(b, out);
        }
        Expr::Sub(a, b) => {
            flatten_add(a, out);
            flatten_add(&Expr::Mul(Box::new(Expr::Const(-1.0)), b.clone()), out);
        }
        Expr::Mul(lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
            (Expr::Const(c), sum @ (Expr::Add(..) | Expr::Sub(..)))
            | (sum @ (Expr::Add(..) | Expr::Sub(..)), Expr::Const(c)) => {
                let mut inner = Vec::new();
                flatten_add(sum, &mut inner);
                for term in inner {
                    out.push(Expr::Mul(Box::new(Expr::Const(*c)), Box::new(term)));
                }
            }
            _ => out.push(expr.clone()),
        },
        _ => out.push(expr.clone()),
    }
}

/// Flatten nested multiplication expressions into a list of factors.
fn flatten_mul(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_mul(a, out);
            flatten_mul(b, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// Splits a term into its monomial key and numerical coefficient.
fn extract_monomial(expr: &Expr) -> (MonomialKey, f64) {
    let mut factors = Vec::new();
    flatten_mul(expr, &mut factors);
    let mut coeff = 1.0;
    let mut key = MonomialKey::default();
    for factor in factors {
        match factor {
            Expr::Const(c) => coeff *= c,
            Expr::Pow(base, exp) => match integer_power(&exp) {
                Some(n) => {
                    let (inner_key, inner_coeff) = extract_monomial(&base);
                    if inner_coeff == 0.0 && n < 0 {
                        key.push_atom(Expr::Pow(base, exp), 1);
                    } else {
                        coeff *= inner_coeff.powi(n as i32);
                        key.absorb(inner_key, n);
                    }
                }
                None => key.push_atom(Expr::Pow(base, exp), 1),
            },
            Expr::Div(num, den) => {
                let (num_key, num_coeff) = extract_monomial(&num);
                let (den_key, den_coeff) = extract_monomial(&den);
                if den_coeff == 0.0 {
                    key.push_atom(Expr::Div(num, den), 1);
                } else {
                    coeff *= num_coeff / den_coeff;
                    key.absorb(num_key, 1);
                    key.absorb(den_key, -1);
                }
            }
            other => key.push_atom(other, 1),
        }
    }
    key.0.retain(|_, exp| *exp != 0);
    (key, coeff)
}

/// Adds like terms of a sum and rebuilds it highest degree first.
fn collect_sum(expr: &Expr) -> Expr {
    let mut terms = Vec::new();
    flatten_add(expr, &mut terms);

    // key, summed coefficient, largest single coefficient
    let mut collected: Vec<(MonomialKey, f64, f64)> = Vec::new();
    for term in &terms {
        let (key, coeff) = extract_monomial(term);
        match collected.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, total, scale)) => {
                *total += coeff;
                *scale = scale.max(coeff.abs());
            }
            None => collected.push((key, coeff, coeff.abs())),
        }
    }
    collected.retain(|(_, total, scale)| !cancelled(*total, *scale));
    collected.sort_by_key(|(key, _, _)| Reverse(key.degree()));

    let mut result: Option<Expr> = None;
    for (key, coeff, _) in collected {
        result = Some(match result {
            None => build_term(key, coeff),
            Some(acc) if coeff < 0.0 => {
                Expr::Sub(Box::new(acc), Box::new(build_term(key, -coeff)))
            }
            Some(acc) => Expr::Add(Box::new(acc), Box::new(build_term(key, coeff))),
        });
    }
    result.unwrap_or(Expr::Const(0.0))
}

/// Merges like factors of a product or quotient.
fn collect_product(expr: &Expr) -> Expr {
    let (key, coeff) = extract_monomial(expr);
    if coeff == 0.0 {
        return Expr::Const(0.0);
    }
    build_term(key, coeff)
}

/// Build a term from monomial key and coefficient.
///
/// - `{}, 5` → `5`
/// - `{x: 1}, 3` → `3 * x`
/// - `{t: 1, x: 1}, 2` → `(2 * t) * x`
/// - `{x: 2}, 1` → `x^2`
/// - `{x: -1}, 2` → `2 / x`
fn build_term(key: MonomialKey, coeff: f64) -> Expr {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (atom, exp) in key.0 {
        let factor = if exp.abs() == 1 {
            atom.expr
        } else {
            Expr::Pow(Box::new(atom.expr), Box::new(Expr::Const(exp.abs() as f64)))
        };
        if exp > 0 {
            numerator.push(factor);
        } else {
            denominator.push(factor);
        }
    }
    let product = |factors: Vec<Expr>| {
        factors
            .into_iter()
            .reduce(|a, b| Expr::Mul(Box::new(a), Box::new(b)))
    };
    let numerator = if coeff == 1.0 && !numerator.is_empty() {
        product(numerator).unwrap_or(Expr::Const(1.0))
    } else {
        numerator
            .into_iter()
            .fold(Expr::Const(coeff), |acc, factor| Expr::Mul(Box::new(acc), Box::new(factor)))
    };
    match product(denominator) {
        None => numerator,
        Some(den) => Expr::Div(Box::new(numerator), Box::new(den)),
    }
}
