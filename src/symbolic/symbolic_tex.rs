//! TeX rendering of expressions for the result list and the live preview.
//!
//! - `2 * x` → `2x`, `x * y` → `x \cdot y`
//! - `x / (x + 1)` → `\frac{x}{x + 1}`
//! - `(x + 1)^2` → `\left(x + 1\right)^{2}`
//! - `sin(x)` → `\sin\left(x\right)`
//! - `[d^2/dx^2] f` → `\frac{d^{2}}{dx^{2}}\left[f\right]`
//!
//! Parentheses are emitted only where precedence requires them.
use crate::symbolic::symbolic_engine::Expr;

/// Binding strength of the outermost operator of a rendered piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Sum,
    Product,
    Power,
    Atom,
}

/// Greek letter names that have a TeX command of the same name.
const GREEK_LETTERS: [&str; 17] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "kappa", "lambda",
    "mu", "nu", "xi", "rho", "sigma", "tau", "omega",
];

impl Expr {
    /// Renders the expression as a TeX math string (without `$$` delimiters).
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("2x^2 + sin(x)").unwrap();
    /// assert_eq!(expr.to_tex(), r"2x^{2} + \sin\left(x\right)");
    /// ```
    pub fn to_tex(&self) -> String {
        render(self).0
    }
}

fn render(expr: &Expr) -> (String, Prec) {
    match expr {
        Expr::Const(c) => {
            let text = format_number(*c);
            let prec = if *c < 0.0 { Prec::Sum } else { Prec::Atom };
            (text, prec)
        }
        Expr::Var(name) => (format_variable(name), Prec::Atom),
        Expr::Add(lhs, rhs) => {
            let left = wrap(lhs, Prec::Sum);
            match negated(rhs) {
                Some(positive) => (format!("{} - {}", left, wrap(&positive, Prec::Product)), Prec::Sum),
                None => (format!("{} + {}", left, wrap(rhs, Prec::Sum)), Prec::Sum),
            }
        }
        Expr::Sub(lhs, rhs) => (
            format!("{} - {}", wrap(lhs, Prec::Sum), wrap(rhs, Prec::Product)),
            Prec::Sum,
        ),
        Expr::Mul(lhs, rhs) => render_product(lhs, rhs),
        Expr::Div(lhs, rhs) => (
            format!(r"\frac{{{}}}{{{}}}", lhs.to_tex(), rhs.to_tex()),
            Prec::Atom,
        ),
        Expr::Pow(base, exp) => render_power(base, exp),
        Expr::Exp(arg) => (format!("e^{{{}}}", arg.to_tex()), Prec::Power),
        Expr::Ln(arg) => function(r"\ln", arg),
        Expr::sin(arg) => function(r"\sin", arg),
        Expr::cos(arg) => function(r"\cos", arg),
        Expr::tg(arg) => function(r"\tan", arg),
        Expr::ctg(arg) => function(r"\cot", arg),
        Expr::arcsin(arg) => function(r"\arcsin", arg),
        Expr::arccos(arg) => function(r"\arccos", arg),
        Expr::arctg(arg) => function(r"\arctan", arg),
        Expr::arcctg(arg) => function(r"\operatorname{arccot}", arg),
        Expr::Derivative(body, var, order) => {
            let var = format_variable(var);
            let operator = if *order == 1 {
                format!(r"\frac{{d}}{{d{}}}", var)
            } else {
                format!(r"\frac{{d^{{{}}}}}{{d{}^{{{}}}}}", order, var, order)
            };
            (
                format!(r"{}\left[{}\right]", operator, body.to_tex()),
                Prec::Sum,
            )
        }
    }
}

/// Renders `expr`, parenthesised if it binds weaker than `min`.
fn wrap(expr: &Expr, min: Prec) -> String {
    let (text, prec) = render(expr);
    if prec < min {
        format!(r"\left({}\right)", text)
    } else {
        text
    }
}

fn function(name: &str, arg: &Expr) -> (String, Prec) {
    (format!(r"{}\left({}\right)", name, arg.to_tex()), Prec::Atom)
}

/// `-c * rest` or a negative constant, as its positive counterpart
fn negated(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Const(c) if *c < 0.0 => Some(Expr::Const(-c)),
        Expr::Mul(lhs, rhs) => match lhs.as_ref() {
            Expr::Const(c) if *c == -1.0 => Some(*rhs.clone()),
            Expr::Const(c) if *c < 0.0 => Some(Expr::Mul(Box::new(Expr::Const(-c)), rhs.clone())),
            _ => None,
        },
        _ => None,
    }
}

fn render_product(lhs: &Expr, rhs: &Expr) -> (String, Prec) {
    if let Expr::Const(c) = lhs {
        if *c == -1.0 {
            return (format!("-{}", wrap(rhs, Prec::Product)), Prec::Sum);
        }
        if starts_with_letter(rhs) {
            let prec = if *c < 0.0 { Prec::Sum } else { Prec::Product };
            return (format!("{}{}", format_number(*c), wrap(rhs, Prec::Product)), prec);
        }
    }
    (
        format!(r"{} \cdot {}", wrap(lhs, Prec::Product), wrap(rhs, Prec::Product)),
        Prec::Product,
    )
}

/// true if the rendered form starts with a variable or a function name,
/// so a numeric coefficient can be written in front of it
fn starts_with_letter(expr: &Expr) -> bool {
    match expr {
        Expr::Var(_) => true,
        Expr::Pow(base, _) => matches!(base.as_ref(), Expr::Var(_)),
        Expr::Mul(lhs, _) => starts_with_letter(lhs),
        other => other.function_argument().is_some(),
    }
}

fn render_power(base: &Expr, exp: &Expr) -> (String, Prec) {
    if let Expr::Var(name) = base {
        if name == "e" {
            return (format!("e^{{{}}}", exp.to_tex()), Prec::Power);
        }
    }
    if let Expr::Const(half) = exp {
        if *half == 0.5 {
            return (format!(r"\sqrt{{{}}}", base.to_tex()), Prec::Atom);
        }
    }
    let base = match render(base) {
        (text, Prec::Atom) if !matches!(base, Expr::Div(..)) && base.function_argument().is_none() => text,
        (text, _) => format!(r"\left({}\right)", text),
    };
    (format!("{}^{{{}}}", base, exp.to_tex()), Prec::Power)
}

fn format_variable(name: &str) -> String {
    if name == "pi" || GREEK_LETTERS.contains(&name) {
        format!(r"\{}", name)
    } else {
        name.replace('_', r"\_")
    }
}

/// Integers without a trailing `.0`, other values rounded to twelve decimals.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return r"\text{NaN}".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { r"\infty".to_string() } else { r"-\infty".to_string() };
    }
    if n.trunc() == n && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let rounded = (n * 1e12).round() / 1e12;
        format!("{}", rounded)
    }
}
