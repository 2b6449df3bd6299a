// SYMBOLIC TRAITS //////////////////////////////////////////////////////////////////
// The calculator talks to the symbolic engine only through ExpressionService.
// SymbolicService implements it for the native Expr engine; add other engines here as needed

use crate::errors::{CalcError, DifferentiationError, ParseError};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::Compiled;

/// Parse, differentiate, simplify, compile and typeset expressions.
pub trait ExpressionService {
    fn parse(&self, text: &str) -> Result<Expr, ParseError>;
    /// First derivative with respect to `var`, already simplified.
    fn differentiate(&self, expr: &Expr, var: &str) -> Result<Expr, DifferentiationError>;
    fn simplify(&self, expr: &Expr) -> Result<Expr, CalcError>;
    fn to_tex(&self, expr: &Expr) -> String;
    fn compile(&self, expr: &Expr) -> Compiled;
}

///////////////// IMPLEMENTATION OF THE TRAIT FOR THE NATIVE ENGINE /////////////////////////
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicService;

impl SymbolicService {
    pub fn new() -> Self {
        SymbolicService
    }
}

impl ExpressionService for SymbolicService {
    fn parse(&self, text: &str) -> Result<Expr, ParseError> {
        Expr::parse_expression(text)
    }

    fn differentiate(&self, expr: &Expr, var: &str) -> Result<Expr, DifferentiationError> {
        let derivative = expr.try_diff(var)?.simplify();
        log::debug!("d/d{} {} = {}", var, expr, derivative);
        Ok(derivative)
    }

    fn simplify(&self, expr: &Expr) -> Result<Expr, CalcError> {
        let simplified = expr.simplify();
        if simplified.has_non_finite_constant() {
            return Err(CalcError::Simplify(format!(
                "{} reduces to a non-finite constant",
                expr
            )));
        }
        Ok(simplified)
    }

    fn to_tex(&self, expr: &Expr) -> String {
        expr.to_tex()
    }

    fn compile(&self, expr: &Expr) -> Compiled {
        expr.compile()
    }
}
