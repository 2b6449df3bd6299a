//! The two operations a submission can run after the original function has
//! been plotted.
use crate::Utils::plots::PlotSurface;
use crate::calculator::session::Session;
use crate::errors::{CalcError, CalcResult, DifferentiationError};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::ExpressionService;

/// Successive derivatives `1..=order`, each shown as `"Order k"` and plotted.
pub struct DifferentiationPipeline<'a, S: ExpressionService> {
    service: &'a S,
    max_order: usize,
}

impl<'a, S: ExpressionService> DifferentiationPipeline<'a, S> {
    pub fn new(service: &'a S, max_order: usize) -> Self {
        DifferentiationPipeline { service, max_order }
    }

    /// Returns the derivative of the highest order.
    ///
    /// The first failure is shown as a single `"Unable to find derivative"`
    /// entry and ends the run; entries and curves of earlier orders stay.
    pub fn run<P: PlotSurface>(
        &self,
        session: &mut Session<P>,
        expr: &Expr,
        variable: &str,
        order: usize,
    ) -> CalcResult<Expr> {
        let result = self.derive(session, expr, variable, order);
        if let Err(e) = &result {
            session
                .results
                .show_error(&format!("Unable to find derivative: {}", e));
        }
        result
    }

    fn derive<P: PlotSurface>(
        &self,
        session: &mut Session<P>,
        expr: &Expr,
        variable: &str,
        order: usize,
    ) -> CalcResult<Expr> {
        if order == 0 {
            return Err(DifferentiationError::ZeroOrder.into());
        }
        if order > self.max_order {
            return Err(DifferentiationError::OrderTooLarge {
                order,
                max: self.max_order,
            }
            .into());
        }
        let mut current = expr.clone();
        for k in 1..=order {
            current = self.service.differentiate(&current, variable)?;
            session
                .results
                .show_result(&format!("Order {}", k), &self.service.to_tex(&current));
            session.plot(self.service, &current, variable, k)?;
        }
        Ok(current)
    }
}

/// One `"Simplified"` entry; the simplified function equals the original, so
/// nothing new is plotted.
pub struct SimplifyPath<'a, S: ExpressionService> {
    service: &'a S,
}

impl<'a, S: ExpressionService> SimplifyPath<'a, S> {
    pub fn new(service: &'a S) -> Self {
        SimplifyPath { service }
    }

    /// Failures are returned for the caller to show.
    pub fn run<P: PlotSurface>(&self, session: &mut Session<P>, expr: &Expr) -> Result<Expr, CalcError> {
        let simplified = self.service.simplify(expr)?;
        session
            .results
            .show_result("Simplified", &self.service.to_tex(&simplified));
        Ok(simplified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utils::config::CalculatorConfig;
    use crate::Utils::plots::Board;
    use crate::symbolic::symbolic_traits::SymbolicService;

    fn session() -> Session<Board> {
        let mut session = Session::new(Board::new(), &CalculatorConfig::default());
        session.reset();
        session
    }

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    fn titles(session: &Session<Board>) -> Vec<String> {
        session.results.entries().iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_second_order_of_square() {
        let service = SymbolicService::new();
        let mut session = session();
        let pipeline = DifferentiationPipeline::new(&service, 20);
        let last = pipeline.run(&mut session, &parse("x^2"), "x", 2).unwrap();
        assert_eq!(last, Expr::Const(2.0));
        assert_eq!(titles(&session), vec!["Order 1", "Order 2"]);
        let tex: Vec<&str> = session.results.entries().iter().filter_map(|e| e.tex()).collect();
        assert_eq!(tex, vec!["2x", "2"]);
        assert_eq!(session.registry.curve_count(), 2);
    }

    #[test]
    fn test_order_limits() {
        let service = SymbolicService::new();
        let mut session = session();
        let pipeline = DifferentiationPipeline::new(&service, 3);
        let err = pipeline.run(&mut session, &parse("x"), "x", 4).unwrap_err();
        assert!(matches!(
            err,
            CalcError::Differentiation(DifferentiationError::OrderTooLarge { order: 4, max: 3 })
        ));
        assert!(pipeline.run(&mut session, &parse("x"), "x", 0).is_err());
        assert_eq!(titles(&session), vec!["Error", "Error"]);
        assert_eq!(session.registry.curve_count(), 0);
    }

    #[test]
    fn test_failure_keeps_earlier_steps() {
        let service = SymbolicService::new();
        let mut session = session();
        let pipeline = DifferentiationPipeline::new(&service, 20);
        // y stays free, so the first derivative cannot be plotted against x
        let result = pipeline.run(&mut session, &parse("x^2 y"), "x", 3);
        assert!(matches!(result, Err(CalcError::Plot(_))));
        assert_eq!(titles(&session), vec!["Order 1", "Error"]);
        let message = session.results.entries()[1].message.clone().unwrap();
        assert_eq!(message, "Unable to find derivative: Undefined symbol y");
        assert_eq!(
            session.registry.surface().overlay(),
            Some("Unable to draw graph: Undefined symbol y")
        );
    }

    #[test]
    fn test_reserved_variable_is_rejected() {
        let service = SymbolicService::new();
        let mut session = session();
        let pipeline = DifferentiationPipeline::new(&service, 20);
        assert!(pipeline.run(&mut session, &parse("x"), "pi", 1).is_err());
        assert_eq!(titles(&session), vec!["Error"]);
    }

    #[test]
    fn test_simplify_adds_no_curve() {
        let service = SymbolicService::new();
        let mut session = session();
        let simplified = SimplifyPath::new(&service)
            .run(&mut session, &parse("x + x"))
            .unwrap();
        assert_eq!(service.to_tex(&simplified), "2x");
        assert_eq!(titles(&session), vec!["Simplified"]);
        assert_eq!(session.results.entries()[0].tex(), Some("2x"));
        assert_eq!(session.registry.curve_count(), 0);
    }
}
