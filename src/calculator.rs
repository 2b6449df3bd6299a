/// # Calculator
/// the result pipeline of the calculator page:
/// 1) keeps a typeset preview of the form input and gates submission on it
/// 2) on submit plots the original function, then simplifies it or differentiates
///    it up to the requested order, one result and one curve per order
/// 3) shows or hides single curves
///# Example#
/// ```
/// use RustedCalc::Utils::config::CalculatorConfig;
/// use RustedCalc::Utils::plots::Board;
/// use RustedCalc::calculator::form::{Calculator, FormEvent};
/// use RustedCalc::symbolic::symbolic_traits::SymbolicService;
/// let mut calculator = Calculator::new(SymbolicService::new(), Board::new(), CalculatorConfig::default());
/// calculator.on_input(FormEvent::Expression("x^3".to_string()));
/// calculator.on_input(FormEvent::Order("2".to_string()));
/// calculator.on_submit().unwrap();
/// for entry in calculator.results().entries() {
///     println!("{}: {:?}", entry.title, entry.rendered_math);
/// }
/// assert_eq!(calculator.registry().curve_count(), 3);
/// ```
pub mod form;
/// differentiation pipeline and simplify path
pub mod pipeline;
/// live preview and submit gate
pub mod preview;
pub mod result_panel;
/// curve registry, graph options and the session value
pub mod session;
#[cfg(test)]
mod calculator_tests;
