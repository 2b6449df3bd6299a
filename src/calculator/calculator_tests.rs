use crate::Utils::config::CalculatorConfig;
use crate::Utils::plots::Board;
use crate::calculator::form::{Calculator, FormEvent, OperationMode};
use crate::errors::CalcError;
use crate::symbolic::symbolic_traits::SymbolicService;
//___________________________________TESTS____________________________________

mod tests {
    use super::*;

    fn calculator() -> Calculator<SymbolicService, Board> {
        let mut config = CalculatorConfig::default();
        config.board.samples = 41;
        Calculator::new(SymbolicService::new(), Board::new(), config)
    }

    fn type_in(calculator: &mut Calculator<SymbolicService, Board>, expression: &str, order: &str) {
        calculator.on_input(FormEvent::Expression(expression.to_string()));
        calculator.on_input(FormEvent::Order(order.to_string()));
    }

    fn titles(calculator: &Calculator<SymbolicService, Board>) -> Vec<String> {
        calculator
            .results()
            .entries()
            .iter()
            .map(|e| e.title.clone())
            .collect()
    }

    fn tex(calculator: &Calculator<SymbolicService, Board>) -> Vec<String> {
        calculator
            .results()
            .entries()
            .iter()
            .filter_map(|e| e.tex().map(|t| t.to_string()))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let calculator = calculator();
        assert!(!calculator.submit_enabled());
        assert!(calculator.options_visible());
        assert!(!calculator.graph_visible());
        assert_eq!(calculator.form().variable, "x");
        assert_eq!(calculator.form().order, "1");
        assert_eq!(calculator.surface().container_id(), Some("graph"));
    }

    #[test]
    fn test_differentiate_square_twice() {
        let mut calculator = calculator();
        type_in(&mut calculator, "x^2", "2");
        assert!(calculator.submit_enabled());
        calculator.on_submit().unwrap();
        assert!(calculator.graph_visible());
        assert_eq!(titles(&calculator), vec!["Order 1", "Order 2"]);
        assert_eq!(tex(&calculator), vec!["2x", "2"]);
        // original plus one curve per order
        assert_eq!(calculator.registry().curve_count(), 3);
        let labels: Vec<&str> = calculator
            .graph_options()
            .toggles()
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(labels, vec!["f(x)", "f'(x)", "f''(x)"]);
        let colors: Vec<&str> = calculator
            .registry()
            .curves()
            .iter()
            .map(|c| c.color.as_str())
            .collect();
        assert_eq!(colors, vec!["black", "crimson", "darkorange"]);
        assert_eq!(calculator.surface().overlay(), None);
    }

    #[test]
    fn test_derivative_of_constant_is_zero() {
        let mut calculator = calculator();
        type_in(&mut calculator, "5", "1");
        calculator.on_submit().unwrap();
        assert_eq!(titles(&calculator), vec!["Order 1"]);
        assert_eq!(tex(&calculator), vec!["0"]);
        assert_eq!(calculator.registry().curve_count(), 2);
    }

    #[test]
    fn test_simplify_adds_no_curve() {
        let mut calculator = calculator();
        calculator.on_input(FormEvent::Mode(OperationMode::Simplify));
        calculator.on_input(FormEvent::Expression("x + x".to_string()));
        calculator.on_submit().unwrap();
        assert_eq!(titles(&calculator), vec!["Simplified"]);
        assert_eq!(tex(&calculator), vec!["2x"]);
        assert_eq!(calculator.registry().curve_count(), 1);
    }

    #[test]
    fn test_parse_error_gates_submit() {
        let mut calculator = calculator();
        type_in(&mut calculator, "sin(x)", "1");
        assert!(calculator.submit_enabled());
        calculator.on_input(FormEvent::Expression("sin(x".to_string()));
        assert!(!calculator.submit_enabled());
        assert!(calculator.preview().display().is_error);
        assert!(matches!(calculator.on_submit(), Err(CalcError::SubmitDisabled)));
        assert!(calculator.results().is_empty());
        assert!(!calculator.graph_visible());

        calculator.on_input(FormEvent::Expression("sin(x)".to_string()));
        assert!(calculator.submit_enabled());
        assert!(!calculator.preview().display().is_error);
        assert!(calculator.on_submit().is_ok());
    }

    #[test]
    fn test_other_fields_revalidate() {
        let mut calculator = calculator();
        type_in(&mut calculator, "x^2", "2");
        assert!(calculator.submit_enabled());
        calculator.on_input(FormEvent::Order("0".to_string()));
        assert!(!calculator.submit_enabled());
        calculator.on_input(FormEvent::Order("3".to_string()));
        assert!(calculator.submit_enabled());
        calculator.on_input(FormEvent::Variable("e".to_string()));
        assert!(!calculator.submit_enabled());
        // the operator is not part of the preview in simplify mode
        calculator.on_input(FormEvent::Mode(OperationMode::Simplify));
        assert!(calculator.submit_enabled());
    }

    #[test]
    fn test_mode_switch_keeps_values() {
        let mut calculator = calculator();
        type_in(&mut calculator, "t^3", "3");
        calculator.on_input(FormEvent::Variable("t".to_string()));
        calculator.on_input(FormEvent::Mode(OperationMode::Simplify));
        assert!(!calculator.options_visible());
        calculator.on_input(FormEvent::Mode(OperationMode::Differentiate));
        assert!(calculator.options_visible());
        assert_eq!(calculator.form().order, "3");
        assert_eq!(calculator.form().variable, "t");
        assert_eq!(
            calculator.preview().display().content,
            r"$$\frac{d^{3}}{dt^{3}}\left[t^{3}\right]$$"
        );
    }

    #[test]
    fn test_toggle_keeps_index_and_color() {
        let mut calculator = calculator();
        type_in(&mut calculator, "x^2", "1");
        calculator.on_submit().unwrap();
        let before = calculator.registry().curves()[1].clone();
        calculator.on_curve_toggled(1, false);
        assert!(!calculator.registry().curves()[1].visible);
        assert!(!calculator.surface().is_visible(before.handle));
        assert!(!calculator.graph_options().toggles()[1].checked);
        calculator.on_curve_toggled(1, true);
        assert_eq!(calculator.registry().curves()[1], before);
        assert!(calculator.surface().is_visible(before.handle));
        assert!(calculator.graph_options().toggles()[1].checked);
    }

    #[test]
    fn test_resubmit_resets_session() {
        let mut calculator = calculator();
        type_in(&mut calculator, "x^3", "3");
        calculator.on_submit().unwrap();
        assert_eq!(calculator.registry().curve_count(), 4);
        type_in(&mut calculator, "x", "1");
        calculator.on_submit().unwrap();
        assert_eq!(calculator.registry().curve_count(), 2);
        assert_eq!(calculator.results().len(), 1);
        assert_eq!(calculator.surface().curves().len(), 2);
        let indices: Vec<usize> = calculator.registry().curves().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_ninth_curve_reuses_first_color() {
        let mut calculator = calculator();
        type_in(&mut calculator, "x^10", "8");
        calculator.on_submit().unwrap();
        assert_eq!(calculator.registry().curve_count(), 9);
        let curves = calculator.registry().curves();
        assert_eq!(curves[7].color, "purple");
        assert_eq!(curves[8].color, curves[0].color);
    }

    #[test]
    fn test_unplottable_function_shows_overlay() {
        let mut calculator = calculator();
        calculator.on_input(FormEvent::Mode(OperationMode::Simplify));
        calculator.on_input(FormEvent::Expression("ln(-1 - x^2)".to_string()));
        calculator.on_submit().unwrap();
        assert_eq!(calculator.registry().curve_count(), 0);
        let overlay = calculator.surface().overlay().unwrap();
        assert!(overlay.starts_with("Unable to draw graph: "));
        // results are rendered regardless
        assert_eq!(titles(&calculator), vec!["Simplified"]);
    }

    #[test]
    fn test_unplottable_function_still_differentiates() {
        let mut calculator = calculator();
        type_in(&mut calculator, "ln(-1 - x^2)", "1");
        assert!(calculator.on_submit().is_ok());
        assert_eq!(titles(&calculator), vec!["Order 1"]);
        // only the derivative is real
        assert_eq!(calculator.registry().curve_count(), 1);
        assert_eq!(calculator.surface().overlay(), None);
    }

    #[test]
    fn test_free_variable_fails_first_derivative_plot() {
        let mut calculator = calculator();
        type_in(&mut calculator, "x^2 y", "2");
        calculator.on_submit().unwrap();
        assert_eq!(calculator.registry().curve_count(), 0);
        assert_eq!(titles(&calculator), vec!["Order 1", "Error"]);
        assert_eq!(
            calculator.surface().overlay(),
            Some("Unable to draw graph: Undefined symbol y")
        );
    }

    #[test]
    fn test_order_above_limit_is_reported() {
        let mut config = CalculatorConfig::default();
        config.max_order = 2;
        let mut calculator = Calculator::new(SymbolicService::new(), Board::new(), config);
        type_in(&mut calculator, "x^5", "3");
        calculator.on_submit().unwrap();
        assert_eq!(titles(&calculator), vec!["Error"]);
        let message = calculator.results().entries()[0].message.clone().unwrap();
        assert!(message.starts_with("Unable to find derivative: "));
        // the original function is still plotted
        assert_eq!(calculator.registry().curve_count(), 1);
    }

    #[test]
    fn test_other_variable() {
        let mut calculator = calculator();
        type_in(&mut calculator, "sin(t)", "2");
        calculator.on_input(FormEvent::Variable("t".to_string()));
        calculator.on_submit().unwrap();
        assert_eq!(
            tex(&calculator),
            vec![r"\cos\left(t\right)".to_string(), r"-\sin\left(t\right)".to_string()]
        );
        assert_eq!(calculator.graph_options().toggles()[2].label, "f''(t)");
    }
}
