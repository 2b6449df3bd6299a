use crate::calculator::form::{FormSnapshot, OperationMode};
use crate::symbolic::symbolic_traits::ExpressionService;

/// What the preview area shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewDisplay {
    /// `$$<tex>$$` or the parse error message
    pub content: String,
    pub is_error: bool,
}

/// Typeset preview of the form input; also the only gate on submission.
#[derive(Debug, Clone, Default)]
pub struct LivePreview {
    display: PreviewDisplay,
    submit_enabled: bool,
}

/// The text the preview parses: in differentiate mode the expression is
/// prefixed with `[d/dv]` or `[d^n/dv^n]`.
pub fn preview_text(snapshot: &FormSnapshot) -> String {
    match snapshot.mode {
        OperationMode::Simplify => snapshot.expression.clone(),
        OperationMode::Differentiate => {
            let order = snapshot.order.trim();
            let order = if order == "1" {
                String::new()
            } else {
                format!("^{}", order)
            };
            format!(
                "[d{}/d{}{}]{}",
                order,
                snapshot.variable.trim(),
                order,
                snapshot.expression
            )
        }
    }
}

impl LivePreview {
    pub fn new() -> Self {
        LivePreview::default()
    }

    /// Parses (never evaluates) the current input and updates the display and
    /// the submit gate. Returns whether submission is now enabled.
    pub fn render<S: ExpressionService>(&mut self, service: &S, snapshot: &FormSnapshot) -> bool {
        let text = preview_text(snapshot);
        match service.parse(&text) {
            Ok(expr) => {
                self.display = PreviewDisplay {
                    content: format!("$${}$$", service.to_tex(&expr)),
                    is_error: false,
                };
                self.submit_enabled = true;
            }
            Err(e) => {
                log::debug!("preview of '{}' failed: {}", text, e);
                self.display = PreviewDisplay {
                    content: e.to_string(),
                    is_error: true,
                };
                self.submit_enabled = false;
            }
        }
        self.submit_enabled
    }

    pub fn display(&self) -> &PreviewDisplay {
        &self.display
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_traits::SymbolicService;

    fn snapshot(expression: &str, mode: OperationMode, order: &str, variable: &str) -> FormSnapshot {
        FormSnapshot {
            expression: expression.to_string(),
            mode,
            order: order.to_string(),
            variable: variable.to_string(),
        }
    }

    #[test]
    fn test_preview_text() {
        let s = snapshot("x^2", OperationMode::Differentiate, "1", "x");
        assert_eq!(preview_text(&s), "[d/dx]x^2");
        let s = snapshot("t^3", OperationMode::Differentiate, "3", "t");
        assert_eq!(preview_text(&s), "[d^3/dt^3]t^3");
        let s = snapshot("x + x", OperationMode::Simplify, "3", "t");
        assert_eq!(preview_text(&s), "x + x");
    }

    #[test]
    fn test_valid_input_enables_submit() {
        let service = SymbolicService::new();
        let mut preview = LivePreview::new();
        let s = snapshot("x^2", OperationMode::Differentiate, "2", "x");
        assert!(preview.render(&service, &s));
        assert_eq!(
            preview.display().content,
            r"$$\frac{d^{2}}{dx^{2}}\left[x^{2}\right]$$"
        );
        assert!(!preview.display().is_error);
    }

    #[test]
    fn test_invalid_order_or_variable_disables_submit() {
        let service = SymbolicService::new();
        let mut preview = LivePreview::new();
        for (order, variable) in [("0", "x"), ("two", "x"), ("", "x"), ("1", "pi"), ("1", "")] {
            let s = snapshot("x^2", OperationMode::Differentiate, order, variable);
            assert!(!preview.render(&service, &s), "order {:?} variable {:?}", order, variable);
            assert!(preview.display().is_error);
        }
    }

    #[test]
    fn test_parse_error_replaces_preview() {
        let service = SymbolicService::new();
        let mut preview = LivePreview::new();
        let s = snapshot("sin(x)", OperationMode::Simplify, "1", "x");
        assert!(preview.render(&service, &s));
        let s = snapshot("sin(x", OperationMode::Simplify, "1", "x");
        assert!(!preview.render(&service, &s));
        assert!(preview.display().is_error);
        assert!(preview.display().content.contains("never closed"));
        assert!(!preview.display().content.starts_with("$$"));
    }
}
