//! Form state and the event dispatcher of the calculator.
use crate::Utils::config::CalculatorConfig;
use crate::Utils::plots::PlotSurface;
use crate::calculator::pipeline::{DifferentiationPipeline, SimplifyPath};
use crate::calculator::preview::LivePreview;
use crate::calculator::result_panel::ResultPanel;
use crate::calculator::session::{CurveRegistry, GraphOptions, Session};
use crate::errors::{CalcError, CalcResult, ParseError};
use crate::symbolic::symbolic_traits::ExpressionService;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum OperationMode {
    Simplify,
    #[default]
    Differentiate,
}

/// Input fields of the form, named by their element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum FormField {
    #[strum(serialize = "eq_input")]
    Expression,
    #[strum(serialize = "order_input")]
    Order,
    #[strum(serialize = "wrt_input")]
    Variable,
    #[strum(serialize = "operation")]
    Mode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Expression(String),
    Order(String),
    Variable(String),
    Mode(OperationMode),
}

impl FormEvent {
    /// Builds an event from a field id and its new value, e.g.
    /// `("order_input", "2")` or `("operation", "simplify")`.
    pub fn from_field(field: &str, value: &str) -> CalcResult<FormEvent> {
        let field = FormField::from_str(field)
            .map_err(|_| CalcError::UnknownField(format!("field '{}'", field)))?;
        let event = match field {
            FormField::Expression => FormEvent::Expression(value.to_string()),
            FormField::Order => FormEvent::Order(value.to_string()),
            FormField::Variable => FormEvent::Variable(value.to_string()),
            FormField::Mode => FormEvent::Mode(
                OperationMode::from_str(value.trim())
                    .map_err(|_| CalcError::UnknownField(format!("operation '{}'", value)))?,
            ),
        };
        Ok(event)
    }

    pub fn field(&self) -> FormField {
        match self {
            FormEvent::Expression(_) => FormField::Expression,
            FormEvent::Order(_) => FormField::Order,
            FormEvent::Variable(_) => FormField::Variable,
            FormEvent::Mode(_) => FormField::Mode,
        }
    }
}

/// Current values of the form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    pub expression: String,
    pub mode: OperationMode,
    pub order: String,
    pub variable: String,
}

impl FormSnapshot {
    pub fn new(default_variable: &str) -> Self {
        FormSnapshot {
            expression: String::new(),
            mode: OperationMode::default(),
            order: "1".to_string(),
            variable: default_variable.to_string(),
        }
    }
}

/// The calculator: form state, live preview, and the session of the last
/// submission.
pub struct Calculator<S: ExpressionService, P: PlotSurface> {
    service: S,
    config: CalculatorConfig,
    form: FormSnapshot,
    preview: LivePreview,
    options_visible: bool,
    graph_visible: bool,
    session: Session<P>,
}

impl<S: ExpressionService, P: PlotSurface> Calculator<S, P> {
    pub fn new(service: S, surface: P, config: CalculatorConfig) -> Self {
        let form = FormSnapshot::new(&config.default_variable);
        let mut session = Session::new(surface, &config);
        session.reset();
        let mut calculator = Calculator {
            service,
            config,
            options_visible: form.mode == OperationMode::Differentiate,
            form,
            preview: LivePreview::new(),
            graph_visible: false,
            session,
        };
        calculator.refresh_preview();
        calculator
    }

    /// Applies a change of any field and re-runs the preview.
    pub fn on_input(&mut self, event: FormEvent) {
        log::debug!("input on {}: {:?}", event.field(), event);
        match event {
            FormEvent::Expression(text) => self.form.expression = text,
            FormEvent::Order(text) => self.form.order = text,
            FormEvent::Variable(text) => self.form.variable = text,
            FormEvent::Mode(mode) => self.on_operation_mode_changed(mode),
        }
        self.refresh_preview();
    }

    /// Order and variable are only shown when differentiating; their values
    /// are kept either way.
    pub fn on_operation_mode_changed(&mut self, mode: OperationMode) {
        self.form.mode = mode;
        self.options_visible = mode == OperationMode::Differentiate;
    }

    /// Runs a submission: clears the previous results, plots the original
    /// function as curve 0, then simplifies or differentiates.
    ///
    /// Fails only when the preview has closed the submit gate; every other
    /// failure ends up in the result list or the plot overlay.
    pub fn on_submit(&mut self) -> CalcResult<()> {
        if !self.preview.submit_enabled() {
            log::warn!("submit ignored: {}", self.preview.display().content);
            return Err(CalcError::SubmitDisabled);
        }
        self.session.reset();
        self.graph_visible = true;
        let form = self.form.clone();
        log::info!("submit {} '{}'", form.mode, form.expression);

        let expr = match self.service.parse(&form.expression) {
            Ok(expr) => expr,
            Err(e) => {
                self.session.results.show_error(&e.to_string());
                return Ok(());
            }
        };
        let variable = form.variable.trim();
        if let Err(e) = self.session.plot(&self.service, &expr, variable, 0) {
            log::debug!("original function not plotted: {}", e);
        }

        match form.mode {
            OperationMode::Simplify => {
                if let Err(e) = SimplifyPath::new(&self.service).run(&mut self.session, &expr) {
                    self.session.results.show_error(&e.to_string());
                }
            }
            OperationMode::Differentiate => {
                let order = match parse_order(&form.order) {
                    Ok(order) => order,
                    Err(e) => {
                        self.session.results.show_error(&e.to_string());
                        return Ok(());
                    }
                };
                let pipeline = DifferentiationPipeline::new(&self.service, self.config.max_order);
                if let Err(e) = pipeline.run(&mut self.session, &expr, variable, order) {
                    log::debug!("differentiation stopped: {}", e);
                }
            }
        }
        Ok(())
    }

    pub fn on_curve_toggled(&mut self, curve_index: usize, checked: bool) {
        self.session.registry.set_visibility(curve_index, checked);
        self.session.graph_options.set_checked(curve_index, checked);
    }

    fn refresh_preview(&mut self) {
        self.preview.render(&self.service, &self.form);
    }

    pub fn form(&self) -> &FormSnapshot {
        &self.form
    }

    pub fn preview(&self) -> &LivePreview {
        &self.preview
    }

    pub fn submit_enabled(&self) -> bool {
        self.preview.submit_enabled()
    }

    pub fn options_visible(&self) -> bool {
        self.options_visible
    }

    pub fn graph_visible(&self) -> bool {
        self.graph_visible
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn results(&self) -> &ResultPanel {
        &self.session.results
    }

    pub fn graph_options(&self) -> &GraphOptions {
        &self.session.graph_options
    }

    pub fn registry(&self) -> &CurveRegistry<P> {
        &self.session.registry
    }

    pub fn surface(&self) -> &P {
        self.session.registry.surface()
    }
}

fn parse_order(text: &str) -> Result<usize, ParseError> {
    match text.trim().parse::<usize>() {
        Ok(order) if order >= 1 => Ok(order),
        _ => Err(ParseError::InvalidOrder(text.trim().to_string())),
    }
}
