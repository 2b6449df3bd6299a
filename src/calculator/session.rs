//! State of one calculator session: plotted curves, their toggles and the
//! result list. Everything here is reset at the start of each submission.
use crate::Utils::config::{CalculatorConfig, DEFAULT_PALETTE};
use crate::Utils::plots::{BoardOptions, CurveId, CurveStyle, PlotSurface};
use crate::calculator::result_panel::ResultPanel;
use crate::errors::PlotError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::UnaryFn;
use crate::symbolic::symbolic_traits::ExpressionService;

/// A plotted result.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// position in creation order, stable until the next reset
    pub index: usize,
    pub color: String,
    pub visible: bool,
    pub handle: CurveId,
}

/// Ordered set of plotted curves.
///
/// Colours are taken from the palette cyclically: curve `i` gets
/// `palette[i % palette.len()]`, so a palette of 8 repeats from the 9th curve.
#[derive(Debug)]
pub struct CurveRegistry<P: PlotSurface> {
    surface: P,
    container_id: String,
    board_options: BoardOptions,
    palette: Vec<String>,
    curves: Vec<Curve>,
}

impl<P: PlotSurface> CurveRegistry<P> {
    pub fn new(surface: P, container_id: &str, board_options: BoardOptions, palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            palette
        };
        CurveRegistry {
            surface,
            container_id: container_id.to_string(),
            board_options,
            palette,
            curves: Vec::new(),
        }
    }

    /// Drops all curves and re-initialises the board with the configured
    /// viewport and axes.
    pub fn reset(&mut self) {
        self.curves.clear();
        self.surface.init_board(&self.container_id, &self.board_options);
    }

    /// Plots `f` in the next palette colour. On failure nothing is added.
    pub fn add_curve(&mut self, f: UnaryFn) -> Result<Curve, PlotError> {
        let index = self.curves.len();
        if index >= self.palette.len() && index % self.palette.len() == 0 {
            log::warn!(
                "{} curves exceed the palette of {} colours, colours repeat",
                index + 1,
                self.palette.len()
            );
        }
        let color = self.palette[index % self.palette.len()].clone();
        let style = CurveStyle {
            color: color.clone(),
        };
        let handle = self.surface.plot_function(f, &style)?;
        let curve = Curve {
            index,
            color,
            visible: true,
            handle,
        };
        self.curves.push(curve.clone());
        Ok(curve)
    }

    /// # Panics
    /// if `index` does not refer to a curve created since the last reset;
    /// indices only come from toggles this registry created.
    pub fn set_visibility(&mut self, index: usize, visible: bool) {
        let curve = &mut self.curves[index];
        self.surface.set_visible(curve.handle, visible);
        curve.visible = visible;
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut P {
        &mut self.surface
    }
}

/// Visibility checkbox of one curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveToggle {
    pub curve_index: usize,
    /// `f(x)`, `f'(x)`, `f''(x)`, ...
    pub label: String,
    pub color: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    toggles: Vec<CurveToggle>,
}

impl GraphOptions {
    pub fn add(&mut self, curve: &Curve, order: usize, variable: &str) {
        self.toggles.push(CurveToggle {
            curve_index: curve.index,
            label: format!("f{}({})", "'".repeat(order), variable),
            color: curve.color.clone(),
            checked: true,
        });
    }

    pub fn set_checked(&mut self, curve_index: usize, checked: bool) {
        if let Some(toggle) = self.toggles.iter_mut().find(|t| t.curve_index == curve_index) {
            toggle.checked = checked;
        }
    }

    pub fn toggles(&self) -> &[CurveToggle] {
        &self.toggles
    }

    pub fn clear(&mut self) {
        self.toggles.clear();
    }
}

/// The session value owned by the controller and lent to the pipelines.
#[derive(Debug)]
pub struct Session<P: PlotSurface> {
    pub registry: CurveRegistry<P>,
    pub results: ResultPanel,
    pub graph_options: GraphOptions,
}

impl<P: PlotSurface> Session<P> {
    pub fn new(surface: P, config: &CalculatorConfig) -> Self {
        Session {
            registry: CurveRegistry::new(
                surface,
                &config.board.container_id,
                config.board_options(),
                config.palette.clone(),
            ),
            results: ResultPanel::new(),
            graph_options: GraphOptions::default(),
        }
    }

    pub fn reset(&mut self) {
        self.results.clear();
        self.graph_options.clear();
        self.registry.reset();
    }

    /// Plots `expr` as a function of `variable` and adds its toggle; `order`
    /// is the number of primes in the toggle label. A failure is shown as the
    /// board overlay and returned.
    pub fn plot<S: ExpressionService>(
        &mut self,
        service: &S,
        expr: &Expr,
        variable: &str,
        order: usize,
    ) -> Result<Curve, PlotError> {
        self.registry.surface_mut().hide_overlay();
        let f = service.compile(expr).bind(variable);
        match self.registry.add_curve(f) {
            Ok(curve) => {
                self.graph_options.add(&curve, order, variable);
                Ok(curve)
            }
            Err(e) => {
                log::warn!("cannot plot {}: {}", expr, e);
                self.registry
                    .surface_mut()
                    .show_overlay(&format!("Unable to draw graph: {}", e));
                Err(e)
            }
        }
    }
}
