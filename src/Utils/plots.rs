//! Plot surface used by the calculator.
//!
//! [`PlotSurface`] is the narrow interface the controller needs: set up a board,
//! plot a function in a colour, show or hide a curve and show an error overlay.
//! [`Board`] implements it by sampling every function on a uniform grid over the
//! viewport. The samples can be rendered with `plotters` (SVG string or PNG
//! file) or written to CSV.
use crate::Utils::logger::save_curves_to_csv;
use crate::errors::{CalcError, CalcResult, EvalError, PlotError};
use crate::symbolic::symbolic_lambdify::UnaryFn;
use plotters::coord::Shift;
use plotters::prelude::*;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Visible region of the board: `left..right` horizontally, `bottom..top` vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        BoundingBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.bottom && y <= self.top
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::new(-5.0, 5.0, 5.0, -5.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardOptions {
    pub bounding_box: BoundingBox,
    pub axis: bool,
    /// number of sample points per curve
    pub samples: usize,
}

impl Default for BoardOptions {
    fn default() -> Self {
        BoardOptions {
            bounding_box: BoundingBox::default(),
            axis: true,
            samples: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveStyle {
    pub color: String,
}

/// Handle of a plotted curve, valid until the next `init_board`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveId(pub usize);

pub trait PlotSurface {
    /// (Re)creates the board, dropping every curve and the overlay.
    fn init_board(&mut self, container_id: &str, options: &BoardOptions);
    fn plot_function(&mut self, f: UnaryFn, style: &CurveStyle) -> Result<CurveId, PlotError>;
    /// Shows or hides a curve without recreating it.
    fn set_visible(&mut self, curve: CurveId, visible: bool);
    fn show_overlay(&mut self, message: &str);
    fn hide_overlay(&mut self);
}

#[derive(Debug, Clone)]
pub struct SampledCurve {
    pub style: CurveStyle,
    pub visible: bool,
    /// `None` where the function has no real value
    pub points: Vec<(f64, Option<f64>)>,
}

/// In-memory plot board.
#[derive(Debug, Clone, Default)]
pub struct Board {
    container_id: Option<String>,
    options: BoardOptions,
    curves: Vec<SampledCurve>,
    overlay: Option<String>,
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    pub fn curves(&self) -> &[SampledCurve] {
        &self.curves
    }

    pub fn curve(&self, id: CurveId) -> Option<&SampledCurve> {
        self.curves.get(id.0)
    }

    pub fn is_visible(&self, id: CurveId) -> bool {
        self.curve(id).map(|c| c.visible).unwrap_or(false)
    }

    /// Uniform grid over the horizontal extent of the viewport.
    pub fn x_mesh(&self) -> Vec<f64> {
        let bbox = self.options.bounding_box;
        let n = self.options.samples.max(2);
        let step = (bbox.right - bbox.left) / (n - 1) as f64;
        (0..n).map(|i| bbox.left + step * i as f64).collect()
    }

    /// Evaluates `f` on the grid. Non-finite values are gaps; any other
    /// evaluation error rejects the whole function.
    fn sample(&self, f: &UnaryFn) -> Result<Vec<(f64, Option<f64>)>, PlotError> {
        let mut points = Vec::with_capacity(self.options.samples);
        for x in self.x_mesh() {
            match f(x) {
                Ok(y) => points.push((x, Some(y))),
                Err(EvalError::NonFinite { .. }) => points.push((x, None)),
                Err(e) => return Err(PlotError::Eval(e)),
            }
        }
        if points.iter().all(|(_, y)| y.is_none()) {
            return Err(PlotError::NoRealValues);
        }
        Ok(points)
    }

    /// Renders the board into an SVG document.
    pub fn render_svg(&self, width: u32, height: u32) -> CalcResult<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }

    pub fn save_png(&self, filename: &Path, width: u32, height: u32) -> CalcResult<()> {
        let root = BitMapBackend::new(filename, (width, height)).into_drawing_area();
        self.draw(&root)?;
        root.present().map_err(render_error)?;
        log::info!("plot saved to {}", filename.display());
        Ok(())
    }

    /// Writes all curves, visible or not, as columns of a CSV file.
    pub fn export_csv(&self, arg: &str, headers: &[String], filename: &Path) -> CalcResult<()> {
        let x_mesh = self.x_mesh();
        let columns: Vec<Vec<Option<f64>>> = self
            .curves
            .iter()
            .map(|curve| curve.points.iter().map(|(_, y)| *y).collect())
            .collect();
        save_curves_to_csv(arg, &x_mesh, headers, &columns, filename)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> CalcResult<()> {
        let bbox = self.options.bounding_box;
        root.fill(&WHITE).map_err(render_error)?;
        let label_area = if self.options.axis { 30 } else { 0 };
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .x_label_area_size(label_area)
            .y_label_area_size(label_area)
            .build_cartesian_2d(bbox.left..bbox.right, bbox.bottom..bbox.top)
            .map_err(render_error)?;
        if self.options.axis {
            chart.configure_mesh().draw().map_err(render_error)?;
        }

        for curve in self.curves.iter().filter(|c| c.visible) {
            let color = parse_color(&curve.style.color).unwrap_or(BLACK);
            for segment in visible_segments(&curve.points, &bbox) {
                chart
                    .draw_series(LineSeries::new(segment, color.stroke_width(2)))
                    .map_err(render_error)?;
            }
        }

        if let Some(message) = &self.overlay {
            root.draw(&Text::new(
                message.clone(),
                (15, 15),
                ("sans-serif", 18).into_font().color(&RED),
            ))
            .map_err(render_error)?;
        }
        Ok(())
    }
}

impl PlotSurface for Board {
    fn init_board(&mut self, container_id: &str, options: &BoardOptions) {
        log::debug!("init board '{}' with {:?}", container_id, options);
        self.container_id = Some(container_id.to_string());
        self.options = options.clone();
        self.curves.clear();
        self.overlay = None;
    }

    fn plot_function(&mut self, f: UnaryFn, style: &CurveStyle) -> Result<CurveId, PlotError> {
        if self.container_id.is_none() {
            return Err(PlotError::NotInitialized);
        }
        let points = self.sample(&f)?;
        self.curves.push(SampledCurve {
            style: style.clone(),
            visible: true,
            points,
        });
        Ok(CurveId(self.curves.len() - 1))
    }

    fn set_visible(&mut self, curve: CurveId, visible: bool) {
        match self.curves.get_mut(curve.0) {
            Some(c) => c.visible = visible,
            None => log::warn!("set_visible on unknown curve {}", curve.0),
        }
    }

    fn show_overlay(&mut self, message: &str) {
        self.overlay = Some(message.to_string());
    }

    fn hide_overlay(&mut self) {
        self.overlay = None;
    }
}

/// Splits sampled points into runs that can be drawn as one line: a gap or a
/// point far outside the viewport ends the run.
fn visible_segments(points: &[(f64, Option<f64>)], bbox: &BoundingBox) -> Vec<Vec<(f64, f64)>> {
    let span = bbox.top - bbox.bottom;
    let extended = BoundingBox::new(bbox.left, bbox.top + span, bbox.right, bbox.bottom - span);
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (x, y) in points {
        match y {
            Some(y) if extended.contains_y(*y) => current.push((*x, *y)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn render_error<E: std::fmt::Display>(e: E) -> CalcError {
    CalcError::Render(e.to_string())
}

fn hex_color_regex() -> Option<&'static Regex> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").ok())
        .as_ref()
}

/// Colour by CSS name (the ones a palette is likely to use) or `#rrggbb`.
pub fn parse_color(name: &str) -> Option<RGBColor> {
    let name = name.trim().to_lowercase();
    let named = match name.as_str() {
        "black" => Some(RGBColor(0, 0, 0)),
        "white" => Some(RGBColor(255, 255, 255)),
        "red" => Some(RGBColor(255, 0, 0)),
        "crimson" => Some(RGBColor(220, 20, 60)),
        "darkorange" => Some(RGBColor(255, 140, 0)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "gold" => Some(RGBColor(255, 215, 0)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "teal" => Some(RGBColor(0, 128, 128)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "navy" => Some(RGBColor(0, 0, 128)),
        "indigo" => Some(RGBColor(75, 0, 130)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "brown" => Some(RGBColor(165, 42, 42)),
        _ => None,
    };
    if named.is_some() {
        return named;
    }
    let caps = hex_color_regex()?.captures(&name)?;
    let channel = |i: usize| u8::from_str_radix(&caps[i], 16).ok();
    Some(RGBColor(channel(1)?, channel(2)?, channel(3)?))
}
