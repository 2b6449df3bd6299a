#![allow(non_snake_case)]
use RustedCalc::Utils::config::CalculatorConfig;
use RustedCalc::Utils::logger::init_logger;
use RustedCalc::Utils::plots::{Board, PlotSurface};
use RustedCalc::calculator::form::{Calculator, FormEvent, OperationMode};
use RustedCalc::errors::CalcResult;
use RustedCalc::symbolic::symbolic_traits::SymbolicService;
use itertools::Itertools;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

fn results_table<P: PlotSurface>(calculator: &Calculator<SymbolicService, P>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#", "title", "result"]);
    for (i, entry) in calculator.results().entries().iter().enumerate() {
        let content = if entry.is_error {
            entry.message.clone().unwrap_or_default()
        } else {
            entry.rendered_math.clone().unwrap_or_default()
        };
        builder.push_record([i.to_string(), entry.title.clone(), content]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

fn main() -> CalcResult<()> {
    let example = 0;
    match example {
        0 => {
            // DIFFERENTIATION UP TO ORDER 3
            init_logger("info", false, Path::new("."))?;
            let mut calculator =
                Calculator::new(SymbolicService::new(), Board::new(), CalculatorConfig::default());
            calculator.on_input(FormEvent::Expression("x^3 - 2x + sin(x)".to_string()));
            calculator.on_input(FormEvent::Order("3".to_string()));
            println!("preview: {}", calculator.preview().display().content);
            calculator.on_submit()?;
            println!("{}", results_table(&calculator));
            let labels = calculator
                .graph_options()
                .toggles()
                .iter()
                .map(|t| format!("{} [{}]", t.label, t.color))
                .join(", ");
            println!("curves: {}", labels);
            // hide the original function and save what is left
            calculator.on_curve_toggled(0, false);
            let svg = calculator.surface().render_svg(800, 600)?;
            std::fs::write("derivatives.svg", svg)?;
        }
        1 => {
            // SIMPLIFICATION
            init_logger("debug", false, Path::new("."))?;
            let mut calculator =
                Calculator::new(SymbolicService::new(), Board::new(), CalculatorConfig::default());
            calculator.on_input(FormEvent::Mode(OperationMode::Simplify));
            calculator.on_input(FormEvent::Expression("x + x + 3x^2*x/x - ln(exp(y))".to_string()));
            calculator.on_submit()?;
            println!("{}", results_table(&calculator));
            if let Some(overlay) = calculator.surface().overlay() {
                println!("{}", overlay);
            }
        }
        2 => {
            // LIVE PREVIEW: every keystroke re-runs the parser
            let mut calculator =
                Calculator::new(SymbolicService::new(), Board::new(), CalculatorConfig::default());
            for text in ["s", "si", "sin", "sin(", "sin(x", "sin(x)", "sin(x)^"] {
                calculator.on_input(FormEvent::Expression(text.to_string()));
                let display = calculator.preview().display();
                println!(
                    "{:<10} submit: {:<5} {}",
                    text,
                    calculator.submit_enabled(),
                    display.content
                );
            }
        }
        3 => {
            // SETTINGS FROM TOML, LOG FILE, CSV AND PNG OUTPUT
            let config = CalculatorConfig::from_toml_str(
                r##"
                palette = ["navy", "crimson", "#2e8b57"]
                default_variable = "t"
                [board]
                bounding_box = [-10.0, 3.0, 10.0, -3.0]
                samples = 200
                [logging]
                loglevel = "debug"
                log_to_file = true
                "##,
            )?;
            let log_file = init_logger(
                &config.logging.loglevel,
                config.logging.log_to_file,
                Path::new("."),
            )?;
            let mut calculator = Calculator::new(SymbolicService::new(), Board::new(), config);
            calculator.on_input(FormEvent::Expression("exp(-t^2/4) cos(2t)".to_string()));
            calculator.on_input(FormEvent::Order("2".to_string()));
            calculator.on_submit()?;
            println!("{}", results_table(&calculator));
            let headers: Vec<String> = calculator
                .graph_options()
                .toggles()
                .iter()
                .map(|t| t.label.clone())
                .collect();
            calculator
                .surface()
                .export_csv("t", &headers, Path::new("curves.csv"))?;
            calculator
                .surface()
                .save_png(Path::new("curves.png"), 800, 600)?;
            if let Some(path) = log_file {
                println!("log written to {}", path.display());
            }
        }
        _ => {
            println!("example {} does not exist", example);
        }
    }
    Ok(())
}
