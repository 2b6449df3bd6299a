//! Calculator settings loaded from TOML.
//!
//! Every key is optional; missing keys take the defaults below.
//! ```toml
//! palette = ["black", "crimson", "darkorange", "gold", "green", "blue", "indigo", "purple"]
//! default_variable = "x"
//! max_order = 20
//!
//! [board]
//! container_id = "graph"
//! bounding_box = [-5.0, 5.0, 5.0, -5.0] # left, top, right, bottom
//! axis = true
//! samples = 400
//!
//! [logging]
//! loglevel = "info"
//! log_to_file = false
//! ```
use crate::Utils::logger::parse_level;
use crate::Utils::plots::{BoardOptions, BoundingBox, parse_color};
use crate::errors::{CalcError, CalcResult};
use crate::symbolic::symbolic_engine::{is_reserved_constant, is_valid_variable};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_PALETTE: [&str; 8] = [
    "black",
    "crimson",
    "darkorange",
    "gold",
    "green",
    "blue",
    "indigo",
    "purple",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// curve colours, assigned cyclically in plotting order
    pub palette: Vec<String>,
    pub default_variable: String,
    /// highest order of differentiation accepted on submit
    pub max_order: usize,
    pub board: BoardConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub container_id: String,
    /// left, top, right, bottom
    pub bounding_box: [f64; 4],
    pub axis: bool,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub loglevel: String,
    pub log_to_file: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            default_variable: "x".into(),
            max_order: 20,
            board: BoardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            container_id: "graph".into(),
            bounding_box: [-5.0, 5.0, 5.0, -5.0],
            axis: true,
            samples: 400,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".into(),
            log_to_file: false,
        }
    }
}

impl CalculatorConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let config: CalculatorConfig =
            toml::from_str(text).map_err(|e| CalcError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CalcResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.palette.is_empty() {
            return Err(CalcError::Config("palette must not be empty".into()));
        }
        if let Some(bad) = self.palette.iter().find(|c| parse_color(c).is_none()) {
            return Err(CalcError::Config(format!("unknown colour '{}'", bad)));
        }
        if !is_valid_variable(&self.default_variable) || is_reserved_constant(&self.default_variable) {
            return Err(CalcError::Config(format!(
                "'{}' cannot be the default variable",
                self.default_variable
            )));
        }
        if self.max_order == 0 {
            return Err(CalcError::Config("max_order must be at least 1".into()));
        }
        let [left, top, right, bottom] = self.board.bounding_box;
        if !(left < right && bottom < top) {
            return Err(CalcError::Config(format!(
                "bounding_box {:?} must satisfy left < right and bottom < top",
                self.board.bounding_box
            )));
        }
        if self.board.samples < 2 {
            return Err(CalcError::Config("samples must be at least 2".into()));
        }
        parse_level(&self.logging.loglevel)?;
        Ok(())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let [left, top, right, bottom] = self.board.bounding_box;
        BoundingBox::new(left, top, right, bottom)
    }

    pub fn board_options(&self) -> BoardOptions {
        BoardOptions {
            bounding_box: self.bounding_box(),
            axis: self.board.axis,
            samples: self.board.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::default();
        assert_eq!(config.palette.len(), 8);
        assert_eq!(config.palette[1], "crimson");
        assert_eq!(config.default_variable, "x");
        assert_eq!(config.board.container_id, "graph");
        assert_eq!(config.bounding_box(), BoundingBox::new(-5.0, 5.0, 5.0, -5.0));
        assert!(config.board.axis);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = CalculatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CalculatorConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let text = r##"
            palette = ["blue", "#ff8800"]
            max_order = 5

            [board]
            bounding_box = [-10.0, 2.0, 10.0, -2.0]
            axis = false

            [logging]
            loglevel = "debug"
        "##;
        let config = CalculatorConfig::from_toml_str(text).unwrap();
        assert_eq!(config.palette, vec!["blue".to_string(), "#ff8800".to_string()]);
        assert_eq!(config.max_order, 5);
        assert_eq!(config.default_variable, "x");
        assert_eq!(config.board.samples, 400);
        assert_eq!(config.board.container_id, "graph");
        let options = config.board_options();
        assert_eq!(options.bounding_box, BoundingBox::new(-10.0, 2.0, 10.0, -2.0));
        assert!(!options.axis);
        assert_eq!(config.logging.loglevel, "debug");
        assert!(!config.logging.log_to_file);
    }

    #[test]
    fn test_hex_colour_with_file_logging() {
        let text = r##"
            palette = ["navy", "crimson", "#2e8b57"]
            default_variable = "t"
            [board]
            bounding_box = [-10.0, 3.0, 10.0, -3.0]
            samples = 200
            [logging]
            loglevel = "debug"
            log_to_file = true
        "##;
        let config = CalculatorConfig::from_toml_str(text).unwrap();
        assert_eq!(config.palette[2], "#2e8b57");
        assert_eq!(config.default_variable, "t");
        assert_eq!(config.board.samples, 200);
        assert!(config.logging.log_to_file);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            "palette = []",
            "palette = [\"not-a-colour\"]",
            "default_variable = \"pi\"",
            "default_variable = \"2x\"",
            "max_order = 0",
            "[board]\nbounding_box = [5.0, 5.0, -5.0, -5.0]",
            "[board]\nsamples = 1",
            "[logging]\nloglevel = \"chatty\"",
            "max_order = \"ten\"",
        ];
        for text in cases {
            assert!(
                matches!(CalculatorConfig::from_toml_str(text), Err(CalcError::Config(_))),
                "accepted: {}",
                text
            );
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.toml");
        std::fs::write(&path, "default_variable = \"t\"\n").unwrap();
        let config = CalculatorConfig::from_file(&path).unwrap();
        assert_eq!(config.default_variable, "t");
        let missing = dir.path().join("missing.toml");
        assert!(matches!(CalculatorConfig::from_file(&missing), Err(CalcError::Io(_))));
    }
}
