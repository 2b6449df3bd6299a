//! Logging setup and saving of sampled curves.
//!
//! Library code logs through the `log` macros only. A front end calls
//! [`init_logger`] once to route records to the terminal and, optionally, to a
//! timestamped file.
use crate::errors::{CalcError, CalcResult};
use chrono::Local;
use csv::Writer;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Maps a level name to a filter.
pub fn parse_level(level: &str) -> CalcResult<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" => Ok(LevelFilter::Off),
        other => Err(CalcError::Config(format!(
            "loglevel must be trace, debug, info, warn, error or off, got '{}'",
            other
        ))),
    }
}

/// Name of the log file for a session started now.
pub fn log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the terminal logger and, when `log_to_file` is set, a file logger
/// in `dir`. Returns the path of the log file if one was created.
///
/// Fails with [`CalcError::Logger`] if a global logger is already installed.
pub fn init_logger(level: &str, log_to_file: bool, dir: &Path) -> CalcResult<Option<PathBuf>> {
    let log_option = parse_level(level)?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut file_path = None;
    if log_to_file {
        let path = dir.join(log_file_name());
        loggers.push(WriteLogger::new(
            log_option,
            Config::default(),
            File::create(&path)?,
        ));
        file_path = Some(path);
    }
    CombinedLogger::init(loggers).map_err(|e| CalcError::Logger(e.to_string()))?;
    log::info!("logger started at level {}", log_option);
    Ok(file_path)
}

/// Saves curves sampled on a common grid: first column is the argument, then one
/// column per curve. Points where a curve has no real value are left empty.
pub fn save_curves_to_csv(
    arg: &str,
    x_mesh: &[f64],
    headers: &[String],
    columns: &[Vec<Option<f64>>],
    filename: &Path,
) -> CalcResult<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    let mut headers_with_x = Vec::with_capacity(headers.len() + 1);
    headers_with_x.push(arg.to_string());
    headers_with_x.extend(headers.iter().cloned());
    writer.write_record(&headers_with_x)?;

    for (i, x) in x_mesh.iter().enumerate() {
        let mut row_data = Vec::with_capacity(columns.len() + 1);
        row_data.push(x.to_string());
        row_data.extend(columns.iter().map(|column| match column.get(i) {
            Some(Some(value)) => value.to_string(),
            _ => String::new(),
        }));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("error").unwrap(), LevelFilter::Error);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_level("loud"), Err(CalcError::Config(_))));
    }

    #[test]
    fn test_log_file_name() {
        let name = log_file_name();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_save_curves_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.csv");
        let x_mesh = vec![0.0, 1.0];
        let headers = vec!["f(x)".to_string(), "f'(x)".to_string()];
        let columns = vec![vec![Some(0.0), Some(1.0)], vec![Some(2.0), None]];
        save_curves_to_csv("x", &x_mesh, &headers, &columns, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["x,f(x),f'(x)", "0,0,2", "1,1,"]);
    }
}
