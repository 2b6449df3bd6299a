//! different utility modules used throughout the project
/// calculator settings read from a TOML file
pub mod config;
/// logger setup and saving of sampled curves into csv
pub mod logger;
/// plot surface: sampled curves, svg/png rendering with plotters
pub mod plots;
