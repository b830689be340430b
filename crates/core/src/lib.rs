//! Fairweather Core Library
//!
//! Shared utilities for the Fairweather server:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Common constants

mod config;
pub mod fs;

pub use config::{
    find_config_file, get_xdg_cache_dir, get_xdg_data_dir, load_config, ConfigSource,
};
pub use fs::{create_dir_all, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "fairweather";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 9610;

/// Default number of historical years analysed per request
pub const DEFAULT_LOOKBACK_YEARS: u8 = 5;
