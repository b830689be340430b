use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use fairweather_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_LOOKBACK_YEARS, DEFAULT_SERVER_PORT,
};
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

pub use fairweather_core::create_dir_all;

use crate::assessment::RiskPolicy;

/// Create a folder, ignoring failures (startup re-checks on first use)
pub fn create_folder(root_path: &str) {
    let _ = create_dir_all(root_path);
}

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Fairweather - historical same-date weather analysis for event planning"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $FAIRWEATHER_CONFIG, ./fairweather.toml,
    /// $XDG_CONFIG_HOME/fairweather/fairweather.toml, /etc/fairweather/fairweather.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "FAIRWEATHER_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "FAIRWEATHER_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FAIRWEATHER_PORT")]
    pub port: Option<String>,

    /// Public URL for API responses and UI
    #[arg(short, long, env = "FAIRWEATHER_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Directory for the analysis database
    #[arg(long, env = "FAIRWEATHER_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Directory containing UI static files
    #[arg(short, long, env = "FAIRWEATHER_UI_DIR")]
    pub ui_dir: Option<String>,

    /// How many past calendar years each analysis looks back over
    #[arg(long, env = "FAIRWEATHER_LOOKBACK_YEARS")]
    pub lookback_years: Option<u8>,

    /// Hazard thresholds and category breakpoint; `[risk]` table in the
    /// config file only
    #[arg(skip)]
    #[serde(default)]
    pub risk: Option<RiskPolicy>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn data_dir(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| "./fairweather_data".to_string())
    }

    pub fn static_dir(&self) -> String {
        self.ui_dir
            .clone()
            .unwrap_or_else(|| "./static".to_string())
    }

    pub fn lookback_years(&self) -> usize {
        usize::from(self.lookback_years.unwrap_or(DEFAULT_LOOKBACK_YEARS)).max(1)
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        self.risk.unwrap_or_default()
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    // Determine config file path
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("FAIRWEATHER_CONFIG", "fairweather.toml")
    };

    // Log where we're loading config from
    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    // Load from config file
    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        domain: cli_args.domain.or(file_config.domain),
        port: cli_args.port.or(file_config.port),
        remote_url: cli_args.remote_url.or(file_config.remote_url),
        data_dir: cli_args.data_dir.or(file_config.data_dir),
        ui_dir: cli_args.ui_dir.or(file_config.ui_dir),
        lookback_years: cli_args.lookback_years.or(file_config.lookback_years),
        risk: cli_args.risk.or(file_config.risk),
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc().format(&Iso8601::DEFAULT).unwrap(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_is_configured() {
        let cli = Cli::default();
        assert_eq!(cli.host(), "127.0.0.1");
        assert_eq!(cli.port(), DEFAULT_SERVER_PORT.to_string());
        assert_eq!(cli.lookback_years(), usize::from(DEFAULT_LOOKBACK_YEARS));
        assert_eq!(cli.risk_policy(), RiskPolicy::default());
    }

    #[test]
    fn test_risk_policy_parses_from_toml() {
        let cli: Cli = toml::from_str(
            r#"
            host = "0.0.0.0"
            lookback_years = 7

            [risk]
            heat_threshold_f = 95.0
            moderate_cutoff = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(cli.host(), "0.0.0.0");
        assert_eq!(cli.lookback_years(), 7);
        let policy = cli.risk_policy();
        assert_eq!(policy.heat_threshold_f, 95.0);
        assert_eq!(policy.moderate_cutoff, 0.25);
        // Unset thresholds keep their defaults.
        assert_eq!(policy.wind_threshold_mph, RiskPolicy::default().wind_threshold_mph);
    }
}
