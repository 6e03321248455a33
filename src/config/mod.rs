// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;
use crate::logger;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LogLevel, RunMode};

/// Default config file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Values taken from the bare process environment, applied over every other source
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    /// `PORT`
    pub port: Option<u16>,
    /// `API_MODE`, or `GIN_MODE` when that is unset
    pub mode: Option<RunMode>,
}

impl EnvOverrides {
    /// Read `PORT` and the mode flag from the process environment
    pub fn from_env() -> Result<Self, StartupError> {
        let api_mode = std::env::var("API_MODE").ok();
        let gin_mode = std::env::var("GIN_MODE").ok();
        Self::parse(
            std::env::var("PORT").ok().as_deref(),
            pick_mode(api_mode.as_deref(), gin_mode.as_deref()),
        )
    }

    /// Parse raw values; empty strings count as unset
    pub fn parse(port: Option<&str>, mode: Option<&str>) -> Result<Self, StartupError> {
        let port = match port.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(raw.parse::<u16>().map_err(|e| {
                StartupError::Config(config::ConfigError::Message(format!(
                    "invalid PORT '{raw}': {e}"
                )))
            })?),
            None => None,
        };

        let mode = match mode.map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Some(
                raw.parse::<RunMode>()
                    .map_err(|e| StartupError::Config(config::ConfigError::Message(e)))?,
            ),
            None => None,
        };

        Ok(Self { port, mode })
    }
}

/// `API_MODE` wins; `GIN_MODE` is used when `API_MODE` is unset or blank
fn pick_mode<'a>(api_mode: Option<&'a str>, gin_mode: Option<&'a str>) -> Option<&'a str> {
    api_mode.filter(|m| !m.trim().is_empty()).or(gin_mode)
}

/// Load `.env` into the process environment
///
/// Variables that are already set keep their values. A missing file is
/// not an error.
pub fn load_dotenv() {
    report_dotenv(dotenvy::dotenv().map(|_| ()));
}

fn report_dotenv(result: Result<(), dotenvy::Error>) -> bool {
    match result {
        Ok(()) => {
            logger::log_debug("Loaded environment from .env");
            true
        }
        Err(e) if e.not_found() => {
            logger::log_info("No .env file found");
            false
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to load .env file: {e}"));
            false
        }
    }
}

impl Config {
    /// Load configuration from `.env`, `CONFIG_PATH` (default "config") and the environment
    pub fn load() -> Result<Self, StartupError> {
        load_dotenv();
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path, &EnvOverrides::from_env()?)
    }

    /// Load configuration from specified file path (without extension)
    /// The file is optional; defaults cover every required key
    pub fn load_from(config_path: &str, overrides: &EnvOverrides) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .set_default("mode", RunMode::default().as_str())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "danaverse-api")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("mode", overrides.mode.map(RunMode::as_str))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse().map_err(|_| StartupError::InvalidAddress(raw))
    }
}
