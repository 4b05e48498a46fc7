use clap::Parser;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::rate_limit::Limits;

pub const DEFAULT_CONFIG_PATH: &str = "configs/config.toml";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "anti-bruteforce")]
#[command(about = "Admission service rate limiting login attempts by login, password and ip")]
pub struct Args {
    // Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    // Override the port from the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    // Override the log level from the config file
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub limiter: Limits,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoggerConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    // Extra files for events below error, next to stdout
    #[serde(default)]
    pub out: Vec<PathBuf>,
    // Extra files for error events, next to stderr
    #[serde(default)]
    pub out_err: Vec<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            out: Vec::new(),
            out_err: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StoreConfig {
    // Deadline for every store call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    // How often idle buckets are evicted
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_sweep_interval_secs() -> u64 {
    30
}

// Settings the admin CLI needs: only where the service listens
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    // Command line overrides win over the file
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(level) = &args.log_level {
            self.logger.level = level.clone();
        }
    }
}

fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&contents, path)
}

fn parse_toml<T: DeserializeOwned>(contents: &str, path: &Path) -> Result<T, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
