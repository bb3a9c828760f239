//! Runtime configuration.
//!
//! Each setting resolves in priority order:
//! 1. Command-line flag
//! 2. Environment variable
//! 3. TOML config file (`<config dir>/onimix-dashboard/config.toml` unless
//!    `--config` points elsewhere)
//! 4. Compiled default

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "onimix-dashboard.log";

/// Command-line arguments. Every flag can also come from the environment.
#[derive(Parser, Debug, Default)]
#[command(name = "onimix-dashboard")]
#[command(about = "Terminal dashboard for ONIMIX verses, store and analytics")]
#[command(version)]
pub struct Cli {
    /// Base URL of the ONIMIX backend (the `/api` prefix is added)
    #[arg(long, env = "ONIMIX_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "ONIMIX_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Config file to read instead of the default location
    #[arg(long, env = "ONIMIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where diagnostics are written
    #[arg(long, env = "ONIMIX_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Directory that receives exported verses
    #[arg(long, env = "ONIMIX_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Optional keys accepted in `config.toml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub timeout: Duration,
    pub log_file: PathBuf,
    pub export_dir: PathBuf,
    /// Config file that was read, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Resolve settings from the CLI, the environment (through clap), and the
    /// config file. A missing default config file is not an error; a missing
    /// `--config` file is.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("", "", "onimix-dashboard");

        let (file, source) = match &cli.config {
            Some(path) => (FileConfig::read(path)?, Some(path.clone())),
            None => {
                let default = dirs
                    .as_ref()
                    .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
                    .filter(|path| path.is_file());
                match default {
                    Some(path) => (FileConfig::read(&path)?, Some(path)),
                    None => (FileConfig::default(), None),
                }
            }
        };

        let defaults = Defaults::discover(dirs.as_ref());
        let mut config = Self::merge(cli, file, defaults);
        config.source = source;
        Ok(config)
    }

    fn merge(cli: &Cli, file: FileConfig, defaults: Defaults) -> Self {
        let backend_url = cli
            .backend_url
            .clone()
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);

        Self {
            backend_url,
            timeout: Duration::from_secs(timeout_secs),
            log_file: cli
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or(defaults.log_file),
            export_dir: cli
                .export_dir
                .clone()
                .or(file.export_dir)
                .unwrap_or(defaults.export_dir),
            source: None,
        }
    }
}

/// Platform paths used when nothing else is configured.
struct Defaults {
    log_file: PathBuf,
    export_dir: PathBuf,
}

impl Defaults {
    fn discover(dirs: Option<&ProjectDirs>) -> Self {
        let log_file = dirs
            .map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
        let export_dir = UserDirs::new()
            .and_then(|user| user.download_dir().map(Path::to_path_buf))
            .or_else(|| dirs.map(|dirs| dirs.data_dir().join("exports")))
            .unwrap_or_else(|| PathBuf::from("exports"));
        Self {
            log_file,
            export_dir,
        }
    }
}
