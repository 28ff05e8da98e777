//! Command-line arguments and runtime configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults,
//! 2. the TOML file (`--config PATH`, or `<config dir>/headlines/config.toml`
//!    when it exists),
//! 3. the `NEWSAPI_KEY` environment variable,
//! 4. command-line flags.
//!
//! The API key has no default.  It must come from the file, the environment
//! or the command line.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_TIMEOUT_SECS: u64 = 7;
pub const DEFAULT_THUMBNAIL_TIMEOUT_SECS: u64 = 5;

#[derive(Parser, Debug, Default)]
#[command(name = "headlines", version, about = "Top news headlines in your terminal")]
pub struct Cli {
    #[arg(long, value_name = "PATH", help = "Config file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "NEWSAPI_KEY",
        hide_env_values = true,
        help = "NewsAPI key (prefer the NEWSAPI_KEY variable)"
    )]
    pub api_key: Option<String>,

    #[arg(long, value_name = "CC", help = "Two-letter country code")]
    pub country: Option<String>,

    #[arg(long, value_name = "URL", help = "API base URL")]
    pub base_url: Option<String>,

    #[arg(long, value_name = "SECS", help = "Headline fetch timeout")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "PATH", help = "Where to write the log")]
    pub log_file: Option<PathBuf>,
}

/// Contents of the optional config file.  Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    country: Option<String>,
    timeout_secs: Option<u64>,
    thumbnail_timeout_secs: Option<u64>,
    log_file: Option<PathBuf>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// A NewsAPI key.  `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    pub base_url: String,
    pub country: String,
    /// Bound on one headline fetch, connect through body.
    pub timeout: Duration,
    pub thumbnail_timeout: Duration,
    /// `None` means the default location under the cache directory.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration for this run.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::resolve(cli, file)
    }

    fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let api_key = cli
            .api_key
            .clone()
            .or(file.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let Some(api_key) = api_key else {
            bail!(
                "no NewsAPI key configured: set NEWSAPI_KEY, pass --api-key, \
                 or add api_key to the config file"
            );
        };

        let country = cli
            .country
            .clone()
            .or(file.country)
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
            .to_lowercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("country must be a two-letter code, got {country:?}");
        }

        let timeout_secs = cli
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let thumbnail_timeout_secs = file
            .thumbnail_timeout_secs
            .unwrap_or(DEFAULT_THUMBNAIL_TIMEOUT_SECS);
        if timeout_secs == 0 || thumbnail_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }

        Ok(Self {
            api_key: ApiKey(api_key),
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            country,
            timeout: Duration::from_secs(timeout_secs),
            thumbnail_timeout: Duration::from_secs(thumbnail_timeout_secs),
            log_file: cli.log_file.clone().or(file.log_file),
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(api_key: &str) -> Self {
        Self {
            api_key: ApiKey(api_key.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            thumbnail_timeout: Duration::from_secs(DEFAULT_THUMBNAIL_TIMEOUT_SECS),
            log_file: None,
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("headlines").join("config.toml"))
}
