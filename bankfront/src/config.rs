use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://0.0.0.0:8080";

const ENV_BACKEND_URL: &str = "BANKFRONT_BACKEND_URL";
const ENV_PROTECT_ACCOUNTS: &str = "BANKFRONT_PROTECT_ACCOUNTS";
const ENV_COOKIE_SECURE: &str = "BANKFRONT_COOKIE_SECURE";
const ENV_COOKIE_HTTP_ONLY: &str = "BANKFRONT_COOKIE_HTTP_ONLY";

#[derive(Debug, Default, Parser)]
#[command(
    name = "bankfront",
    version,
    about = "Web frontend for the accounts service with cookie sessions"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Timeout for calls to the accounts service, e.g. `30s`. Unset waits forever.
    #[arg(long, value_name = "DURATION")]
    pub backend_timeout: Option<String>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub backend_url: Url,
    pub backend_timeout: Option<Duration>,
    pub protect_accounts: bool,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid boolean value for env var {key}: {value}")]
    InvalidEnvBool { key: String, value: String },
    #[error("env var {key} is not valid unicode")]
    InvalidEnvString { key: String },
    #[error("invalid backend url {value}: {reason}")]
    InvalidBackendUrl { value: String, reason: String },
    #[error("invalid backend timeout {value}: {source}")]
    InvalidTimeout {
        value: String,
        source: humantime::DurationError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind: Option<SocketAddr>,
    backend_url: Option<String>,
    backend_timeout: Option<String>,
    protect_accounts: Option<bool>,
    cookie_secure: Option<bool>,
    cookie_http_only: Option<bool>,
}

#[derive(Debug, Default)]
struct EnvConfig {
    backend_url: Option<String>,
    protect_accounts: Option<bool>,
    cookie_secure: Option<bool>,
    cookie_http_only: Option<bool>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;
        let from_env = read_env_config()?;
        Self::merge(cli, from_file, from_env)
    }

    /// CLI wins over environment, environment over the config file.
    fn merge(cli: Cli, file: FileConfig, env: EnvConfig) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .or(file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5173)));
        let raw_url = cli
            .backend_url
            .or(env.backend_url)
            .or(file.backend_url)
            .unwrap_or_else(|| String::from(DEFAULT_BACKEND_URL));
        let backend_url = parse_backend_url(&raw_url)?;
        let backend_timeout = cli
            .backend_timeout
            .or(file.backend_timeout)
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self {
            bind,
            backend_url,
            backend_timeout,
            protect_accounts: env
                .protect_accounts
                .or(file.protect_accounts)
                .unwrap_or(false),
            cookie_secure: env.cookie_secure.or(file.cookie_secure).unwrap_or(false),
            cookie_http_only: env
                .cookie_http_only
                .or(file.cookie_http_only)
                .unwrap_or(false),
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env_config() -> Result<EnvConfig, ConfigError> {
    Ok(EnvConfig {
        backend_url: read_env_string(ENV_BACKEND_URL)?,
        protect_accounts: read_env_bool(ENV_PROTECT_ACCOUNTS)?,
        cookie_secure: read_env_bool(ENV_COOKIE_SECURE)?,
        cookie_http_only: read_env_bool(ENV_COOKIE_HTTP_ONLY)?,
    })
}

fn read_env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvString {
            key: String::from(key),
        }),
    }
}

fn read_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => parse_bool_value(key, &value).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from("<non-unicode>"),
        }),
    }
}

fn parse_bool_value(key: &str, raw: &str) -> Result<bool, ConfigError> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from(raw),
        }),
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidBackendUrl {
        value: String::from(raw),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBackendUrl {
            value: String::from(raw),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|source| ConfigError::InvalidTimeout {
        value: String::from(raw),
        source,
    })
}
