//! This module resolves configuration and prepares logging and storage.
use crate::error::ConfigError;
use std::fs::OpenOptions;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const TABLE_ENV: &str = "LOGBOARD_TABLE";
pub const INGEST_URL_ENV: &str = "LOGBOARD_INGEST_URL";
pub const QUERY_URL_ENV: &str = "LOGBOARD_QUERY_URL";

const DEFAULT_FILTER: &str = "info,logboard=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Configures logging to stderr.
pub fn configure_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Configures logging to a file, for modes that own the terminal.
pub fn configure_file_logging(path: &str) -> anyhow::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Picks the flag value, falling back to the environment.
fn resolve(
    value: Option<&str>,
    env_value: Option<String>,
    name: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .map(str::to_string)
        .or(env_value)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { name, flag, env })
}

/// Resolves the table name from `--table` or `LOGBOARD_TABLE`.
pub fn resolve_table(flag_value: Option<&str>) -> Result<String, ConfigError> {
    resolve(
        flag_value,
        std::env::var(TABLE_ENV).ok(),
        "table name",
        "--table",
        TABLE_ENV,
    )
}

/// Resolves an endpoint URL from its flag or environment variable and checks
/// its scheme.
pub fn resolve_url(
    flag_value: Option<&str>,
    name: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    let url = resolve(flag_value, std::env::var(env).ok(), name, flag, env)?;
    check_url(name, &url)?;
    Ok(url)
}

fn check_url(name: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("'{}' must start with http:// or https://", url),
        })
    }
}

pub fn ingest_url(flag_value: Option<&str>) -> Result<String, ConfigError> {
    resolve_url(flag_value, "ingest endpoint URL", "--ingest-url", INGEST_URL_ENV)
}

pub fn query_url(flag_value: Option<&str>) -> Result<String, ConfigError> {
    resolve_url(flag_value, "query endpoint URL", "--query-url", QUERY_URL_ENV)
}

pub fn check_max_message_len(len: usize) -> Result<usize, ConfigError> {
    if len == 0 {
        return Err(ConfigError::Invalid {
            name: "max message length",
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(len)
}

/// Builds the listen address. `host` is a bare IPv4 or IPv6 address.
pub fn bind_addr(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let ip: IpAddr = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|e| ConfigError::Invalid {
            name: "bind address",
            reason: format!("'{}': {}", host, e),
        })?;
    Ok(SocketAddr::new(ip, port))
}

/// Opens the database in `data_dir`, creating the directory if needed.
pub fn open_db(data_dir: &str) -> anyhow::Result<sled::Db> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = format!("{}/db", data_dir);
    Ok(sled::open(&db_path)?)
}
