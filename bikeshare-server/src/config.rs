//! Server configuration from environment variables.
//!
//! | Variable                | Default                                  |
//! |-------------------------|------------------------------------------|
//! | `GBFS_BASE_URL`         | `https://gbfs.velobixi.com/gbfs/2-2/en`  |
//! | `REFRESH_INTERVAL_SECS` | `180`                                    |
//! | `FETCH_TIMEOUT_SECS`    | `30`                                     |
//! | `ALLOWED_ORIGINS`       | `*` (comma-separated list)               |
//! | `BIND_ADDR`             | `127.0.0.1`                              |
//! | `PORT`                  | `8000`                                   |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::gbfs::GbfsConfig;
use crate::refresh::DEFAULT_REFRESH_INTERVAL;

const DEFAULT_PORT: u16 = 8000;

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Origins allowed to make cross-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse a comma-separated origin list. `*` or an empty list means any.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let origins: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() || origins.contains(&"*") {
            return Ok(AllowedOrigins::Any);
        }

        origins
            .into_iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|e| ConfigError {
                    var: "ALLOWED_ORIGINS",
                    value: o.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AllowedOrigins::List)
    }
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Upstream feed location and fetch deadline
    pub gbfs: GbfsConfig,
    /// Time between the starts of refresh cycles
    pub refresh_interval: Duration,
    /// CORS origin policy
    pub allowed_origins: AllowedOrigins,
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut gbfs = match lookup("GBFS_BASE_URL") {
            Some(url) if !url.trim().is_empty() => GbfsConfig::new(url.trim()),
            _ => GbfsConfig::default(),
        };

        if let Some(secs) = parse_var::<u64>(&lookup, "FETCH_TIMEOUT_SECS")? {
            gbfs = gbfs.with_timeout(positive_secs("FETCH_TIMEOUT_SECS", secs)?);
        }

        let refresh_interval = match parse_var::<u64>(&lookup, "REFRESH_INTERVAL_SECS")? {
            Some(secs) => positive_secs("REFRESH_INTERVAL_SECS", secs)?,
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => AllowedOrigins::parse(&raw)?,
            None => AllowedOrigins::Any,
        };

        let bind_addr = parse_var::<IpAddr>(&lookup, "BIND_ADDR")?
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = parse_var::<u16>(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        Ok(Self {
            gbfs,
            refresh_interval,
            allowed_origins,
            bind_addr,
            port,
        })
    }

    /// The address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value.trim().parse().map(Some).map_err(|e: T::Err| ConfigError {
        var,
        value: value.clone(),
        reason: e.to_string(),
    })
}

fn positive_secs(var: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError {
            var,
            value: secs.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
