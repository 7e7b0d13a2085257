use std::env;
use std::time::Duration;

use log::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;

/// Node settings read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single peer chain fetch.
    pub peer_timeout: Duration,
    /// Peers registered at startup (`PEERS`, comma separated).
    pub peers: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT);
        let timeout_secs = parse_or(
            "PEER_TIMEOUT_SECS",
            get("PEER_TIMEOUT_SECS"),
            DEFAULT_PEER_TIMEOUT_SECS,
        );
        let peers = get("PEERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host,
            port,
            peer_timeout: Duration::from_secs(timeout_secs.max(1)),
            peers,
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={v:?} is not valid, using {default}");
            default
        }),
    }
}
