//! Server configuration from environment variables.
//!
//! Unset or unparseable values fall back to the defaults below.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::models::TournamentId;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_TOURNAMENT_NAME: &str = "Opening Tournament";

/// Everything the `web` binary needs to start.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding one JSON document per tournament.
    pub data_dir: PathBuf,
    /// Bound on waiting for the tournament lock.
    pub lock_timeout: Duration,
    /// Tournament seeded at startup and served by default.
    pub default_tournament_id: TournamentId,
    pub default_tournament_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            default_tournament_id: Uuid::nil(),
            default_tournament_name: DEFAULT_TOURNAMENT_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `DATA_DIR`, `LOCK_TIMEOUT_MS`, `DEFAULT_TOURNAMENT_ID`
    /// and `DEFAULT_TOURNAMENT_NAME` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let name = lookup("DEFAULT_TOURNAMENT_NAME")
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(defaults.default_tournament_name);
        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            data_dir: lookup("DATA_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            lock_timeout: Duration::from_millis(parse_or(
                &lookup,
                "LOCK_TIMEOUT_MS",
                DEFAULT_LOCK_TIMEOUT_MS,
            )),
            default_tournament_id: parse_or(
                &lookup,
                "DEFAULT_TOURNAMENT_ID",
                defaults.default_tournament_id,
            ),
            default_tournament_name: name,
        }
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]), ServerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let cfg = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATA_DIR", "/tmp/brackets"),
            ("LOCK_TIMEOUT_MS", "250"),
            ("DEFAULT_TOURNAMENT_ID", id_str.as_str()),
            ("DEFAULT_TOURNAMENT_NAME", " Spring Cup "),
        ]);
        assert_eq!(cfg.bind_addr(), ("127.0.0.1", 9000));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/brackets"));
        assert_eq!(cfg.lock_timeout, Duration::from_millis(250));
        assert_eq!(cfg.default_tournament_id, id);
        assert_eq!(cfg.default_tournament_name, "Spring Cup");
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = config_from(&[("PORT", "eighty"), ("LOCK_TIMEOUT_MS", "-1")]);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.lock_timeout, Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS));
    }
}
