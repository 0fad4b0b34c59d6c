//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use raffle_session::application::engine::DrawTiming;

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://raffle.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STORE_PREFIX: &str = "secret-friend";

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `SQLite` connection string for the key-value store.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Namespace for persisted keys.
    pub store_prefix: String,
    /// Rolling animation timing.
    pub timing: DrawTiming,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, applying defaults for
    /// absent keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let store_prefix = lookup("RAFFLE_STORE_PREFIX")
            .filter(|prefix| !prefix.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PREFIX.to_owned());

        let defaults = DrawTiming::default();
        let tick_period = millis(&lookup, "RAFFLE_TICK_MS")?.unwrap_or(defaults.tick_period);
        let roll_duration = millis(&lookup, "RAFFLE_ROLL_MS")?.unwrap_or(defaults.roll_duration);
        if tick_period >= roll_duration {
            return Err(AppError::Config(format!(
                "RAFFLE_TICK_MS ({}) must be shorter than RAFFLE_ROLL_MS ({})",
                tick_period.as_millis(),
                roll_duration.as_millis()
            )));
        }

        Ok(Self {
            database_url,
            host,
            port,
            store_prefix,
            timing: DrawTiming {
                tick_period,
                roll_duration,
            },
        })
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a valid address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, AppError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::Config(format!("{key} must be positive"))),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(e) => Err(AppError::Config(format!("{key} must be a whole number of milliseconds: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store_prefix, "secret-friend");
        assert_eq!(config.timing, DrawTiming::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("RAFFLE_STORE_PREFIX", "office-party"),
            ("RAFFLE_TICK_MS", "50"),
            ("RAFFLE_ROLL_MS", "1000"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_prefix, "office-party");
        assert_eq!(config.timing.tick_period, Duration::from_millis(50));
        assert_eq!(config.timing.roll_duration, Duration::from_millis(1000));
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_zero_tick_is_rejected() {
        assert!(matches!(
            config_from(&[("RAFFLE_TICK_MS", "0")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_tick_not_shorter_than_roll_is_rejected() {
        assert!(matches!(
            config_from(&[("RAFFLE_TICK_MS", "500"), ("RAFFLE_ROLL_MS", "500")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_blank_prefix_falls_back_to_default() {
        let config = config_from(&[("RAFFLE_STORE_PREFIX", "  ")]).unwrap();

        assert_eq!(config.store_prefix, "secret-friend");
    }

    #[test]
    fn test_invalid_host_fails_socket_addr() {
        let config = config_from(&[("HOST", "not a host")]).unwrap();

        assert!(matches!(config.socket_addr(), Err(AppError::Config(_))));
    }
}
