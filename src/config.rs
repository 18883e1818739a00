//! Server configuration
//!
//! Read from environment variables at startup; the first command line
//! argument, when present, overrides the bind address.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::rate_limit::RateLimitConfig;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Channel buffer size for server commands
const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Per-connection outbound queue size
const DEFAULT_OUTBOX_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub command_buffer: usize,
    pub outbox_buffer: usize,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
            outbox_buffer: DEFAULT_OUTBOX_BUFFER,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment and command line
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if let Some(addr) = std::env::args().nth(1) {
            config.bind_addr = addr;
        }
        Ok(config)
    }

    /// Build a config from any key lookup
    ///
    /// `CHAT_ADDR` wins over `PORT`, which binds all interfaces.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match (lookup("CHAT_ADDR"), lookup("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => {
                let port: u16 = parse("PORT", &port)?;
                format!("0.0.0.0:{port}")
            }
            (None, None) => defaults.bind_addr,
        };

        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            lookup(key).map_or(Ok(default), |v| parse(key, &v))
        };

        let command_buffer = number("CHAT_COMMAND_BUFFER", defaults.command_buffer as u64)?;
        let outbox_buffer = number("CHAT_OUTBOX_BUFFER", defaults.outbox_buffer as u64)?;
        let rate_limit = RateLimitConfig {
            cooldown_ms: number("CHAT_COOLDOWN_MS", defaults.rate_limit.cooldown_ms)?,
            window_ms: number("CHAT_WINDOW_MS", defaults.rate_limit.window_ms)?,
            max_per_window: number("CHAT_WINDOW_MAX", defaults.rate_limit.max_per_window as u64)?
                as usize,
        };

        // tokio panics on zero-capacity channels
        for (key, value) in [
            ("CHAT_COMMAND_BUFFER", command_buffer),
            ("CHAT_OUTBOX_BUFFER", outbox_buffer),
            ("CHAT_WINDOW_MAX", rate_limit.max_per_window as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { key });
            }
        }

        Ok(Self {
            bind_addr,
            command_buffer: command_buffer as usize,
            outbox_buffer: outbox_buffer as usize,
            rate_limit,
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.rate_limit.cooldown_ms, 500);
        assert_eq!(config.rate_limit.window_ms, 10_000);
        assert_eq!(config.rate_limit.max_per_window, 5);
    }

    #[test]
    fn test_port_binds_all_interfaces() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_chat_addr_wins_over_port() {
        let config =
            ServerConfig::from_lookup(lookup(&[("PORT", "8080"), ("CHAT_ADDR", "[::1]:9000")]))
                .unwrap();
        assert_eq!(config.bind_addr, "[::1]:9000");
    }

    #[test]
    fn test_rate_limit_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("CHAT_COOLDOWN_MS", "250"),
            ("CHAT_WINDOW_MS", "60000"),
            ("CHAT_WINDOW_MAX", " 20 "),
        ]))
        .unwrap();
        assert_eq!(
            config.rate_limit,
            RateLimitConfig {
                cooldown_ms: 250,
                window_ms: 60_000,
                max_per_window: 20,
            }
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: "PORT",
                value: "http".to_string()
            }
        );
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("CHAT_OUTBOX_BUFFER", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::Zero { key: "CHAT_OUTBOX_BUFFER" });
    }
}
