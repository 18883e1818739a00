//! Per-connection message throttling
//!
//! Two rules apply in order: a short cooldown between consecutive
//! messages, then a cap on messages inside a trailing window.

use std::collections::{HashMap, VecDeque};

use crate::error::RateLimitError;
use crate::types::{ConnectionId, Millis};

/// Rate limiting configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Minimum gap between two accepted messages
    pub cooldown_ms: Millis,
    /// Length of the sliding window
    pub window_ms: Millis,
    /// Accepted messages allowed inside one window
    pub max_per_window: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 500,
            window_ms: 10_000,
            max_per_window: 5,
        }
    }
}

/// Throttle state for one connection
#[derive(Debug, Default)]
struct RateLimitState {
    /// Time of the last accepted message
    last_message_at: Option<Millis>,
    /// Accepted messages still inside the window, oldest first
    recent: VecDeque<Millis>,
}

impl RateLimitState {
    fn try_record(&mut self, now: Millis, config: &RateLimitConfig) -> Result<(), RateLimitError> {
        if let Some(last) = self.last_message_at {
            if now.saturating_sub(last) < config.cooldown_ms {
                return Err(RateLimitError::Cooldown);
            }
        }

        while let Some(&oldest) = self.recent.front() {
            if now.saturating_sub(oldest) < config.window_ms {
                break;
            }
            self.recent.pop_front();
        }

        if self.recent.len() >= config.max_per_window {
            return Err(RateLimitError::WindowExceeded);
        }

        self.recent.push_back(now);
        self.last_message_at = Some(now);
        Ok(())
    }
}

/// Rate limiter keyed by connection
///
/// Owned by the hub, so access is already serialized; check and record
/// happen in one call.
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: HashMap<ConnectionId, RateLimitState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    /// Check whether `id` may send at `now`, recording the message if so
    pub fn check_and_record(&mut self, id: ConnectionId, now: Millis) -> Result<(), RateLimitError> {
        let config = self.config;
        self.entries
            .entry(id)
            .or_default()
            .try_record(now, &config)
    }

    /// Drop all state held for a connection
    pub fn remove(&mut self, id: ConnectionId) {
        self.entries.remove(&id);
    }

    /// Number of connections with throttle state
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Millis = 1_700_000_000_000;

    #[test]
    fn test_first_message_allowed() {
        let mut limiter = RateLimiter::default();
        assert_eq!(limiter.check_and_record(ConnectionId::new(), START), Ok(()));
    }

    #[test]
    fn test_cooldown_rejects_fast_second_message() {
        let mut limiter = RateLimiter::default();
        let id = ConnectionId::new();

        assert!(limiter.check_and_record(id, START).is_ok());
        assert_eq!(
            limiter.check_and_record(id, START + 100),
            Err(RateLimitError::Cooldown)
        );
        assert_eq!(limiter.check_and_record(id, START + 500), Ok(()));
    }

    #[test]
    fn test_rejected_message_not_recorded() {
        let mut limiter = RateLimiter::default();
        let id = ConnectionId::new();

        assert!(limiter.check_and_record(id, START).is_ok());
        assert!(limiter.check_and_record(id, START + 499).is_err());
        // Cooldown still measured from the accepted message
        assert!(limiter.check_and_record(id, START + 500).is_ok());
    }

    #[test]
    fn test_window_caps_messages() {
        let mut limiter = RateLimiter::default();
        let id = ConnectionId::new();

        for i in 0..5 {
            assert_eq!(limiter.check_and_record(id, START + i * 600), Ok(()));
        }
        assert_eq!(
            limiter.check_and_record(id, START + 5 * 600),
            Err(RateLimitError::WindowExceeded)
        );
    }

    #[test]
    fn test_window_slides() {
        let mut limiter = RateLimiter::default();
        let id = ConnectionId::new();

        for i in 0..5 {
            assert!(limiter.check_and_record(id, START + i * 1_000).is_ok());
        }
        assert!(limiter.check_and_record(id, START + 9_999).is_err());
        // First entry falls out exactly one window later
        assert!(limiter.check_and_record(id, START + 10_000).is_ok());
    }

    #[test]
    fn test_connections_are_independent() {
        let mut limiter = RateLimiter::default();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert!(limiter.check_and_record(a, START).is_ok());
        assert!(limiter.check_and_record(b, START + 10).is_ok());
        assert_eq!(limiter.tracked(), 2);
    }

    #[test]
    fn test_remove_discards_state() {
        let mut limiter = RateLimiter::default();
        let id = ConnectionId::new();

        assert!(limiter.check_and_record(id, START).is_ok());
        limiter.remove(id);
        assert_eq!(limiter.tracked(), 0);
        assert!(limiter.check_and_record(id, START + 1).is_ok());
    }

    #[test]
    fn test_custom_config() {
        let mut limiter = RateLimiter::new(RateLimitConfig {
            cooldown_ms: 0,
            window_ms: 1_000,
            max_per_window: 2,
        });
        let id = ConnectionId::new();

        assert!(limiter.check_and_record(id, START).is_ok());
        assert!(limiter.check_and_record(id, START).is_ok());
        assert_eq!(
            limiter.check_and_record(id, START),
            Err(RateLimitError::WindowExceeded)
        );
    }
}
