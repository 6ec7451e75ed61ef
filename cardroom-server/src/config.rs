//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Complete server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP/WebSocket bind address.
    pub bind: SocketAddr,
    /// Prometheus exporter bind address.
    pub metrics_bind: SocketAddr,
    /// How long an empty room survives before the actor self-closes (spec §4.2).
    pub room_empty_ttl: Duration,
    /// Grace period a disconnected player has to reconnect before forfeiting their seat (spec §4.3).
    pub reconnect_timeout: Duration,
    /// Cooldown a rejected join-request applicant must wait before retrying (spec §4.4).
    pub join_request_cooldown: Duration,
    /// Attempts an applicant gets before a room-join request is permanently refused (spec §4.4).
    pub join_request_max_attempts: u8,
    /// Extra time added to a game's per-turn limit before the timeout auto-action fires (spec §4.9).
    pub turn_timer_grace: Duration,
    /// Relaxes reconnect/room-code checks useful for local development (from `NODE_ENV=dev`).
    pub dev_mode: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns an error if a supplied value fails to parse.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| std::env::var("SERVER_BIND").ok().and_then(|s| s.parse().ok()))
            .unwrap_or_else(|| "127.0.0.1:6969".parse().expect("default bind address is valid"));

        let metrics_bind = metrics_bind_override
            .or_else(|| std::env::var("METRICS_BIND").ok().and_then(|s| s.parse().ok()))
            .unwrap_or_else(|| "127.0.0.1:9090".parse().expect("default metrics address is valid"));

        let room_empty_ttl = Duration::from_secs(parse_env_or("ROOM_EMPTY_TTL_SECONDS", 300));
        let reconnect_timeout = Duration::from_secs(parse_env_or("RECONNECT_TIMEOUT_SECONDS", 120));
        let join_request_cooldown = Duration::from_secs(parse_env_or("JOIN_REQUEST_COOLDOWN_SECONDS", 300));
        let join_request_max_attempts = parse_env_or("JOIN_REQUEST_MAX_ATTEMPTS", 3);
        let turn_timer_grace = Duration::from_secs(parse_env_or("TURN_TIMER_GRACE_SECONDS", 2));

        let dev_mode = std::env::var("NODE_ENV").map(|v| v == "dev").unwrap_or(false);

        Ok(ServerConfig {
            bind,
            metrics_bind,
            room_empty_ttl,
            reconnect_timeout,
            join_request_cooldown,
            join_request_max_attempts,
            turn_timer_grace,
            dev_mode,
        })
    }

    /// Validate configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is outside its sane operating range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_empty_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                var: "ROOM_EMPTY_TTL_SECONDS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.reconnect_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "RECONNECT_TIMEOUT_SECONDS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.join_request_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "JOIN_REQUEST_MAX_ATTEMPTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:6969".parse().unwrap(),
            metrics_bind: "127.0.0.1:9090".parse().unwrap(),
            room_empty_ttl: Duration::from_secs(300),
            reconnect_timeout: Duration::from_secs(120),
            join_request_cooldown: Duration::from_secs(300),
            join_request_max_attempts: 3,
            turn_timer_grace: Duration::from_secs(2),
            dev_mode: false,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "SERVER_BIND".to_string(),
            hint: "set SERVER_BIND=0.0.0.0:6969".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SERVER_BIND"));
        assert!(msg.contains("0.0.0.0:6969"));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_room_ttl() {
        let mut config = base_config();
        config.room_empty_ttl = Duration::from_secs(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_zero_join_attempts() {
        let mut config = base_config();
        config.join_request_max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
