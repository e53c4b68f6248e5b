use std::env;

use volley_shared::config::GameConfig;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Capacity of the fan-out channel each connection subscribes to
    pub broadcast_capacity: usize,
    /// Capacity of the command queue feeding the relay task
    pub command_capacity: usize,
    /// Gameplay tuning handed to every client on connect
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            broadcast_capacity: 256,
            command_capacity: 256,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// `PORT` wins over `VOLLEY_LISTEN_ADDR` so hosting platforms that inject a
    /// port work without extra setup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            let port: u16 = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
            config.listen_addr = format!("0.0.0.0:{port}");
        } else if let Ok(addr) = env::var("VOLLEY_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(raw) = env::var("VOLLEY_BROADCAST_CAPACITY") {
            config.broadcast_capacity = raw.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "VOLLEY_BROADCAST_CAPACITY",
                value: raw,
            })?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("listen_addr {} is not a socket address", self.listen_addr));
        }
        if self.broadcast_capacity == 0 {
            return Err("broadcast_capacity must be > 0".to_string());
        }
        if self.command_capacity == 0 {
            return Err("command_capacity must be > 0".to_string());
        }
        self.game.validate()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),

    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn unparseable_listen_addr_invalid() {
        let config = ServerConfig {
            listen_addr: "localhost".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_broadcast_capacity_invalid() {
        let config = ServerConfig {
            broadcast_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_game_config_propagates() {
        let mut config = ServerConfig::default();
        config.game.player_speed = 0.0;
        assert!(config.validate().is_err());
    }
}
