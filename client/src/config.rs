use std::env;
use std::time::Duration;

use url::Url;

use volley_shared::protocol::GotchiProfile;

use crate::motion::ContactPolicy;

const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8080/ws";

/// Headless client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub ws_url: String,
    pub player_name: String,
    pub token_id: String,
    /// Seed for the bot's own decisions, not the shared ball seed
    pub bot_seed: u64,
    pub tick: Duration,
    pub contact_policy: ContactPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            player_name: "Bot".to_string(),
            token_id: "0".to_string(),
            bot_seed: 1,
            tick: Duration::from_millis(16),
            contact_policy: ContactPolicy::OwnBodyOnly,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = env::var("VOLLEY_WS_URL") {
            config.ws_url = url;
        }
        if let Ok(name) = env::var("VOLLEY_PLAYER_NAME") {
            config.player_name = name;
        }
        if let Ok(token) = env::var("VOLLEY_TOKEN_ID") {
            config.token_id = token;
        }
        if let Ok(raw) = env::var("VOLLEY_SEED") {
            config.bot_seed = raw.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "VOLLEY_SEED",
                value: raw,
            })?;
        }
        if let Ok(raw) = env::var("VOLLEY_CONTACT_POLICY") {
            config.contact_policy = match raw.as_str() {
                "own" => ContactPolicy::OwnBodyOnly,
                "any" => ContactPolicy::AnyContact,
                _ => return Err(ConfigError::InvalidContactPolicy(raw)),
            };
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.ws_url).map_err(|e| format!("ws_url: {e}"))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(format!("ws_url must use ws or wss, got {}", url.scheme()));
        }
        if self.player_name.trim().is_empty() {
            return Err("player_name must not be empty".to_string());
        }
        if self.tick.is_zero() {
            return Err("tick must be > 0".to_string());
        }
        Ok(())
    }

    pub fn profile(&self) -> GotchiProfile {
        GotchiProfile {
            name: self.player_name.clone(),
            token_id: self.token_id.clone(),
            haunt_id: "1".to_string(),
            collateral_address: String::new(),
            numeric_traits: [50; 6],
            equipped_wearables: [0; 16],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("VOLLEY_CONTACT_POLICY must be \"own\" or \"any\", got {0:?}")]
    InvalidContactPolicy(String),
}
