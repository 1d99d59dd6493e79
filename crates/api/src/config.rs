//! API process configuration (environment variables).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use smartair_infra::config::{AlertConfig, ConfigError, parse_or};

pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000);
pub const DEFAULT_CHATBASE_URL: &str = "https://www.chatbase.co/chatbot-iframe/eMCzsWfY19R61-GpXi8LY";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Seed for the synthetic training data; `None` means entropy.
    pub seed: Option<u64>,
    pub chatbase_url: String,
    pub alerts: AlertConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = match lookup("SMARTAIR_SEED").filter(|s| !s.trim().is_empty()) {
            None => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid("SMARTAIR_SEED", &raw, e.to_string()))?,
            ),
        };

        Ok(Self {
            bind_addr: parse_or(&lookup, "SMARTAIR_BIND_ADDR", DEFAULT_BIND_ADDR)?,
            seed,
            chatbase_url: lookup("CHATBASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHATBASE_URL.to_string()),
            alerts: AlertConfig::from_lookup(&lookup)?,
        })
    }
}
