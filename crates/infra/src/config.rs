//! Configuration loading and representation.
//!
//! Everything comes from environment variables. Loading goes through a lookup
//! function so tests can supply values without touching the process
//! environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "http://api.openweathermap.org";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SUBSCRIBERS_CSV: &str = "city_emails.csv";
pub const DEFAULT_ALERT_TIME: &str = "21:37";
pub const DEFAULT_ALERT_POLL_SECS: u64 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Air-quality provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirQualityConfig {
    /// Without a key every lookup fails over to the default index.
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Outbound mail relay settings (STARTTLS).
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: Option<String>,
    pub password: Option<String>,
}

impl core::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// When the standalone scheduler fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Local time of day.
    pub at: NaiveTime,
    pub poll_interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: NaiveTime::from_hms_opt(21, 37, 0).unwrap_or(NaiveTime::MIN),
            poll_interval: Duration::from_secs(DEFAULT_ALERT_POLL_SECS),
        }
    }
}

/// Everything the alert pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub subscribers_csv: PathBuf,
    pub air_quality: AirQualityConfig,
    pub smtp: SmtpConfig,
    pub schedule: ScheduleConfig,
}

impl AlertConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(lookup("OPENWEATHER_API_KEY"));
        if api_key.is_none() {
            warn!("OPENWEATHER_API_KEY not set; alerts will use the default AQI");
        }

        let sender = non_empty(lookup("SENDER_EMAIL"));
        let password = non_empty(lookup("SENDER_PASSWORD"));
        if sender.is_none() || password.is_none() {
            warn!("SENDER_EMAIL/SENDER_PASSWORD not set; alert emails cannot be sent");
        }

        let at_raw = lookup("ALERT_TIME").unwrap_or_else(|| DEFAULT_ALERT_TIME.to_string());
        let at = NaiveTime::parse_from_str(at_raw.trim(), "%H:%M")
            .map_err(|e| ConfigError::invalid("ALERT_TIME", &at_raw, e.to_string()))?;

        let poll_secs: u64 = parse_or(&lookup, "ALERT_POLL_SECS", DEFAULT_ALERT_POLL_SECS)?;
        if poll_secs == 0 {
            return Err(ConfigError::invalid("ALERT_POLL_SECS", "0", "must be positive"));
        }

        Ok(Self {
            subscribers_csv: lookup("SUBSCRIBERS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUBSCRIBERS_CSV)),
            air_quality: AirQualityConfig {
                api_key,
                base_url: lookup("OPENWEATHER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string()),
            },
            smtp: SmtpConfig {
                host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                sender,
                password,
            },
            schedule: ScheduleConfig {
                at,
                poll_interval: Duration::from_secs(poll_secs),
            },
        })
    }
}

/// Parse `key` with `FromStr`, falling back to `default` when unset.
pub fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, &raw, e.to_string())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
