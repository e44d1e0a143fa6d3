//! Configuration types.
//!
//! Everything is read once at startup from the process environment (after
//! `.env` is loaded) and passed by reference into the poller.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_TIME_SECS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where notifications go.
#[derive(Debug, Clone)]
pub struct TelegramTarget {
    pub bot_token: SecretString,
    pub chat_id: String,
}

/// The three required secrets.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub practicum_token: SecretString,
    pub telegram: TelegramTarget,
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub credentials: Credentials,
    /// Status endpoint polled every cycle.
    pub endpoint: String,
    /// Telegram Bot API base URL.
    pub telegram_api_url: String,
    /// Sleep between poll cycles, success or failure.
    pub poll_interval: Duration,
    /// Per-request timeout for both the status API and Telegram.
    pub request_timeout: Duration,
}

impl BotConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let practicum_token = required(&lookup, "PRACTICUM_TOKEN")?;
        let telegram_token = required(&lookup, "TELEGRAM_TOKEN")?;
        let chat_id = required(&lookup, "TELEGRAM_CHAT_ID")?;

        let endpoint = non_empty(&lookup, "PRACTICUM_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let telegram_api_url = non_empty(&lookup, "TELEGRAM_API_URL")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());

        let poll_interval = seconds(&lookup, "RETRY_TIME_SECS", DEFAULT_RETRY_TIME_SECS)?;
        let request_timeout =
            seconds(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            credentials: Credentials {
                practicum_token: SecretString::from(practicum_token),
                telegram: TelegramTarget {
                    bot_token: SecretString::from(telegram_token),
                    chat_id,
                },
            },
            endpoint,
            telegram_api_url,
            poll_interval,
            request_timeout,
        })
    }
}

/// Whatever Telegram settings are present, even when the full config is not.
///
/// Used to report a startup failure before halting.
pub fn partial_telegram_target<F>(lookup: F) -> Option<(TelegramTarget, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let bot_token = non_empty(&lookup, "TELEGRAM_TOKEN")?;
    let chat_id = non_empty(&lookup, "TELEGRAM_CHAT_ID")?;
    let api_url = non_empty(&lookup, "TELEGRAM_API_URL")
        .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());
    Some((
        TelegramTarget {
            bot_token: SecretString::from(bot_token),
            chat_id,
        },
        api_url,
    ))
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, key) else {
        return Ok(Duration::from_secs(default));
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        Ok(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "должно быть больше нуля".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?} не является целым числом ({e})"),
        }),
    }
}
