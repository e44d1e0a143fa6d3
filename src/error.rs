//! Error types for the review bot.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Poll error: {0}")]
    Poll(#[from] PollError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Poller task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-related errors. Any of these halts the bot at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Отсутствует переменная окружения: {0}")]
    MissingEnvVar(String),

    #[error("Некорректное значение переменной окружения {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by a single poll cycle.
///
/// The `Display` text doubles as the diagnostic sent to the operator, so two
/// failures of the same kind with different details notify separately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("Эндпоинт недоступен: {reason}")]
    EndpointUnavailable { reason: String },

    #[error("Ответ API не является JSON: {0}")]
    MalformedPayload(String),

    #[error("Некорректная структура ответа API: {0}")]
    Shape(String),

    #[error("В домашней работе отсутствует ключ {0}")]
    MissingField(String),

    #[error("Неизвестный статус домашней работы: {0}")]
    UnknownVerdict(String),
}

impl PollError {
    /// Transport-layer hiccups, as opposed to upstream contract violations.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::EndpointUnavailable { .. } | Self::MalformedPayload(_)
        )
    }
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
