use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Conversation error: {0}")]
    Conversation(String),

    #[error("Conversation cancelled")]
    Cancelled,

    #[error("No reply within {0}s")]
    Timeout(u64),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
