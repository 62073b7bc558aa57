use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConciergeError>;

#[derive(Debug, Error)]
pub enum ConciergeError {
    #[error("completion service error: {0}")]
    Completion(String),

    #[error("a relay call is already in flight for this session")]
    SessionBusy,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
