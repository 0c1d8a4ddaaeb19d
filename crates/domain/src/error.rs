/// Shared error type used across all Vortex crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("charge failed: {0}")]
    Charge(String),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
