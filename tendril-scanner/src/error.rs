use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Proxy returned HTTP {0}")]
    BadStatus(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("All proxies exhausted for {url}: {last_error}")]
    AllProxiesExhausted { url: String, last_error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
