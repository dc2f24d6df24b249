use tendril_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] ScanError),

    /// The session was cleared or restarted while the request was in flight.
    #[error("Result discarded: the session changed while the page was loading")]
    Superseded,
}

pub type Result<T> = std::result::Result<T, ExploreError>;
