//! Error types for timevillage-sync

use thiserror::Error;

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a push or pull did not happen
///
/// Local state is unchanged in every case.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not signed in")]
    NotSignedIn,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("could not decode remote document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("session error: {0}")]
    Session(#[from] timevillage_session::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
