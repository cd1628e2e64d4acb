//! Error types for timevillage-session

use thiserror::Error;
use timevillage_core::Rejection;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by session operations
///
/// Either way nothing was changed: a rejection is refused before any write,
/// and a store error aborts the transaction.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation was refused by the economy or village rules
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] timevillage_db::Error),
}

impl Error {
    /// Whether this is a rules refusal rather than a storage failure
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected(_))
    }

    /// The rejection reason, if any
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::Rejected(rejection) => Some(rejection),
            Error::Store(_) => None,
        }
    }
}
