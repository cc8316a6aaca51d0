//! Error kinds surfaced by the cat and mission services.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// An entity id did not resolve.
    #[error("{0}")]
    NotFound(String),

    /// Input shape or range violation, or an unrecognized breed.
    #[error("{0}")]
    Validation(String),

    /// A lifecycle guard rejected the transition.
    #[error("{0}")]
    InvalidOperation(String),

    /// The breed catalog could not be reached or returned garbage.
    #[error("breed lookup unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_messages_are_passed_through_verbatim() {
        let err = Error::invalid("cat is not available");
        assert_eq!(err.to_string(), "cat is not available");
    }

    #[test]
    fn sqlite_errors_become_storage_errors() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Storage(_)));
    }
}
