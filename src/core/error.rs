use std::sync::Arc;

use thiserror::Error;

use crate::core::outcome::Identifier;

/// The only failure a fetch can produce: the backend could not yield a value
/// for `identifier`.
///
/// Errors are cheap to clone so that a settled [`Deferred`](crate::Deferred)
/// can hand the same failure to every observer.
#[derive(Debug, Clone, Error)]
#[error("failed to fetch '{identifier}': {cause}")]
pub struct FetchError {
    identifier: Identifier,
    #[source]
    cause: FetchCause,
}

impl FetchError {
    pub fn new(identifier: impl Into<Identifier>, cause: FetchCause) -> Self {
        Self {
            identifier: identifier.into(),
            cause,
        }
    }

    pub fn not_found(identifier: impl Into<Identifier>) -> Self {
        Self::new(identifier, FetchCause::NotFound)
    }

    pub fn injected(identifier: impl Into<Identifier>, reason: impl Into<String>) -> Self {
        Self::new(identifier, FetchCause::Injected(reason.into()))
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn cause(&self) -> &FetchCause {
        &self.cause
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.cause, FetchCause::NotFound)
    }
}

#[derive(Debug, Clone, Error)]
pub enum FetchCause {
    #[error("resource not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("content is not valid UTF-8")]
    InvalidUtf8,

    #[error("injected fault: {0}")]
    Injected(String),
}

impl From<std::io::Error> for FetchCause {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FetchCause::NotFound,
            std::io::ErrorKind::InvalidData => FetchCause::InvalidUtf8,
            _ => FetchCause::Io(Arc::new(err)),
        }
    }
}

/// Misuse of a [`PendingSet`](crate::core::pending::PendingSet) by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PendingError {
    #[error("slot {0} is not part of this pending set")]
    UnknownSlot(usize),

    #[error("slot {0} has already settled")]
    AlreadySettled(usize),
}
