use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::core::error::FetchError;

/// An opaque, immutable name for one fetchable resource.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
    pub fn new(name: impl AsRef<str>) -> Self {
        Identifier(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier(Arc::from(name))
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Builds a list of identifiers from anything string-like.
pub fn identifiers<I, S>(names: I) -> Vec<Identifier>
where
    I: IntoIterator<Item = S>,
    S: Into<Identifier>,
{
    names.into_iter().map(Into::into).collect()
}

/// The settled result of exactly one fetch.
///
/// Created once when a fetch settles and never mutated afterwards; clone it
/// to hand it to more than one observer.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Success(T),
    Failure(FetchError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Failure(e) => Outcome::Failure(e),
        }
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        self.into()
    }

    /// Splits the outcome into the `(error, value)` pair handed to
    /// continuation-style callbacks. Exactly one side is `Some`.
    pub fn into_parts(self) -> (Option<FetchError>, Option<T>) {
        match self {
            Outcome::Success(v) => (None, Some(v)),
            Outcome::Failure(e) => (Some(e), None),
        }
    }
}

impl<T> From<Result<T, FetchError>> for Outcome<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(v) => Outcome::Success(v),
            Err(e) => Outcome::Failure(e),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, FetchError> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Success(v) => Ok(v),
            Outcome::Failure(e) => Err(e),
        }
    }
}
