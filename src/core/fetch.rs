//! The fetch capability consumed by every composite, plus the backends that
//! ship with the crate.
//!
//! - [`FileFetcher`] reads UTF-8 text files below a root directory
//! - [`MemoryFetcher`] serves text from memory, with optional settle delays and
//!   invocation counting
//! - [`FaultInjector`] wraps any fetcher and fails an explicit set of identifiers

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::error::{FetchCause, FetchError};
use crate::core::outcome::{Identifier, Outcome};

/// Asynchronously produces the contents named by an [`Identifier`].
///
/// Implementations must settle exactly once per call and must report ordinary
/// conditions such as a missing resource as [`Outcome::Failure`] rather than
/// panicking.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, identifier: &Identifier) -> Outcome<String>;
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    async fn fetch(&self, identifier: &Identifier) -> Outcome<String> {
        (**self).fetch(identifier).await
    }
}

/// Reads text files relative to a root directory using `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileFetcher { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Fetch for FileFetcher {
    async fn fetch(&self, identifier: &Identifier) -> Outcome<String> {
        let path = self.root.join(identifier.as_str());
        log::debug!("Reading {}", path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) => return Outcome::Failure(FetchError::new(identifier, err.into())),
        };
        match String::from_utf8(bytes) {
            Ok(text) => Outcome::Success(text),
            Err(_) => Outcome::Failure(FetchError::new(identifier, FetchCause::InvalidUtf8)),
        }
    }
}

/// Serves resources from memory.
///
/// Every call is counted per identifier and appended to a dispatch log, so
/// tests can check how often and in which order the backend was hit.
/// Unknown identifiers settle with [`FetchCause::NotFound`].
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: HashMap<Identifier, String>,
    delays: HashMap<Identifier, Duration>,
    calls: Mutex<HashMap<Identifier, usize>>,
    dispatched: Mutex<Vec<Identifier>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, identifier: impl Into<Identifier>, text: impl Into<String>) -> Self {
        self.resources.insert(identifier.into(), text.into());
        self
    }

    /// Delays settlement of `identifier` by `delay` after dispatch.
    pub fn with_delay(mut self, identifier: impl Into<Identifier>, delay: Duration) -> Self {
        self.delays.insert(identifier.into(), delay);
        self
    }

    /// Number of times `identifier` has been fetched.
    pub fn calls(&self, identifier: impl Into<Identifier>) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.get(&identifier.into()).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.values().sum()
    }

    /// Identifiers in the order their fetches were dispatched.
    pub fn dispatched(&self) -> Vec<Identifier> {
        self.dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Fetch for MemoryFetcher {
    async fn fetch(&self, identifier: &Identifier) -> Outcome<String> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            *calls.entry(identifier.clone()).or_insert(0) += 1;
        }
        self.dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identifier.clone());

        if let Some(delay) = self.delays.get(identifier) {
            tokio::time::sleep(*delay).await;
        }

        match self.resources.get(identifier) {
            Some(text) => Outcome::Success(text.clone()),
            None => Outcome::Failure(FetchError::not_found(identifier)),
        }
    }
}

/// Wraps a fetcher and fails every identifier in an explicit list without
/// consulting the inner backend.
#[derive(Debug)]
pub struct FaultInjector<F> {
    inner: F,
    failing: HashSet<Identifier>,
}

impl<F: Fetch> FaultInjector<F> {
    pub fn new<I, S>(inner: F, failing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        FaultInjector {
            inner,
            failing: failing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: Fetch> Fetch for FaultInjector<F> {
    async fn fetch(&self, identifier: &Identifier) -> Outcome<String> {
        if self.failing.contains(identifier) {
            log::debug!("Injecting failure for '{}'", identifier);
            return Outcome::Failure(FetchError::injected(identifier, "listed as failing"));
        }
        self.inner.fetch(identifier).await
    }
}
