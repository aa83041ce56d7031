use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, Shared};

use crate::core::error::FetchError;
use crate::core::fetch::Fetch;
use crate::core::outcome::{Identifier, Outcome};

type SettleFuture<T> = Shared<BoxFuture<'static, Outcome<T>>>;

/// A single-assignment settlement cell for one asynchronous operation.
///
/// A `Deferred` settles at most once. Every clone and every observer attached
/// to it sees the same [`Outcome`]; the underlying operation is driven by
/// whichever observer polls first and is never re-run. Nothing is dispatched
/// until the cell is first observed, so a cell dropped without an observer
/// never produces an outcome at all.
pub struct Deferred<T: Clone> {
    future: SettleFuture<T>,
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl Deferred<String> {
    /// Wraps a single invocation of `fetcher` for `identifier`.
    pub fn fetch(fetcher: &Arc<dyn Fetch>, identifier: impl Into<Identifier>) -> Self {
        let fetcher = Arc::clone(fetcher);
        let identifier = identifier.into();
        Deferred::from_future(async move {
            log::debug!("Dispatching fetch for '{}'", identifier);
            let outcome = fetcher.fetch(&identifier).await;
            log::debug!(
                "Fetch for '{}' settled ({})",
                identifier,
                if outcome.is_success() { "success" } else { "failure" }
            );
            outcome
        })
    }
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        Deferred {
            future: future.boxed().shared(),
        }
    }

    pub fn resolved(value: T) -> Self {
        Deferred::from_future(future::ready(Outcome::Success(value)))
    }

    pub fn rejected(error: FetchError) -> Self {
        Deferred::from_future(future::ready(Outcome::Failure(error)))
    }

    /// Waits for the cell to settle and returns its outcome.
    pub async fn settle(&self) -> Outcome<T> {
        self.future.clone().await
    }

    /// The outcome, if the cell has already settled. Never drives the operation.
    pub fn peek(&self) -> Option<Outcome<T>> {
        self.future.peek().cloned()
    }

    pub fn is_settled(&self) -> bool {
        self.future.peek().is_some()
    }

    /// Invokes exactly one of the handlers, once, with the settled outcome.
    pub async fn on_settled<S, F>(&self, on_success: S, on_failure: F)
    where
        S: FnOnce(T),
        F: FnOnce(FetchError),
    {
        match self.settle().await {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure(err) => on_failure(err),
        }
    }

    /// Chains another deferred operation after a successful settlement.
    ///
    /// A failure skips `next` entirely and is passed through unchanged.
    pub fn then<U, F>(self, next: F) -> Deferred<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Deferred<U> + Send + 'static,
    {
        Deferred::from_future(async move {
            match self.settle().await {
                Outcome::Success(value) => next(value).settle().await,
                Outcome::Failure(err) => Outcome::Failure(err),
            }
        })
    }

    pub fn map<U, F>(self, f: F) -> Deferred<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Deferred::from_future(async move { self.settle().await.map(f) })
    }

    /// Attaches a failure handler whose return value replaces the failure.
    pub fn catch<F>(self, handler: F) -> Deferred<T>
    where
        F: FnOnce(FetchError) -> Outcome<T> + Send + 'static,
    {
        Deferred::from_future(async move {
            match self.settle().await {
                Outcome::Failure(err) => handler(err),
                success => success,
            }
        })
    }
}
