//! Continuation-style presentation of the settlement primitives.
//!
//! Callbacks receive `(error, value)` where exactly one side is populated. These
//! are thin subscribers on top of [`Deferred`]; they never dispatch fetches of
//! their own.

use std::future::Future;
use std::sync::Arc;

use crate::core::async_impl::deferred::Deferred;
use crate::core::error::FetchError;
use crate::core::fetch::Fetch;
use crate::core::outcome::{Identifier, Outcome};

/// Fetches `identifier` once and hands the result to `callback`.
pub async fn fetch_with<C>(fetcher: &Arc<dyn Fetch>, identifier: impl Into<Identifier>, callback: C)
where
    C: FnOnce(Option<FetchError>, Option<String>),
{
    subscribe(&Deferred::fetch(fetcher, identifier), callback).await
}

/// Subscribes `callback` to an existing cell.
pub async fn subscribe<T, C>(deferred: &Deferred<T>, callback: C)
where
    T: Clone + Send + Sync + 'static,
    C: FnOnce(Option<FetchError>, Option<T>),
{
    let (err, value) = deferred.settle().await.into_parts();
    callback(err, value)
}

/// Drives any outcome-producing future and reports it in continuation form.
///
/// Every composite's `run()` future can be observed this way.
pub async fn observe<T, F, C>(future: F, callback: C)
where
    F: Future<Output = Outcome<T>>,
    C: FnOnce(Option<FetchError>, Option<T>),
{
    let (err, value) = future.await.into_parts();
    callback(err, value)
}
