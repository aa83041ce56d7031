//! # Fetchflow
//!
//! Composable orchestration of asynchronous single-item fetches: read many
//! named resources and combine the results under well-defined ordering,
//! parallelism and failure policies.
//!
//! ## Features
//!
//! - **One settlement primitive**: [`Deferred`] settles once and is shared by every observer
//! - **Two presentations**: promise-style chaining on [`Deferred`] and `(error, value)`
//!   callbacks in [`continuation`]
//! - **Sequencing**: [`Sequencer`] chains a fixed list and stops at the first failure
//! - **Fan-out/join**: [`FanOut`] dispatches concurrently and joins on every member
//! - **Ordered iteration**: [`OrderedIter`] walks a list one fetch at a time, fail-fast or
//!   fail-tolerant
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetchflow::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let fetcher: Arc<dyn Fetch> = Arc::new(FileFetcher::new("poems"));
//!
//! let report = OrderedIter::new(fetcher, ["stanza-01.txt", "stanza-02.txt"])
//!     .with_policy(FailurePolicy::FailFast)
//!     .with_observer(Arc::new(ConsoleObserver::new()))
//!     .run()
//!     .await;
//!
//! assert!(report.all_succeeded());
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`async_impl`]: the settlement cell and the three composites
//! - [`continuation`]: callback-style adapters over [`Deferred`]
//! - [`prelude`]: Commonly used types and traits (import with `use fetchflow::prelude::*`)
//! - [`async_prelude`]: Only the promise-style types
//! - [`callback_prelude`]: Only the continuation-style types

// ============================================================================
// Core Module
// ============================================================================

mod core;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

pub use crate::core::async_impl;
pub use crate::core::continuation;

// Data model
pub use crate::core::FailurePolicy;
pub use crate::core::error::{FetchCause, FetchError, PendingError};
pub use crate::core::outcome::{identifiers, Identifier, Outcome};
pub use crate::core::pending::PendingSet;
pub use crate::core::report::{BatchReport, BatchSummary, Entry, EntryStatus};

// Collaborators
pub use crate::core::fetch::{FaultInjector, Fetch, FileFetcher, MemoryFetcher};
pub use crate::core::observer::{ConsoleObserver, LogObserver, Observer, ObserverEvent, RecordingObserver};

// Composites
pub use crate::core::async_impl::deferred::Deferred;
pub use crate::core::async_impl::fan_out::FanOut;
pub use crate::core::async_impl::ordered::OrderedIter;
pub use crate::core::async_impl::sequencer::{ChainState, Completion, Sequencer};

// ============================================================================
// Prelude Modules - Convenient Bulk Imports
// ============================================================================

/// The main prelude: imports everything you need for both presentations.
///
/// # Example
/// ```rust
/// use fetchflow::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Continuation
        continuation::{fetch_with, observe, subscribe},
        // Core
        Completion,
        ConsoleObserver,
        Deferred,
        FailurePolicy,
        FanOut,
        Fetch,
        FetchError,
        FileFetcher,
        Identifier,
        LogObserver,
        Observer,
        OrderedIter,
        Outcome,
        Sequencer,
    };
}

/// Prelude for promise-style workflows.
///
/// # Example
/// ```rust
/// use fetchflow::async_prelude::*;
/// ```
pub mod async_prelude {
    pub use super::{
        Completion, Deferred, FailurePolicy, FanOut, Fetch, FetchError, Identifier, Observer,
        OrderedIter, Outcome, Sequencer,
    };
}

/// Prelude for continuation-style workflows.
///
/// # Example
/// ```rust
/// use fetchflow::callback_prelude::*;
/// ```
pub mod callback_prelude {
    pub use super::continuation::{fetch_with, observe, subscribe};
    pub use super::{Fetch, FetchError, Identifier, Outcome};
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
