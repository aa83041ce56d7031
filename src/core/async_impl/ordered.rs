use std::sync::Arc;

use uuid::Uuid;

use crate::core::FailurePolicy;
use crate::core::async_impl::deferred::Deferred;
use crate::core::fetch::Fetch;
use crate::core::observer::{render, LogObserver, Observer};
use crate::core::outcome::{Identifier, Outcome};
use crate::core::pending::PendingSet;
use crate::core::report::BatchReport;

/// Walks an ordered list of identifiers one fetch at a time.
///
/// Element `i + 1` is dispatched only after element `i` has settled and been
/// rendered. Under [`FailurePolicy::FailFast`] the first failure ends the walk
/// and the rest are reported as skipped; under
/// [`FailurePolicy::FailTolerant`] every element is fetched exactly once. The
/// completion hook fires once either way, after the last render.
pub struct OrderedIter {
    fetcher: Arc<dyn Fetch>,
    identifiers: Vec<Identifier>,
    policy: FailurePolicy,
    observer: Arc<dyn Observer>,
    label: String,
}

impl OrderedIter {
    pub fn new<I, S>(fetcher: Arc<dyn Fetch>, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        OrderedIter {
            fetcher,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            policy: FailurePolicy::default(),
            observer: Arc::new(LogObserver),
            label: "ordered".to_string(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub async fn run(&self) -> BatchReport<String> {
        let run_id = Uuid::new_v4();
        let mut pending = PendingSet::new(&self.identifiers);
        let mut rendered_failures = 0;
        let mut aborted_by = None;

        for (index, identifier) in self.identifiers.iter().enumerate() {
            if aborted_by.is_some() {
                if let Err(err) = pending.skip(index) {
                    log::warn!("[{}] {}: {}", run_id, self.label, err);
                }
                continue;
            }

            log::trace!("[{}] {}: step {} '{}'", run_id, self.label, index, identifier);
            let outcome = Deferred::fetch(&self.fetcher, identifier).settle().await;
            render(self.observer.as_ref(), identifier, &outcome);

            if let Outcome::Failure(err) = &outcome {
                rendered_failures += 1;
                if self.policy == FailurePolicy::FailFast {
                    log::debug!(
                        "[{}] {}: stopping at '{}', skipping {} remaining",
                        run_id,
                        self.label,
                        identifier,
                        self.identifiers.len() - index - 1
                    );
                    aborted_by = Some(err.clone());
                }
            }

            if let Err(err) = pending.settle(index, outcome) {
                log::warn!("[{}] {}: {}", run_id, self.label, err);
            }
        }

        self.observer.on_complete(&self.label, rendered_failures);
        pending.into_report(run_id, &self.label, self.policy, aborted_by)
    }
}
