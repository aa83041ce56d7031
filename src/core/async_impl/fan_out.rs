use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use uuid::Uuid;

use crate::core::FailurePolicy;
use crate::core::async_impl::deferred::Deferred;
use crate::core::fetch::Fetch;
use crate::core::observer::{render, LogObserver, Observer};
use crate::core::outcome::{Identifier, Outcome};
use crate::core::pending::PendingSet;
use crate::core::report::BatchReport;

/// Dispatches a batch of fetches concurrently and joins on all of them.
///
/// Members are interleaved on the calling task; nothing is spawned. Each
/// settlement is rendered in arrival order and the observer's completion hook
/// fires exactly once, after every rendered member (immediately for an empty
/// batch). The returned report is ordered like the input.
///
/// Under [`FailurePolicy::FailFast`] the first failure aborts the batch:
/// members that were not yet dispatched are skipped, while fetches already in
/// flight are still driven to settlement and recorded. Failures among those
/// late arrivals are rendered, successes are not. Completion fires after the
/// drain with every rendered failure counted.
pub struct FanOut {
    fetcher: Arc<dyn Fetch>,
    identifiers: Vec<Identifier>,
    policy: FailurePolicy,
    observer: Arc<dyn Observer>,
    label: String,
    max_concurrency: Option<usize>,
}

impl FanOut {
    pub fn new<I, S>(fetcher: Arc<dyn Fetch>, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        FanOut {
            fetcher,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            policy: FailurePolicy::default(),
            observer: Arc::new(LogObserver),
            label: "fan-out".to_string(),
            max_concurrency: None,
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

    /// Caps the number of fetches in flight at once. Unbounded by default.
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        assert!(
            max_concurrency > 0,
            "Max concurrency must be greater than 0"
        );
        self.max_concurrency = Some(max_concurrency);
        self
    }

    pub async fn run(&self) -> BatchReport<String> {
        let run_id = Uuid::new_v4();
        let mut pending = PendingSet::new(&self.identifiers);
        let limit = self.max_concurrency.unwrap_or(usize::MAX);
        log::debug!(
            "[{}] {}: fanning out {} fetch(es)",
            run_id,
            self.label,
            self.identifiers.len()
        );

        let dispatch = |(index, identifier): (usize, Identifier)| {
            let deferred = Deferred::fetch(&self.fetcher, identifier.clone());
            async move { (index, identifier, deferred.settle().await) }
        };

        let mut queue = self.identifiers.iter().cloned().enumerate();
        let mut in_flight: FuturesUnordered<_> = queue.by_ref().take(limit).map(dispatch).collect();

        let mut rendered_failures = 0;
        let mut aborted_by = None;

        while let Some((index, identifier, outcome)) = in_flight.next().await {
            if aborted_by.is_none() || outcome.is_failure() {
                render(self.observer.as_ref(), &identifier, &outcome);
            } else {
                log::debug!(
                    "[{}] {}: '{}' settled after the abort",
                    run_id,
                    self.label,
                    identifier
                );
            }

            if let Outcome::Failure(err) = &outcome {
                rendered_failures += 1;
                if self.policy == FailurePolicy::FailFast && aborted_by.is_none() {
                    log::debug!(
                        "[{}] {}: '{}' failed, draining {} in-flight fetch(es)",
                        run_id,
                        self.label,
                        identifier,
                        in_flight.len()
                    );
                    aborted_by = Some(err.clone());
                }
            }

            if aborted_by.is_none() {
                if let Some(next) = queue.next() {
                    in_flight.push(dispatch(next));
                }
            }

            if let Err(err) = pending.settle(index, outcome) {
                log::warn!("[{}] {}: {}", run_id, self.label, err);
            }
        }

        for (index, _) in queue {
            if let Err(err) = pending.skip(index) {
                log::warn!("[{}] {}: {}", run_id, self.label, err);
            }
        }

        self.observer.on_complete(&self.label, rendered_failures);

        pending.into_report(run_id, &self.label, self.policy, aborted_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::MemoryFetcher;
    use crate::core::observer::{ObserverEvent, RecordingObserver};
    use std::time::Duration;

    fn backend() -> (Arc<MemoryFetcher>, Arc<dyn Fetch>) {
        let memory = Arc::new(
            MemoryFetcher::new()
                .with_resource("slow", "slow text")
                .with_resource("fast", "fast text")
                .with_resource("slower", "slower text")
                .with_delay("slow", Duration::from_millis(20))
                .with_delay("slower", Duration::from_millis(40))
                .with_delay("fast", Duration::from_millis(1)),
        );
        let fetcher: Arc<dyn Fetch> = memory.clone();
        (memory, fetcher)
    }

    #[tokio::test]
    async fn test_fan_out_renders_in_arrival_order_and_reports_in_input_order() {
        let (memory, fetcher) = backend();
        let observer = Arc::new(RecordingObserver::new());

        let report = FanOut::new(fetcher, ["slow", "fast"])
            .with_observer(observer.clone())
            .run()
            .await;

        assert_eq!(observer.successes(), vec![Identifier::from("fast"), "slow".into()]);
        assert_eq!(
            report.values(),
            vec![&"slow text".to_string(), &"fast text".to_string()]
        );
        assert_eq!(memory.dispatched().len(), 2);
        assert_eq!(observer.completions(), 1);
        assert!(matches!(observer.events().last(), Some(ObserverEvent::Complete { .. })));
    }

    #[tokio::test]
    async fn test_empty_fan_out_completes_immediately() {
        let (memory, fetcher) = backend();
        let observer = Arc::new(RecordingObserver::new());

        let report = FanOut::new(fetcher, Vec::<Identifier>::new())
            .with_observer(observer.clone())
            .run()
            .await;

        assert!(report.is_empty());
        assert_eq!(memory.total_calls(), 0);
        assert_eq!(
            observer.events(),
            vec![ObserverEvent::Complete {
                label: "fan-out".to_string(),
                failures: 0
            }]
        );
    }

    #[tokio::test]
    async fn test_fail_tolerant_fan_out_waits_for_everyone() {
        let (_memory, fetcher) = backend();
        let observer = Arc::new(RecordingObserver::new());

        let report = FanOut::new(fetcher, ["slow", "missing", "fast"])
            .with_policy(FailurePolicy::FailTolerant)
            .with_observer(observer.clone())
            .run()
            .await;

        assert_eq!(observer.rendered().len(), 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.values().len(), 2);
        assert!(!report.is_aborted());
        assert_eq!(
            observer.events().last(),
            Some(&ObserverEvent::Complete {
                label: "fan-out".to_string(),
                failures: 1
            })
        );
    }

    #[tokio::test]
    async fn test_fail_fast_fan_out_stops_rendering_successes_after_first_failure() {
        let (memory, fetcher) = backend();
        let observer = Arc::new(RecordingObserver::new());

        let report = FanOut::new(fetcher, ["slow", "missing", "slower"])
            .with_policy(FailurePolicy::FailFast)
            .with_observer(observer.clone())
            .run()
            .await;

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ObserverEvent::Failure { identifier, .. } if identifier.as_str() == "missing"));
        assert!(matches!(&events[1], ObserverEvent::Complete { failures: 1, .. }));

        // in-flight members still ran to completion
        assert_eq!(memory.calls("slow"), 1);
        assert_eq!(memory.calls("slower"), 1);
        assert_eq!(report.values().len(), 2);
        assert_eq!(
            report.aborted_by().map(|e| e.identifier().clone()),
            Some(Identifier::from("missing"))
        );
    }

    #[tokio::test]
    async fn test_fail_fast_fan_out_renders_late_failures_before_completion() {
        let memory = Arc::new(
            MemoryFetcher::new()
                .with_resource("slow", "slow text")
                .with_delay("slow", Duration::from_millis(20))
                .with_delay("late-missing", Duration::from_millis(10)),
        );
        let fetcher: Arc<dyn Fetch> = memory.clone();
        let observer = Arc::new(RecordingObserver::new());

        let report = FanOut::new(fetcher, ["missing", "late-missing", "slow"])
            .with_policy(FailurePolicy::FailFast)
            .with_observer(observer.clone())
            .run()
            .await;

        assert_eq!(
            observer.failures(),
            vec![Identifier::from("missing"), "late-missing".into()]
        );
        assert!(observer.successes().is_empty());
        assert_eq!(
            observer.events().last(),
            Some(&ObserverEvent::Complete {
                label: "fan-out".to_string(),
                failures: 2
            })
        );
        assert_eq!(observer.completions(), 1);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.values().len(), 1);
        assert_eq!(
            report.aborted_by().map(|e| e.identifier().clone()),
            Some(Identifier::from("missing"))
        );
    }

    #[tokio::test]
    async fn test_fail_fast_with_cap_skips_undispatched_members() {
        let (memory, fetcher) = backend();
        let observer = Arc::new(RecordingObserver::new());

        let report = FanOut::new(fetcher, ["missing", "fast", "slow"])
            .with_policy(FailurePolicy::FailFast)
            .with_concurrency(1)
            .with_observer(observer.clone())
            .run()
            .await;

        assert_eq!(memory.total_calls(), 1);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(observer.completions(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_cap_of_one_dispatches_in_input_order() {
        let (memory, fetcher) = backend();

        let report = FanOut::new(fetcher, ["slower", "fast", "slow"])
            .with_concurrency(1)
            .run()
            .await;

        assert!(report.all_succeeded());
        assert_eq!(
            memory.dispatched(),
            vec![Identifier::from("slower"), "fast".into(), "slow".into()]
        );
    }

    #[test]
    #[should_panic(expected = "Max concurrency must be greater than 0")]
    fn test_zero_concurrency_panics() {
        let (_memory, fetcher) = backend();
        let _ = FanOut::new(fetcher, ["fast"]).with_concurrency(0);
    }
}
