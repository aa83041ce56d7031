//! Randomized checks of the join, ordering and failure-policy guarantees.

use fetchflow::prelude::*;
use fetchflow::{MemoryFetcher, ObserverEvent, RecordingObserver};
use proptest::prelude::*;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
        .block_on(future)
}

/// One identifier per plan entry; entries marked as failing get no resource.
fn build(plan: &[(u64, bool)]) -> (Arc<MemoryFetcher>, Vec<Identifier>) {
    let mut memory = MemoryFetcher::new();
    let mut ids = Vec::with_capacity(plan.len());
    for (i, (delay_ms, fails)) in plan.iter().enumerate() {
        let id = Identifier::from(format!("item-{}", i));
        memory = memory.with_delay(id.clone(), Duration::from_millis(*delay_ms));
        if !fails {
            memory = memory.with_resource(id.clone(), format!("value {}", i));
        }
        ids.push(id);
    }
    (Arc::new(memory), ids)
}

fn plans() -> impl Strategy<Value = Vec<(u64, bool)>> {
    prop::collection::vec((0u64..4, prop::bool::weighted(0.3)), 0..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn fan_out_joins_once_after_every_member(plan in plans()) {
        let (memory, ids) = build(&plan);
        let fetcher: Arc<dyn Fetch> = memory.clone();
        let observer = Arc::new(RecordingObserver::new());

        let report = block_on(
            FanOut::new(fetcher, ids.clone())
                .with_policy(FailurePolicy::FailTolerant)
                .with_observer(observer.clone())
                .run(),
        );

        let events = observer.events();
        prop_assert_eq!(observer.completions(), 1);
        prop_assert_eq!(events.len(), ids.len() + 1);
        let is_complete = matches!(events.last(), Some(ObserverEvent::Complete { .. }));
        prop_assert!(is_complete);

        let order: Vec<Identifier> = report.entries().iter().map(|e| e.identifier.clone()).collect();
        prop_assert_eq!(order, ids.clone());
        let expected_failures = plan.iter().filter(|(_, fails)| *fails).count();
        prop_assert_eq!(report.failure_count(), expected_failures);
        for id in &ids {
            prop_assert_eq!(memory.calls(id), 1);
        }
    }

    #[test]
    fn fail_fast_never_fetches_past_first_failure(plan in plans()) {
        let (memory, ids) = build(&plan);
        let fetcher: Arc<dyn Fetch> = memory.clone();
        let observer = Arc::new(RecordingObserver::new());

        let report = block_on(
            OrderedIter::new(fetcher, ids.clone())
                .with_policy(FailurePolicy::FailFast)
                .with_observer(observer.clone())
                .run(),
        );

        prop_assert_eq!(observer.completions(), 1);
        match plan.iter().position(|(_, fails)| *fails) {
            Some(p) => {
                prop_assert_eq!(memory.dispatched(), ids[..=p].to_vec());
                prop_assert_eq!(observer.failures(), vec![ids[p].clone()]);
                prop_assert_eq!(report.skipped_count(), ids.len() - p - 1);
            }
            None => {
                prop_assert_eq!(memory.dispatched(), ids.clone());
                prop_assert!(report.all_succeeded());
            }
        }
    }

    #[test]
    fn fail_tolerant_fetches_each_element_once_in_order(plan in plans()) {
        let (memory, ids) = build(&plan);
        let fetcher: Arc<dyn Fetch> = memory.clone();
        let observer = Arc::new(RecordingObserver::new());

        let report = block_on(
            OrderedIter::new(fetcher, ids.clone())
                .with_policy(FailurePolicy::FailTolerant)
                .with_observer(observer.clone())
                .run(),
        );

        prop_assert_eq!(memory.dispatched(), ids.clone());
        prop_assert_eq!(observer.rendered(), ids.clone());
        prop_assert_eq!(observer.completions(), 1);
        let is_complete = matches!(observer.events().last(), Some(ObserverEvent::Complete { .. }));
        prop_assert!(is_complete);
        prop_assert_eq!(report.skipped_count(), 0);
        prop_assert!(!report.is_aborted());
    }
}

#[test]
fn deferred_observed_twice_fetches_once() {
    let (memory, ids) = build(&[(2, false)]);
    let fetcher: Arc<dyn Fetch> = memory.clone();

    block_on(async {
        let deferred = Deferred::fetch(&fetcher, ids[0].clone());
        let first = deferred.settle().await;
        let mut second = None;
        deferred.on_settled(|v| second = Some(v), |_| {}).await;
        assert_eq!(first.value(), second.as_ref());
    });

    assert_eq!(memory.calls(&ids[0]), 1);
}
