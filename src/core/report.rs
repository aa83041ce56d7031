use serde::Serialize;
use uuid::Uuid;

use crate::core::FailurePolicy;
use crate::core::error::FetchError;
use crate::core::outcome::{Identifier, Outcome};

/// What happened to one member of a batch.
#[derive(Debug, Clone)]
pub enum EntryStatus<T> {
    Settled(Outcome<T>),
    /// Never dispatched, because a fail-fast run stopped before reaching it.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct Entry<T> {
    pub index: usize,
    pub identifier: Identifier,
    pub status: EntryStatus<T>,
}

impl<T> Entry<T> {
    pub fn outcome(&self) -> Option<&Outcome<T>> {
        match &self.status {
            EntryStatus::Settled(outcome) => Some(outcome),
            EntryStatus::Skipped => None,
        }
    }
}

/// The result of a fan-out or ordered run: one entry per input identifier, in
/// input order, whatever order the fetches settled in.
///
/// A report never turns member failures into an error of its own; inspect
/// [`failures`](BatchReport::failures) to decide whether the batch succeeded.
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    run_id: Uuid,
    label: String,
    policy: FailurePolicy,
    aborted_by: Option<FetchError>,
    entries: Vec<Entry<T>>,
}

impl<T> BatchReport<T> {
    pub(crate) fn new(
        run_id: Uuid,
        label: &str,
        policy: FailurePolicy,
        aborted_by: Option<FetchError>,
        entries: Vec<Entry<T>>,
    ) -> Self {
        BatchReport {
            run_id,
            label: label.to_string(),
            policy,
            aborted_by,
            entries,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Settled outcomes in input order; skipped members are left out.
    pub fn outcomes(&self) -> Vec<&Outcome<T>> {
        self.entries.iter().filter_map(Entry::outcome).collect()
    }

    /// Successful values in input order.
    pub fn values(&self) -> Vec<&T> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome().and_then(Outcome::value))
            .collect()
    }

    pub fn failures(&self) -> Vec<&FetchError> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome().and_then(Outcome::error))
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().len()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Skipped))
            .count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.outcome().is_some_and(Outcome::is_success))
    }

    /// The failure that stopped a fail-fast run, if any.
    pub fn aborted_by(&self) -> Option<&FetchError> {
        self.aborted_by.as_ref()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_by.is_some()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            run_id: self.run_id.to_string(),
            label: self.label.clone(),
            policy: self.policy,
            total: self.len(),
            succeeded: self.values().len(),
            failed: self
                .failures()
                .into_iter()
                .map(|e| e.identifier().clone())
                .collect(),
            skipped: self.skipped_count(),
            aborted: self.is_aborted(),
        }
    }

    pub fn print_summary(&self) {
        if self.all_succeeded() {
            println!("✅ {}: all {} item(s) fetched.", self.label, self.len());
            return;
        }

        for error in self.failures() {
            println!("❌ {}", error);
        }
        if self.skipped_count() > 0 {
            println!("⚠️ {} item(s) skipped.", self.skipped_count());
        }
    }
}

/// Serialisable digest of a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub run_id: String,
    pub label: String,
    pub policy: FailurePolicy,
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<Identifier>,
    pub skipped: usize,
    pub aborted: bool,
}

impl BatchSummary {
    /// Renders the summary as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> BatchReport<String> {
        let entries = vec![
            Entry {
                index: 0,
                identifier: "a".into(),
                status: EntryStatus::Settled(Outcome::Success("alpha".to_string())),
            },
            Entry {
                index: 1,
                identifier: "b".into(),
                status: EntryStatus::Settled(Outcome::Failure(FetchError::not_found("b"))),
            },
            Entry {
                index: 2,
                identifier: "c".into(),
                status: EntryStatus::Skipped,
            },
        ];
        BatchReport::new(
            Uuid::nil(),
            "sample",
            FailurePolicy::FailFast,
            Some(FetchError::not_found("b")),
            entries,
        )
    }

    #[test]
    fn test_report_accessors() {
        let report = sample();
        assert_eq!(report.len(), 3);
        assert_eq!(report.values(), vec![&"alpha".to_string()]);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.outcomes().len(), 2);
        assert!(!report.all_succeeded());
        assert!(report.is_aborted());
    }

    #[test]
    fn test_summary_to_json_is_pretty_printed() {
        let text = sample().summary().to_json().unwrap();
        assert!(text.contains("\n  \"label\": \"sample\""));

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["failed"], json!(["b"]));
        assert_eq!(parsed["aborted"], json!(true));
    }

    #[test]
    fn test_summary_serializes() {
        let summary = sample().summary();
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "run_id": "00000000-0000-0000-0000-000000000000",
                "label": "sample",
                "policy": "fail_fast",
                "total": 3,
                "succeeded": 1,
                "failed": ["b"],
                "skipped": 1,
                "aborted": true
            })
        );
    }

    #[test]
    fn test_empty_report_counts_as_success() {
        let report: BatchReport<String> =
            BatchReport::new(Uuid::nil(), "empty", FailurePolicy::FailTolerant, None, Vec::new());
        assert!(report.all_succeeded());
        assert!(report.is_empty());
    }
}
