use uuid::Uuid;

use crate::core::FailurePolicy;
use crate::core::error::{FetchError, PendingError};
use crate::core::outcome::{Identifier, Outcome};
use crate::core::report::{BatchReport, Entry, EntryStatus};

#[derive(Debug)]
enum Slot<T> {
    Pending,
    Settled(Outcome<T>),
    Skipped,
}

/// Tracks the outcome of every member of one composite run.
///
/// The key set is fixed when the set is created; each slot is filled exactly
/// once, either with an outcome or as skipped. Only the owning composite
/// writes to it.
#[derive(Debug)]
pub struct PendingSet<T> {
    slots: Vec<(Identifier, Slot<T>)>,
}

impl<T> PendingSet<T> {
    pub fn new(identifiers: &[Identifier]) -> Self {
        PendingSet {
            slots: identifiers
                .iter()
                .map(|id| (id.clone(), Slot::Pending))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn identifier(&self, index: usize) -> Option<&Identifier> {
        self.slots.get(index).map(|(id, _)| id)
    }

    pub fn settle(&mut self, index: usize, outcome: Outcome<T>) -> Result<(), PendingError> {
        self.fill(index, Slot::Settled(outcome))
    }

    /// Marks a member that was never dispatched.
    pub fn skip(&mut self, index: usize) -> Result<(), PendingError> {
        self.fill(index, Slot::Skipped)
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Pending))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.pending_count() == 0
    }

    fn fill(&mut self, index: usize, value: Slot<T>) -> Result<(), PendingError> {
        let (_, slot) = self
            .slots
            .get_mut(index)
            .ok_or(PendingError::UnknownSlot(index))?;
        if !matches!(slot, Slot::Pending) {
            return Err(PendingError::AlreadySettled(index));
        }
        *slot = value;
        Ok(())
    }

    /// Consumes the set into a report ordered like the input identifiers.
    ///
    /// Slots still pending at this point are reported as skipped.
    pub fn into_report(
        self,
        run_id: Uuid,
        label: &str,
        policy: FailurePolicy,
        aborted_by: Option<FetchError>,
    ) -> BatchReport<T> {
        let pending = self.pending_count();
        if pending > 0 {
            log::warn!(
                "[{}] {} closed with {} unsettled member(s); reporting them as skipped",
                run_id,
                label,
                pending
            );
        }

        let entries = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, (identifier, slot))| Entry {
                index,
                identifier,
                status: match slot {
                    Slot::Settled(outcome) => EntryStatus::Settled(outcome),
                    Slot::Pending | Slot::Skipped => EntryStatus::Skipped,
                },
            })
            .collect();

        BatchReport::new(run_id, label, policy, aborted_by, entries)
    }
}
