use std::sync::Arc;

use uuid::Uuid;

use crate::core::async_impl::deferred::Deferred;
use crate::core::fetch::Fetch;
use crate::core::observer::{render, LogObserver, Observer};
use crate::core::outcome::{Identifier, Outcome};

/// Progress of a fixed chain of fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    /// Step `k` has been dispatched and not yet settled.
    Running(usize),
    Settled { succeeded: bool },
}

impl ChainState {
    /// Leaves `Idle` for a chain of `len` steps.
    pub fn start(self, len: usize) -> ChainState {
        match self {
            ChainState::Idle if len == 0 => ChainState::Settled { succeeded: true },
            ChainState::Idle => ChainState::Running(0),
            other => other,
        }
    }

    /// Applies the settlement of the running step.
    pub fn advance(self, len: usize, step_succeeded: bool) -> ChainState {
        match self {
            ChainState::Running(_) if !step_succeeded => ChainState::Settled { succeeded: false },
            ChainState::Running(k) if k + 1 < len => ChainState::Running(k + 1),
            ChainState::Running(_) => ChainState::Settled { succeeded: true },
            other => other,
        }
    }
}

/// When a [`Sequencer`] reports completion to its observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// Never reports completion; the chain's returned outcome is the only signal.
    Silent,
    /// Only after the last step succeeded.
    #[default]
    OnSuccess,
    /// Exactly once on either terminal state.
    Always,
}

/// Runs a fixed chain of fetches one after the other.
///
/// Step `k + 1` is dispatched only after step `k` succeeded and its value was
/// rendered. The first failure is rendered and ends the chain; later steps are
/// never fetched.
pub struct Sequencer {
    fetcher: Arc<dyn Fetch>,
    steps: Vec<Identifier>,
    observer: Arc<dyn Observer>,
    label: String,
    completion: Completion,
}

impl Sequencer {
    pub fn new<I, S>(fetcher: Arc<dyn Fetch>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        Sequencer {
            fetcher,
            steps: steps.into_iter().map(Into::into).collect(),
            observer: Arc::new(LogObserver),
            label: "sequence".to_string(),
            completion: Completion::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_completion(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    pub fn steps(&self) -> &[Identifier] {
        &self.steps
    }

    /// Runs the chain.
    ///
    /// # Returns
    /// Every step's value in chain order, or the first failure.
    pub async fn run(&self) -> Outcome<Vec<String>> {
        let run_id = Uuid::new_v4();
        let len = self.steps.len();
        let mut values = Vec::with_capacity(len);
        let mut failure = None;

        let mut state = ChainState::Idle.start(len);
        log::debug!("[{}] {}: starting chain of {} step(s)", run_id, self.label, len);

        while let ChainState::Running(k) = state {
            let identifier = &self.steps[k];
            let outcome = Deferred::fetch(&self.fetcher, identifier).settle().await;
            render(self.observer.as_ref(), identifier, &outcome);

            let next = state.advance(len, outcome.is_success());
            log::trace!("[{}] {}: {:?} -> {:?}", run_id, self.label, state, next);
            state = next;

            match outcome {
                Outcome::Success(value) => values.push(value),
                Outcome::Failure(err) => failure = Some(err),
            }
        }

        let succeeded = failure.is_none();
        match (self.completion, succeeded) {
            (Completion::Always, _) | (Completion::OnSuccess, true) => {
                self.observer
                    .on_complete(&self.label, if succeeded { 0 } else { 1 });
            }
            _ => {}
        }

        match failure {
            Some(err) => Outcome::Failure(err),
            None => Outcome::Success(values),
        }
    }
}
