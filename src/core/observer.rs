use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::core::error::FetchError;
use crate::core::outcome::{Identifier, Outcome};

/// Receives rendered results from the composites.
///
/// Observers are pure side effects: nothing they do feeds back into
/// scheduling.
pub trait Observer: Send + Sync {
    fn on_success(&self, identifier: &Identifier, value: &str);
    fn on_failure(&self, error: &FetchError);
    /// Fired once per composite run. `failures` counts the failures that were
    /// rendered during the run.
    fn on_complete(&self, label: &str, failures: usize);
}

/// Routes an outcome to the matching observer hook.
pub(crate) fn render(observer: &dyn Observer, identifier: &Identifier, outcome: &Outcome<String>) {
    match outcome {
        Outcome::Success(value) => observer.on_success(identifier, value),
        Outcome::Failure(err) => observer.on_failure(err),
    }
}

/// Renders everything through the `log` facade. The default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_success(&self, identifier: &Identifier, value: &str) {
        log::info!("{}: {}", identifier, value);
    }

    fn on_failure(&self, error: &FetchError) {
        log::error!("{}", error);
    }

    fn on_complete(&self, label: &str, failures: usize) {
        if failures == 0 {
            log::info!("{} done", label);
        } else {
            log::info!("{} done ({} failed)", label, failures);
        }
    }
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Prints successes in green and failures in red on stdout.
#[derive(Debug, Clone, Default)]
pub struct ConsoleObserver {
    heading: Option<String>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints `-- heading --` in front of every rendered item.
    pub fn with_heading(heading: impl Into<String>) -> Self {
        ConsoleObserver {
            heading: Some(heading.into()),
        }
    }

    fn print_heading(&self) {
        if let Some(heading) = &self.heading {
            println!("-- {} --", heading);
        }
    }
}

impl Observer for ConsoleObserver {
    fn on_success(&self, _identifier: &Identifier, value: &str) {
        self.print_heading();
        println!("{GREEN}{}{RESET}", value.trim_end());
    }

    fn on_failure(&self, error: &FetchError) {
        self.print_heading();
        println!("{RED}{}{RESET}", error);
    }

    fn on_complete(&self, label: &str, failures: usize) {
        if failures == 0 {
            println!("-- {} done --", label);
        } else {
            println!("-- {} done, {} failed --", label, failures);
        }
    }
}

/// One call received by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObserverEvent {
    Success { identifier: Identifier, value: String },
    Failure { identifier: Identifier, message: String },
    Complete { label: String, failures: usize },
}

/// Simple in-memory collector of observer calls, in the order received.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Identifiers of successful renders, in render order.
    pub fn successes(&self) -> Vec<Identifier> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::Success { identifier, .. } => Some(identifier),
                _ => None,
            })
            .collect()
    }

    /// Identifiers of failure renders, in render order.
    pub fn failures(&self) -> Vec<Identifier> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::Failure { identifier, .. } => Some(identifier),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ObserverEvent::Complete { .. }))
            .count()
    }

    /// Identifiers of every item render, success or failure, in order.
    pub fn rendered(&self) -> Vec<Identifier> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::Success { identifier, .. } | ObserverEvent::Failure { identifier, .. } => {
                    Some(identifier)
                }
                ObserverEvent::Complete { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: ObserverEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Observer for RecordingObserver {
    fn on_success(&self, identifier: &Identifier, value: &str) {
        self.push(ObserverEvent::Success {
            identifier: identifier.clone(),
            value: value.to_string(),
        });
    }

    fn on_failure(&self, error: &FetchError) {
        self.push(ObserverEvent::Failure {
            identifier: error.identifier().clone(),
            message: error.to_string(),
        });
    }

    fn on_complete(&self, label: &str, failures: usize) {
        self.push(ObserverEvent::Complete {
            label: label.to_string(),
            failures,
        });
    }
}
