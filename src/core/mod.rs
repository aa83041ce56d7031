pub mod async_impl;
pub mod continuation;
pub mod error;
pub mod fetch;
pub mod observer;
pub mod outcome;
pub mod pending;
pub mod report;

use serde::Serialize;

/// What a batch does when one of its members fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failure ends the run.
    FailFast,
    /// Failures are reported and the run carries on with every other member.
    #[default]
    FailTolerant,
}
