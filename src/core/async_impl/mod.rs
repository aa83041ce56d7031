//! Asynchronous composition primitives.
//!
//! - [`Deferred`](deferred::Deferred), the single-assignment settlement cell every
//!   composite is built from
//! - [`Sequencer`](sequencer::Sequencer) for a fixed chain that stops at the first failure
//! - [`FanOut`](fan_out::FanOut) for concurrent dispatch behind a join barrier
//! - [`OrderedIter`](ordered::OrderedIter) for strictly sequential iteration with a
//!   selectable failure policy

pub mod deferred;
pub mod fan_out;
pub mod ordered;
pub mod sequencer;
