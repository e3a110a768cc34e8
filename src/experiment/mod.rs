//! Experiment strategies
//!
//! [`Experiment`] drives synchronous paths; [`AsyncExperiment`] (feature
//! `async`, on by default) drives paths that return futures, in a parallel
//! or sequential [`ExecutionMode`]. Both are assembled once through a
//! builder, hold no per-call state beyond their configuration, and are safe
//! for concurrent reentrant use: each invocation owns its own observations
//! and outcome.
//!
//! The shared contract, whatever the strategy:
//!
//! 1. The enablement gate is evaluated exactly once with the caller's
//!    arguments; a closed gate turns the call into a bare control
//!    invocation.
//! 2. Candidate work starts no later than control work and its failures are
//!    contained as data.
//! 3. The outcome is aggregated and published before the control's value or
//!    error is delivered to the caller.

#[cfg(feature = "async")]
mod future;
mod sync;

#[cfg(feature = "async")]
pub use future::{AsyncExperiment, AsyncExperimentBuilder, ExecutionMode};
pub use sync::{Experiment, ExperimentBuilder};

/// Boxed enablement predicate deciding, per call, whether the candidate
/// runs and the outcome is published.
pub(crate) type Gate<A> = Box<dyn Fn(&A) -> bool + Send + Sync>;
