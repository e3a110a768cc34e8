//! Outcome publishing
//!
//! The publisher is the collector boundary: it receives each enabled
//! invocation's [`Outcome`] by reference, synchronously, at most once, and
//! always before the control's result is relayed to the caller.
//!
//! Publishers are trusted caller code. The engine does not wrap the publish
//! call in any failure isolation: a panicking publisher unwinds straight
//! through `run`, uncontained. Callers who need a fault-tolerant collector
//! must isolate faults inside the callback itself.

use tracing::warn;

use crate::outcome::Outcome;

/// Boxed publish callback held by an experiment.
pub type Publisher<A, T, E> = Box<dyn Fn(&Outcome<A, T, E>) + Send + Sync>;

/// Default publisher: one warning iff the outcome diverged.
///
/// Matching invocations stay silent, so an experiment that agrees with its
/// control has no log footprint at all.
pub fn log_divergence<A, T: PartialEq, E>(outcome: &Outcome<A, T, E>) {
    if outcome.is_divergent() {
        warn!(
            experiment = outcome.name(),
            control_ms = outcome.control_elapsed().as_secs_f64() * 1e3,
            candidate_ms = outcome.candidate_elapsed().map(|d| d.as_secs_f64() * 1e3),
            "control and candidate diverged"
        );
    }
}
