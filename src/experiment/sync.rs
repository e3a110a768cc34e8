//! Synchronous execution strategy

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::Gate;
use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::outcome::{Observation, Outcome};
use crate::publish::{self, Publisher};

type PathFn<A, T, E> = Box<dyn Fn(A) -> Result<T, E> + Send + Sync>;

/// A built synchronous experiment.
///
/// Produced by [`Experiment::builder`]. [`run`](Self::run) behaves exactly
/// like calling the control directly, plus the candidate execution and the
/// publish side effect. Failure means returning `Err`; panics in either
/// path are not caught and unwind through the call.
pub struct Experiment<A, T, E> {
    name: String,
    control: PathFn<A, T, E>,
    candidate: PathFn<A, T, E>,
    enabled: Gate<A>,
    publish: Publisher<A, T, E>,
    clock: Arc<dyn Clock>,
}

impl<A, T, E> Experiment<A, T, E> {
    /// Start building an experiment with the given diagnostic name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ExperimentBuilder<A, T, E> {
        ExperimentBuilder::new(name)
    }

    /// Experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A: Clone, T, E> Experiment<A, T, E> {
    /// Run one invocation.
    ///
    /// The gate predicate sees the caller's exact arguments, once. When it
    /// allows the experiment, the candidate runs first under its own timing
    /// (a control failure can therefore never skip it), then the control,
    /// then the outcome is aggregated and published, and finally the
    /// control's exact value or error is returned. When the gate is closed
    /// the call degenerates to a plain control invocation with no timing and
    /// no publish.
    ///
    /// # Errors
    ///
    /// Exactly the control path's error, unchanged. Candidate errors are
    /// recorded in the published outcome and never returned.
    pub fn run(&self, args: A) -> Result<T, E> {
        if !(self.enabled)(&args) {
            trace!(experiment = %self.name, "gate closed, control only");
            return (self.control)(args);
        }

        let candidate =
            Observation::capture(self.clock.as_ref(), || (self.candidate)(args.clone()));
        let control = Observation::capture(self.clock.as_ref(), || (self.control)(args.clone()));

        let outcome = Outcome::new(self.name.clone(), args, control, Some(candidate));
        (self.publish)(&outcome);
        outcome.into_control()
    }
}

impl<A, T, E> fmt::Debug for Experiment<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Experiment`].
///
/// `control` and `candidate` are required. Everything else defaults:
/// always-open gate, [`log_divergence`](crate::publish::log_divergence)
/// publisher, [`SystemClock`] timing source. Defaults are applied once at
/// [`build`](Self::build), never re-derived per call.
pub struct ExperimentBuilder<A, T, E> {
    name: String,
    control: Option<PathFn<A, T, E>>,
    candidate: Option<PathFn<A, T, E>>,
    enabled: Option<Gate<A>>,
    publish: Option<Publisher<A, T, E>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<A, T, E> ExperimentBuilder<A, T, E> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: None,
            candidate: None,
            enabled: None,
            publish: None,
            clock: None,
        }
    }

    /// Set the control: the live path whose outcome the caller receives.
    #[must_use]
    pub fn control<F>(mut self, control: F) -> Self
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    {
        self.control = Some(Box::new(control));
        self
    }

    /// Set the candidate: the replacement under trial. Its results and
    /// errors are recorded, never surfaced.
    #[must_use]
    pub fn candidate<F>(mut self, candidate: F) -> Self
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    {
        self.candidate = Some(Box::new(candidate));
        self
    }

    /// Set the enablement gate. Defaults to always enabled.
    ///
    /// One predicate call per invocation decides both whether the candidate
    /// runs and whether the outcome is published.
    #[must_use]
    pub fn enabled<F>(mut self, enabled: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.enabled = Some(Box::new(enabled));
        self
    }

    /// Set the publisher receiving each enabled invocation's outcome.
    /// Defaults to [`log_divergence`](crate::publish::log_divergence).
    #[must_use]
    pub fn publish<F>(mut self, publish: F) -> Self
    where
        F: Fn(&Outcome<A, T, E>) + Send + Sync + 'static,
    {
        self.publish = Some(Box::new(publish));
        self
    }

    /// Inject the timing source. Defaults to [`SystemClock`].
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }
}

impl<A: 'static, T: PartialEq + 'static, E: 'static> ExperimentBuilder<A, T, E> {
    /// Validate and assemble the experiment.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyName`], [`Error::MissingControl`], or
    /// [`Error::MissingCandidate`] when the corresponding piece is absent.
    pub fn build(self) -> Result<Experiment<A, T, E>, Error> {
        let Self {
            name,
            control,
            candidate,
            enabled,
            publish,
            clock,
        } = self;

        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let control = control.ok_or_else(|| Error::MissingControl(name.clone()))?;
        let candidate = candidate.ok_or_else(|| Error::MissingCandidate(name.clone()))?;

        Ok(Experiment {
            name,
            control,
            candidate,
            enabled: enabled.unwrap_or_else(|| Box::new(|_| true)),
            publish: publish.unwrap_or_else(|| Box::new(publish::log_divergence)),
            clock: clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
        })
    }
}

impl<A, T, E> fmt::Debug for ExperimentBuilder<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentBuilder")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_build_rejects_empty_name() {
        let result = Experiment::builder("")
            .control(|x: i32| Ok::<_, String>(x))
            .candidate(|x: i32| Ok(x))
            .build();
        assert!(matches!(result, Err(Error::EmptyName)));
    }

    #[test]
    fn test_build_rejects_missing_control() {
        let result = ExperimentBuilder::<i32, i32, String>::new("half-built")
            .candidate(|x| Ok(x))
            .build();
        assert!(matches!(result, Err(Error::MissingControl(name)) if name == "half-built"));
    }

    #[test]
    fn test_build_rejects_missing_candidate() {
        let result = ExperimentBuilder::<i32, i32, String>::new("half-built")
            .control(|x| Ok(x))
            .build();
        assert!(matches!(result, Err(Error::MissingCandidate(name)) if name == "half-built"));
    }

    #[test]
    fn test_gate_sees_exact_args_exactly_once() {
        let gate_calls = Arc::new(AtomicUsize::new(0));
        let seen = gate_calls.clone();

        let experiment = Experiment::builder("gate-count")
            .control(|(a, b): (i32, i32)| Ok::<_, String>(a + b))
            .candidate(|(a, b): (i32, i32)| Ok(b + a))
            .enabled(move |args: &(i32, i32)| {
                assert_eq!(args, &(4, 5));
                seen.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build()
            .unwrap();

        assert_eq!(experiment.run((4, 5)), Ok(9));
        assert_eq!(gate_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_name_accessor() {
        let experiment = Experiment::builder("named")
            .control(|(): ()| Ok::<_, String>(0))
            .candidate(|(): ()| Ok(0))
            .build()
            .unwrap();
        assert_eq!(experiment.name(), "named");
    }
}
