//! Asynchronous execution strategy
//!
//! Mirrors the synchronous strategy for paths that return futures. The two
//! paths are driven either jointly (both timed wrappers are created before
//! either is awaited, so their measurement windows overlap) or sequentially,
//! for paths sharing non-reentrant resources. "Parallel" here is cooperative
//! interleaving on the caller's task, not threads: no work is spawned, and
//! the call does not return until both paths have settled.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::trace;

use super::Gate;
use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::outcome::{Observation, Outcome};
use crate::publish::{self, Publisher};

type AsyncPathFn<A, T, E> = Box<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// How the two paths of an [`AsyncExperiment`] are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Start both timed tasks together and await their joint completion.
    /// Wall-clock cost is roughly the slower of the two paths.
    #[default]
    Parallel,
    /// Await the candidate to settlement before starting the control, for
    /// paths sharing non-reentrant resources. Wall-clock cost is additive.
    Sequential,
}

/// A built asynchronous experiment.
///
/// Produced by [`AsyncExperiment::builder`]. [`run`](Self::run) resolves or
/// fails with exactly what awaiting the control directly would have
/// produced. Failure means resolving to `Err`; panics in either path are
/// not caught and unwind through the call.
pub struct AsyncExperiment<A, T, E> {
    name: String,
    control: AsyncPathFn<A, T, E>,
    candidate: AsyncPathFn<A, T, E>,
    enabled: Gate<A>,
    publish: Publisher<A, T, E>,
    clock: Arc<dyn Clock>,
    mode: ExecutionMode,
}

impl<A, T, E> AsyncExperiment<A, T, E> {
    /// Start building an experiment with the given diagnostic name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> AsyncExperimentBuilder<A, T, E> {
        AsyncExperimentBuilder::new(name)
    }

    /// Experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

impl<A: Clone, T, E> AsyncExperiment<A, T, E> {
    /// Run one invocation.
    ///
    /// Same contract as [`Experiment::run`](crate::Experiment::run), with
    /// the candidate/control interleaving picked by [`ExecutionMode`]. In
    /// parallel mode the call waits for *both* tasks to settle before
    /// publishing and returning, even when the control finishes first: a
    /// slow candidate delays the caller in every mode.
    ///
    /// # Errors
    ///
    /// Exactly the control path's error, unchanged. Candidate errors are
    /// recorded in the published outcome and never returned.
    pub async fn run(&self, args: A) -> Result<T, E> {
        if !(self.enabled)(&args) {
            trace!(experiment = %self.name, "gate closed, control only");
            return (self.control)(args).await;
        }

        let clock = self.clock.as_ref();
        let (control, candidate) = match self.mode {
            ExecutionMode::Parallel => {
                // join! polls in listed order: the candidate is never
                // behind the control.
                let (candidate, control) = tokio::join!(
                    Observation::capture_future(clock, (self.candidate)(args.clone())),
                    Observation::capture_future(clock, (self.control)(args.clone())),
                );
                (control, candidate)
            }
            ExecutionMode::Sequential => {
                let candidate =
                    Observation::capture_future(clock, (self.candidate)(args.clone())).await;
                let control =
                    Observation::capture_future(clock, (self.control)(args.clone())).await;
                (control, candidate)
            }
        };

        let outcome = Outcome::new(self.name.clone(), args, control, Some(candidate));
        (self.publish)(&outcome);
        outcome.into_control()
    }
}

impl<A, T, E> fmt::Debug for AsyncExperiment<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncExperiment")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AsyncExperiment`].
///
/// `control` and `candidate` are required. Everything else defaults:
/// always-open gate, [`log_divergence`](crate::publish::log_divergence)
/// publisher, [`SystemClock`] timing source, [`ExecutionMode::Parallel`].
pub struct AsyncExperimentBuilder<A, T, E> {
    name: String,
    control: Option<AsyncPathFn<A, T, E>>,
    candidate: Option<AsyncPathFn<A, T, E>>,
    enabled: Option<Gate<A>>,
    publish: Option<Publisher<A, T, E>>,
    clock: Option<Arc<dyn Clock>>,
    mode: ExecutionMode,
}

impl<A, T, E> AsyncExperimentBuilder<A, T, E> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: None,
            candidate: None,
            enabled: None,
            publish: None,
            clock: None,
            mode: ExecutionMode::default(),
        }
    }

    /// Set the control: the live path whose outcome the caller receives.
    #[must_use]
    pub fn control<F, Fut>(mut self, control: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.control = Some(Box::new(move |args| control(args).boxed()));
        self
    }

    /// Set the candidate: the replacement under trial. Its results and
    /// errors are recorded, never surfaced.
    #[must_use]
    pub fn candidate<F, Fut>(mut self, candidate: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.candidate = Some(Box::new(move |args| candidate(args).boxed()));
        self
    }

    /// Set the enablement gate. Defaults to always enabled.
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

    /// Pick how the two paths interleave. Defaults to
    /// [`ExecutionMode::Parallel`].
    #[must_use]
    pub const fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }
}

impl<A: 'static, T: PartialEq + 'static, E: 'static> AsyncExperimentBuilder<A, T, E> {
    /// Validate and assemble the experiment.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyName`], [`Error::MissingControl`], or
    /// [`Error::MissingCandidate`] when the corresponding piece is absent.
    pub fn build(self) -> Result<AsyncExperiment<A, T, E>, Error> {
        let Self {
            name,
            control,
            candidate,
            enabled,
            publish,
            clock,
            mode,
        } = self;

        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let control = control.ok_or_else(|| Error::MissingControl(name.clone()))?;
        let candidate = candidate.ok_or_else(|| Error::MissingCandidate(name.clone()))?;

        Ok(AsyncExperiment {
            name,
            control,
            candidate,
            enabled: enabled.unwrap_or_else(|| Box::new(|_| true)),
            publish: publish.unwrap_or_else(|| Box::new(publish::log_divergence)),
            clock: clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            mode,
        })
    }
}

impl<A, T, E> fmt::Debug for AsyncExperimentBuilder<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncExperimentBuilder")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
