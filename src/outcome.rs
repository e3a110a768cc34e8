//! Per-invocation experiment records
//!
//! Two types carry everything an invocation observed: [`Observation`] is
//! what one executed path did (value or error, plus elapsed time), and
//! [`Outcome`] aggregates both paths into the immutable record handed to the
//! publisher. Aggregation is pure construction: nothing is compared, cloned,
//! or logged while building a record.

use std::time::Duration;

use crate::clock::Clock;

/// What one executed path (control or candidate) did.
///
/// The tagged form makes "exactly one of value/error per executed path"
/// structurally true, and holds the error by value with its original
/// identity: nothing is wrapped or re-boxed on the way to the publisher or
/// back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Observation<T, E> {
    /// The path returned a value.
    Success {
        /// The returned value.
        value: T,
        /// Time from just before the call to just after it returned.
        elapsed: Duration,
    },
    /// The path returned an error.
    Failure {
        /// The returned error, unchanged.
        error: E,
        /// Time from just before the call to just after it failed.
        elapsed: Duration,
    },
}

impl<T, E> Observation<T, E> {
    /// Run `path` under a scoped time measurement and capture its result.
    pub fn capture<F>(clock: &dyn Clock, path: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
    {
        let start = clock.now();
        let result = path();
        let elapsed = clock.now().saturating_sub(start);
        Self::from_result(result, elapsed)
    }

    /// Await `path` under a scoped time measurement and capture its result.
    ///
    /// The measurement starts when the returned future is first polled and
    /// stops when the inner future settles, so two captures driven jointly
    /// have overlapping, individually accurate windows.
    #[cfg(feature = "async")]
    pub async fn capture_future<F>(clock: &dyn Clock, path: F) -> Self
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        let start = clock.now();
        let result = path.await;
        let elapsed = clock.now().saturating_sub(start);
        Self::from_result(result, elapsed)
    }

    fn from_result(result: Result<T, E>, elapsed: Duration) -> Self {
        match result {
            Ok(value) => Self::Success { value, elapsed },
            Err(error) => Self::Failure { error, elapsed },
        }
    }

    /// Elapsed time of this path, success or failure.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed, .. } | Self::Failure { elapsed, .. } => *elapsed,
        }
    }

    /// True iff the path returned a value.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True iff the path returned an error.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// The returned value, if the path succeeded.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The returned error, if the path failed.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        match self {
            Self::Failure { error, .. } => Some(error),
            Self::Success { .. } => None,
        }
    }

    /// Unwrap back into the underlying result, dropping the timing.
    ///
    /// The value or error moves out unchanged; this is how the control
    /// path's outcome reaches the caller.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

/// Aggregated record of one experiment invocation.
///
/// Created fresh per enabled invocation, never mutated afterwards, handed
/// once by reference to the publisher, then consumed via
/// [`into_control`](Self::into_control). The control observation is always
/// present (the control always runs); the candidate observation is `None`
/// iff the gate kept the candidate from running.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Outcome<A, T, E> {
    name: String,
    args: A,
    control: Observation<T, E>,
    candidate: Option<Observation<T, E>>,
}

impl<A, T, E> Outcome<A, T, E> {
    /// Aggregate one invocation's observations into a record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        args: A,
        control: Observation<T, E>,
        candidate: Option<Observation<T, E>>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            control,
            candidate,
        }
    }

    /// Name of the experiment that produced this record.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The exact argument bundle the caller passed.
    #[must_use]
    pub const fn args(&self) -> &A {
        &self.args
    }

    /// The control path's observation.
    #[must_use]
    pub const fn control(&self) -> &Observation<T, E> {
        &self.control
    }

    /// The candidate path's observation; `None` iff the candidate did not run.
    #[must_use]
    pub const fn candidate(&self) -> Option<&Observation<T, E>> {
        self.candidate.as_ref()
    }

    /// Control value, if the control succeeded.
    #[must_use]
    pub const fn control_value(&self) -> Option<&T> {
        self.control.value()
    }

    /// Control error, if the control failed.
    #[must_use]
    pub const fn control_error(&self) -> Option<&E> {
        self.control.error()
    }

    /// Candidate value, if the candidate ran and succeeded.
    #[must_use]
    pub const fn candidate_value(&self) -> Option<&T> {
        match &self.candidate {
            Some(observation) => observation.value(),
            None => None,
        }
    }

    /// Candidate error, if the candidate ran and failed.
    #[must_use]
    pub const fn candidate_error(&self) -> Option<&E> {
        match &self.candidate {
            Some(observation) => observation.error(),
            None => None,
        }
    }

    /// Control elapsed time.
    #[must_use]
    pub const fn control_elapsed(&self) -> Duration {
        self.control.elapsed()
    }

    /// Candidate elapsed time; `None` iff the candidate did not run.
    #[must_use]
    pub const fn candidate_elapsed(&self) -> Option<Duration> {
        match &self.candidate {
            Some(observation) => Some(observation.elapsed()),
            None => None,
        }
    }

    /// Extract the control path's result for delivery to the caller.
    ///
    /// Moves the control's value or error out unchanged; the candidate
    /// observation is dropped with the record.
    pub fn into_control(self) -> Result<T, E> {
        self.control.into_result()
    }
}

impl<A, T: PartialEq, E> Outcome<A, T, E> {
    /// Whether the two paths disagreed.
    ///
    /// True iff the candidate ran and either both paths succeeded with
    /// unequal values, or exactly one of the two failed. Error values are
    /// never compared; mismatched error *presence* is the signal.
    #[must_use]
    pub fn is_divergent(&self) -> bool {
        let Some(candidate) = &self.candidate else {
            return false;
        };
        match (&self.control, candidate) {
            (
                Observation::Success { value: control, .. },
                Observation::Success {
                    value: candidate, ..
                },
            ) => control != candidate,
            (Observation::Failure { .. }, Observation::Failure { .. }) => false,
            _ => true,
        }
    }
}
