//! # Ensayo: Production Experiment Harness
//!
//! Ensayo implements the "scientist" pattern for validating refactors and
//! rewrites against live traffic. An experiment binds a trusted `control`
//! path to a replacement `candidate`; every invocation runs both, always
//! hands the control's outcome back to the caller unchanged, and publishes
//! the paired results, errors, and timings to a collector. The candidate's
//! behavior is data, never a signal.
//!
//! ## Guarantees
//!
//! - **Control fidelity**: the wrapper's return value or error is exactly
//!   what calling the control directly would have produced.
//! - **Candidate containment**: a failing candidate is recorded in the
//!   outcome, never surfaced, never retried.
//! - **Gated overhead**: a disabled experiment is a plain control call plus
//!   one predicate evaluation.
//! - **Publish-before-return**: the collector sees the outcome before the
//!   caller sees the result, including when the control fails.
//!
//! ## Example Usage
//!
//! ```rust
//! use ensayo::Experiment;
//!
//! let experiment = Experiment::builder("shortcut-format")
//!     .control(|key: char| Ok::<_, String>(format!("Ctrl+{key}")))
//!     .candidate(|key: char| Ok(key.to_string()))
//!     .build()?;
//!
//! // The caller always gets the control's answer; the divergence goes to
//! // the publisher (by default, a single tracing warning).
//! assert_eq!(experiment.run('C')?, "Ctrl+C");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod clock;
pub mod error;
pub mod experiment;
pub mod outcome;
pub mod publish;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
#[cfg(feature = "async")]
pub use experiment::{AsyncExperiment, AsyncExperimentBuilder, ExecutionMode};
pub use experiment::{Experiment, ExperimentBuilder};
pub use outcome::{Observation, Outcome};
pub use publish::{log_divergence, Publisher};
