//! Error types for ensayo
//!
//! Everything here is a construction-time failure: once an experiment
//! builds, its invocations never fail on their own account, they only relay
//! the control path's result.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Ensayo error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment wired without a control path
    #[error("experiment `{0}` has no control function\nAn experiment wraps the live path it protects; set one with `.control(..)`.")]
    MissingControl(String),

    /// Experiment wired without a candidate path
    #[error("experiment `{0}` has no candidate function\nAn experiment needs the replacement under trial; set one with `.candidate(..)`.")]
    MissingCandidate(String),

    /// Experiment name is empty
    #[error("experiment name is empty\nThe name routes published outcomes to a collector; give each experiment a distinct one.")]
    EmptyName,
}
