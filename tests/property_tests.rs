//! Property-based tests
//!
//! The load-bearing invariant: wrapping a control in an experiment never
//! changes what the caller observes, whatever the candidate or the gate
//! does. Inputs, candidate behavior, and gating are all generated.

use proptest::prelude::*;

use ensayo::{Experiment, Observation, Outcome};
use std::time::Duration;

/// Control used throughout: checked division, failing on zero divisors.
fn checked_div(args: (i64, i64)) -> Result<i64, String> {
    let (numerator, divisor) = args;
    numerator
        .checked_div(divisor)
        .ok_or_else(|| format!("cannot divide {numerator} by {divisor}"))
}

proptest! {
    /// Wrapper output == direct control output, for every combination of
    /// input, candidate behavior, and gate decision.
    #[test]
    fn wrapper_is_observationally_identical_to_control(
        numerator in any::<i64>(),
        divisor in any::<i64>(),
        candidate_fails in any::<bool>(),
        gate_open in any::<bool>(),
    ) {
        let experiment = Experiment::builder("fidelity")
            .control(checked_div)
            .candidate(move |(a, b): (i64, i64)| {
                if candidate_fails {
                    Err("candidate failure".to_string())
                } else {
                    // Wrong on purpose: the candidate result must never
                    // leak to the caller.
                    Ok(a.wrapping_sub(b))
                }
            })
            .enabled(move |_| gate_open)
            .publish(|_| ())
            .build()
            .unwrap();

        let direct = checked_div((numerator, divisor));
        let wrapped = experiment.run((numerator, divisor));
        prop_assert_eq!(direct, wrapped);
    }

    /// The published record always carries the control's exact result.
    #[test]
    fn published_outcome_mirrors_control(
        numerator in any::<i64>(),
        divisor in any::<i64>(),
    ) {
        let collected = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = collected.clone();

        let experiment = Experiment::builder("mirror")
            .control(checked_div)
            .candidate(checked_div)
            .publish(move |outcome: &Outcome<(i64, i64), i64, String>| {
                sink.lock().unwrap().push(outcome.clone());
            })
            .build()
            .unwrap();

        let direct = checked_div((numerator, divisor));
        let _ = experiment.run((numerator, divisor));

        let outcomes = collected.lock().unwrap();
        prop_assert_eq!(outcomes.len(), 1);
        match &direct {
            Ok(value) => prop_assert_eq!(outcomes[0].control_value(), Some(value)),
            Err(error) => prop_assert_eq!(outcomes[0].control_error(), Some(error)),
        }
        // Identical paths never diverge.
        prop_assert!(!outcomes[0].is_divergent());
    }

    /// Divergence is exactly "unequal success values or mismatched error
    /// presence".
    #[test]
    fn divergence_predicate_matches_definition(
        control_value in any::<i32>(),
        candidate_value in any::<i32>(),
        control_fails in any::<bool>(),
        candidate_fails in any::<bool>(),
    ) {
        let observe = |value: i32, fails: bool| -> Observation<i32, String> {
            if fails {
                Observation::Failure {
                    error: "failed".to_string(),
                    elapsed: Duration::ZERO,
                }
            } else {
                Observation::Success {
                    value,
                    elapsed: Duration::ZERO,
                }
            }
        };

        let outcome = Outcome::new(
            "predicate",
            (),
            observe(control_value, control_fails),
            Some(observe(candidate_value, candidate_fails)),
        );

        let expected = match (control_fails, candidate_fails) {
            (false, false) => control_value != candidate_value,
            (true, true) => false,
            _ => true,
        };
        prop_assert_eq!(outcome.is_divergent(), expected);
    }
}
