//! Stability metric and convergence predicates.
//!
//! Everything here is a pure function of its arguments. The same predicates
//! serve the engine, the evolution loop summary, and the report builder.

use coherence_types::ConvergenceState;
use coherence_types::constants::{COHERENCE_MIN, DEFAULT_DECOHERENCE, PHI_THRESHOLD};

pub use coherence_types::compute_xi;

/// Xi must exceed this for a state to count as stable.
pub const STABLE_XI_MIN: f64 = 0.1;

/// Maximum lock-angle error, in degrees, for a state to count as stable.
pub const LOCK_TOLERANCE: f64 = 0.01;

/// Returns `true` when xi exceeds [`STABLE_XI_MIN`] and the lock angle is
/// within [`LOCK_TOLERANCE`] of the target.
///
/// Used for reporting only. It never gates an evolution step.
pub const fn is_stable(state: &ConvergenceState) -> bool {
    state.xi() > STABLE_XI_MIN && state.angle_error() < LOCK_TOLERANCE
}

/// Xi of a freshly admitted organism at the coherence minimum.
pub const fn xi_target() -> f64 {
    (COHERENCE_MIN * PHI_THRESHOLD) / DEFAULT_DECOHERENCE
}

/// Restoring force toward [`xi_target`]: `-(xi - target) * 0.01`.
pub const fn centripetal_force(xi: f64) -> f64 {
    -(xi - xi_target()) * 0.01
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use coherence_types::constants::THETA_LOCK;

    use super::*;

    #[test]
    fn default_state_is_stable() {
        assert!(is_stable(&ConvergenceState::default()));
    }

    #[test]
    fn infinite_xi_with_locked_angle_is_stable() {
        let state = ConvergenceState {
            decoherence: 0.0,
            ..ConvergenceState::default()
        };
        assert!(is_stable(&state));
    }

    #[test]
    fn low_xi_is_unstable() {
        let state = ConvergenceState {
            coherence: 0.97,
            consciousness: 0.0,
            decoherence: 0.03,
            lock_angle: THETA_LOCK,
        };
        assert_eq!(state.xi(), 0.0);
        assert!(!is_stable(&state));
    }

    #[test]
    fn drifted_angle_is_unstable() {
        let state = ConvergenceState {
            lock_angle: THETA_LOCK + 0.02,
            ..ConvergenceState::default()
        };
        assert!(!is_stable(&state));

        let state = ConvergenceState {
            lock_angle: THETA_LOCK - 0.005,
            ..ConvergenceState::default()
        };
        assert!(is_stable(&state));
    }

    #[test]
    fn centripetal_force_vanishes_at_target() {
        assert_eq!(centripetal_force(xi_target()), 0.0);
        assert!(centripetal_force(xi_target() + 100.0) < 0.0);
        assert!(centripetal_force(0.0) > 0.0);
    }

    #[test]
    fn reexported_compute_xi_matches_state() {
        let state = ConvergenceState::default();
        assert_eq!(
            compute_xi(state.coherence, state.consciousness, state.decoherence),
            state.xi()
        );
    }
}
