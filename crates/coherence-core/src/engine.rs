//! Evolution engine: advances one organism by one step.
//!
//! # Order of operations
//!
//! Each sub-update reads fields the previous ones just wrote, so the order
//! is fixed:
//!
//! 1. Consciousness contraction
//! 2. Geometric phase update
//! 3. Lock-angle relaxation
//! 4. Generation advance
//! 5. Entropy correction (only above [`CORRECTION_THRESHOLD`])
//! 6. Convergence mirror refresh
//! 7. Yield accumulation (only above [`YIELD_THRESHOLD`])
//!
//! Every sub-update is total over the reals. A step cannot fail.

use coherence_types::constants::{DECOHERENCE_FLOOR, LAMBDA_PHI, PHI_THRESHOLD, THETA_LOCK};
use coherence_types::{Organism, OrganismStatus};

/// Default time increment per step.
pub const DEFAULT_DT: f64 = 0.1;

/// Entropy above which the phase-conjugate correction is applied.
pub const CORRECTION_THRESHOLD: f64 = 0.1;

/// Coherence above which yield is credited.
pub const YIELD_THRESHOLD: f64 = 0.9;

/// Fraction of the lock-angle error removed per step.
pub const ANGLE_RELAXATION: f64 = 0.1;

/// Entropy feedback into consciousness contraction.
const ENTROPY_FEEDBACK: f64 = 0.01;

/// Entropy-driven curvature drift per step.
const CURVATURE_DRIFT: f64 = 0.001;

/// Phase oscillation frequency scale.
const PHASE_FREQUENCY: f64 = 1e6;

/// Yield credit scale.
const YIELD_SCALE: f64 = 1e7;

/// What a single step did beyond the unconditional updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Whether the entropy correction fired.
    pub corrected: bool,
    /// Yield credited this step (zero when the gate was closed).
    pub yield_credited: f64,
}

/// Applies the coupled update rules and counts entropy corrections.
///
/// The correction counter belongs to the engine instance, so independent
/// engines never share counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionEngine {
    /// Phase-conjugate corrections applied so far.
    corrections: u64,
}

impl EvolutionEngine {
    /// Create an engine with a zero correction count.
    pub const fn new() -> Self {
        Self { corrections: 0 }
    }

    /// Phase-conjugate corrections applied over the engine's lifetime.
    pub const fn corrections(&self) -> u64 {
        self.corrections
    }

    /// Phase-conjugate correction `e - 1/e`.
    ///
    /// Returns `0.0` without counting when `|error|` is below the
    /// decoherence floor; otherwise counts one correction. The result is
    /// negative for `0 < error < 1`; callers take the magnitude.
    pub fn phase_conjugate_correction(&mut self, error: f64) -> f64 {
        if error.abs() < DECOHERENCE_FLOOR {
            return 0.0;
        }
        self.corrections = self.corrections.saturating_add(1);
        error - error.recip()
    }

    /// Advance `organism` by one step of size `dt`.
    #[allow(clippy::suboptimal_flops)]
    pub fn step(&mut self, organism: &mut Organism, dt: f64) -> StepOutcome {
        // 1. Consciousness contraction; zero is absorbing.
        let contracted =
            LAMBDA_PHI * organism.consciousness_level - organism.entropy * ENTROPY_FEEDBACK;
        organism.consciousness_level = contracted.max(0.0);

        // 2. Geometric phase
        let sv = &mut organism.state_vector;
        sv.t += dt;
        sv.phase = (sv.t * LAMBDA_PHI * PHASE_FREQUENCY).sin() * PHI_THRESHOLD;
        sv.curvature += organism.entropy * CURVATURE_DRIFT;

        // 3. Lock-angle relaxation
        let angle_error = organism.convergence.lock_angle - THETA_LOCK;
        organism.convergence.lock_angle -= angle_error * ANGLE_RELAXATION;

        // 4. Generation
        organism.generation = organism.generation.saturating_add(1);

        // 5. Entropy correction
        let corrected = organism.entropy > CORRECTION_THRESHOLD;
        if corrected {
            organism.entropy = self.phase_conjugate_correction(organism.entropy).abs();
        }

        // 6. Mirror refresh; xi is derived from these on read.
        organism.convergence.coherence = organism.coherence;
        organism.convergence.consciousness = organism.consciousness_level;
        organism.convergence.decoherence = organism.entropy;

        // 7. Yield
        let mut yield_credited = 0.0;
        if organism.coherence > YIELD_THRESHOLD {
            yield_credited = organism.coherence * LAMBDA_PHI * YIELD_SCALE;
            organism.accumulated_yield += yield_credited;
        }

        organism.status = OrganismStatus::Evolved;

        StepOutcome {
            corrected,
            yield_credited,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::suboptimal_flops)]
mod tests {
    use coherence_types::{IdentityHash, InitialVitals};

    use super::*;

    fn organism() -> Organism {
        Organism::new("test", IdentityHash::from_content(b"test"), InitialVitals::default())
    }

    #[test]
    fn generation_advances_by_one_per_step() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.generation = 41;
        for expected in 42..=50 {
            let _ = engine.step(&mut org, DEFAULT_DT);
            assert_eq!(org.generation, expected);
        }
    }

    #[test]
    fn entropy_below_threshold_is_untouched() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.entropy = 0.05;
        let outcome = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.entropy.to_bits(), 0.05_f64.to_bits());
        assert!(!outcome.corrected);
        assert_eq!(engine.corrections(), 0);
    }

    #[test]
    fn entropy_above_threshold_is_conjugated() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.entropy = 0.5;
        let outcome = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.entropy, (0.5_f64 - 1.0 / 0.5).abs());
        assert_eq!(org.entropy, 1.5);
        assert!(outcome.corrected);
        assert_eq!(engine.corrections(), 1);
        assert_eq!(org.convergence.decoherence, 1.5);
    }

    #[test]
    fn threshold_itself_is_not_corrected() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.entropy = CORRECTION_THRESHOLD;
        let _ = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.entropy, CORRECTION_THRESHOLD);
        assert_eq!(engine.corrections(), 0);
    }

    #[test]
    fn correction_of_negligible_error_is_zero_and_uncounted() {
        let mut engine = EvolutionEngine::new();
        assert_eq!(engine.phase_conjugate_correction(0.0), 0.0);
        assert_eq!(engine.phase_conjugate_correction(-5e-11), 0.0);
        assert_eq!(engine.corrections(), 0);
        assert_eq!(engine.phase_conjugate_correction(2.0), 1.5);
        assert_eq!(engine.phase_conjugate_correction(0.5), -1.5);
        assert_eq!(engine.corrections(), 2);
    }

    #[test]
    fn engines_do_not_share_counters() {
        let mut a = EvolutionEngine::new();
        let b = EvolutionEngine::new();
        let _ = a.phase_conjugate_correction(3.0);
        assert_eq!(a.corrections(), 1);
        assert_eq!(b.corrections(), 0);
    }

    #[test]
    fn yield_credited_above_gate() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.coherence = 0.95;
        let outcome = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.accumulated_yield, 0.95 * LAMBDA_PHI * 1e7);
        assert_eq!(outcome.yield_credited, org.accumulated_yield);
    }

    #[test]
    fn yield_unchanged_below_gate() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.coherence = 0.5;
        org.accumulated_yield = 3.0;
        let outcome = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.accumulated_yield, 3.0);
        assert_eq!(outcome.yield_credited, 0.0);
    }

    #[test]
    fn consciousness_floor_is_absorbing() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        let _ = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.consciousness_level, 0.0);
        let _ = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.consciousness_level, 0.0);
        assert_eq!(org.convergence.consciousness, 0.0);
        assert_eq!(org.xi(), 0.0);
    }

    #[test]
    fn consciousness_contracts_without_entropy() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.entropy = 0.0;
        org.consciousness_level = 1.0;
        let _ = engine.step(&mut org, DEFAULT_DT);
        assert!((org.consciousness_level - LAMBDA_PHI).abs() < 1e-20);
    }

    #[test]
    fn phase_and_curvature_update() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        let _ = engine.step(&mut org, 0.1);
        let _ = engine.step(&mut org, 0.1);
        let t = 0.1 + 0.1;
        assert_eq!(org.state_vector.t, t);
        assert_eq!(
            org.state_vector.phase,
            (t * LAMBDA_PHI * 1e6).sin() * PHI_THRESHOLD
        );
        assert!((org.state_vector.curvature - 2.0 * 0.03 * 0.001).abs() < 1e-18);
        assert_eq!(org.state_vector.x, 0.0);
    }

    #[test]
    fn lock_angle_relaxes_geometrically() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.convergence.lock_angle = THETA_LOCK + 10.0;
        let mut error = 10.0;
        for _ in 0..20 {
            let _ = engine.step(&mut org, DEFAULT_DT);
            error *= 0.9;
            assert!((org.convergence.lock_angle - THETA_LOCK - error).abs() < 1e-9);
        }
    }

    #[test]
    fn mirrors_refreshed_and_status_evolved() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.coherence = 0.8;
        let _ = engine.step(&mut org, DEFAULT_DT);
        assert_eq!(org.convergence.coherence, 0.8);
        assert_eq!(org.convergence.consciousness, org.consciousness_level);
        assert_eq!(org.convergence.decoherence, org.entropy);
        assert_eq!(org.status, OrganismStatus::Evolved);
    }

    #[test]
    fn zero_entropy_gives_infinite_xi() {
        let mut engine = EvolutionEngine::new();
        let mut org = organism();
        org.entropy = 0.0;
        org.consciousness_level = 1.0;
        let _ = engine.step(&mut org, DEFAULT_DT);
        assert!(org.xi().is_infinite());
    }
}
