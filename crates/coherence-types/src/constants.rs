//! Fixed numeric parameters.
//!
//! These are plain coefficients of deterministic formulas. They are not
//! tunable at runtime and appear verbatim in every exported report.

/// Memory coefficient used by the consciousness contraction and yield rules.
pub const LAMBDA_PHI: f64 = 2.176_435e-8;

/// Consciousness threshold; also the amplitude of the phase oscillation.
pub const PHI_THRESHOLD: f64 = 7.6901;

/// Target lock angle, in degrees, every organism relaxes toward.
pub const THETA_LOCK: f64 = 51.843;

/// Harmonic angle, in degrees, used by the 2D projection.
pub const THETA_HARMONIC: f64 = 51.427;

/// Reference fidelity carried in reports.
pub const BELL_FIDELITY: f64 = 0.869;

/// Minimum coherence an organism is admitted with before repair.
pub const COHERENCE_MIN: f64 = 0.97;

/// Fundamental length scale carried in reports.
pub const PLANCK_LENGTH: f64 = 1.616e-35;

/// Fundamental time scale carried in reports.
pub const PLANCK_TIME: f64 = 5.391e-44;

/// Decoherence below this value is treated as zero when computing xi.
pub const DECOHERENCE_FLOOR: f64 = 1e-10;

/// Decoherence of a freshly constructed [`ConvergenceState`].
///
/// [`ConvergenceState`]: crate::ConvergenceState
pub const DEFAULT_DECOHERENCE: f64 = 0.001;

/// Starting entropy of an admitted organism.
pub const DEFAULT_ENTROPY: f64 = 0.03;
