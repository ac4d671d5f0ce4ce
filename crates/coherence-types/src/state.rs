//! Per-organism numeric state.
//!
//! [`StateVector6D`] is the raw six-component manifold position of an
//! organism. [`ConvergenceState`] holds the three scalars the stability
//! metric is computed from plus the lock angle.
//!
//! The stability metric `xi` is never stored. It is derived from the three
//! scalars on every read, so a read can never observe a stale value.

use serde::{Deserialize, Serialize};

use crate::constants::{
    COHERENCE_MIN, DECOHERENCE_FLOOR, DEFAULT_DECOHERENCE, PHI_THRESHOLD, THETA_HARMONIC,
    THETA_LOCK,
};

/// Compute the stability metric `xi = (coherence * consciousness) / decoherence`.
///
/// Returns `+inf` when `decoherence` is below [`DECOHERENCE_FLOOR`], so the
/// division is total over the reals.
pub const fn compute_xi(coherence: f64, consciousness: f64, decoherence: f64) -> f64 {
    if decoherence < DECOHERENCE_FLOOR {
        f64::INFINITY
    } else {
        (coherence * consciousness) / decoherence
    }
}

/// Six real-valued scalars describing an organism's manifold position.
///
/// Values are unconstrained. The vector is recomputed by each evolution
/// step rather than patched field by field from outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateVector6D {
    /// Spatial X.
    pub x: f64,
    /// Spatial Y.
    pub y: f64,
    /// Spatial Z.
    pub z: f64,
    /// Evolutionary time, advanced by `dt` each step.
    pub t: f64,
    /// Internal phase oscillation.
    pub phase: f64,
    /// Informational curvature, drifting upward with entropy.
    pub curvature: f64,
}

impl StateVector6D {
    /// Components in canonical order: x, y, z, t, phase, curvature.
    pub const fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.t, self.phase, self.curvature]
    }

    /// Euclidean norm of all six components.
    pub fn magnitude(&self) -> f64 {
        self.to_array().iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Project onto a plane using the harmonic angle.
    #[allow(clippy::suboptimal_flops)]
    pub fn project_2d(&self) -> (f64, f64) {
        let theta = THETA_HARMONIC.to_radians();
        let (sin, cos) = theta.sin_cos();
        let x = self.x * cos + self.y * sin + self.z;
        let y = self.t * cos + self.phase * sin + self.curvature;
        (x, y)
    }

    /// Project into three dimensions using the lock angle.
    ///
    /// X and Y pass through; the remaining four components fold into Z.
    #[allow(clippy::suboptimal_flops)]
    pub fn project_3d(&self) -> (f64, f64, f64) {
        let theta = THETA_LOCK.to_radians();
        let (sin, cos) = theta.sin_cos();
        let z = self.z * cos + self.t * sin + self.phase * cos + self.curvature * sin;
        (self.x, self.y, z)
    }
}

/// Inputs to the stability metric plus the relaxing lock angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceState {
    /// Coherence mirror, nominally in `[0, 1]`.
    pub coherence: f64,
    /// Consciousness mirror, `>= 0`.
    pub consciousness: f64,
    /// Decoherence mirror, `>= 0`. Values below the floor make xi infinite.
    pub decoherence: f64,
    /// Lock angle in degrees.
    pub lock_angle: f64,
}

impl Default for ConvergenceState {
    fn default() -> Self {
        Self {
            coherence: COHERENCE_MIN,
            consciousness: PHI_THRESHOLD,
            decoherence: DEFAULT_DECOHERENCE,
            lock_angle: THETA_LOCK,
        }
    }
}

impl ConvergenceState {
    /// Current value of the stability metric.
    pub const fn xi(&self) -> f64 {
        compute_xi(self.coherence, self.consciousness, self.decoherence)
    }

    /// Absolute distance of the lock angle from [`THETA_LOCK`].
    pub const fn angle_error(&self) -> f64 {
        (self.lock_angle - THETA_LOCK).abs()
    }
}
