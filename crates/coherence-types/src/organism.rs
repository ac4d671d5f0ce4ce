//! The organism entity.
//!
//! An [`Organism`] is created once at admission, mutated in place by the
//! evolution engine and the population normalizer, and destroyed only by
//! removal from the registry.

use serde::{Deserialize, Serialize};

use crate::constants::{COHERENCE_MIN, DEFAULT_ENTROPY, PHI_THRESHOLD};
use crate::identity::IdentityHash;
use crate::state::{ConvergenceState, StateVector6D};

/// Lifecycle status of an organism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganismStatus {
    /// Admitted but not yet stepped.
    #[default]
    Initializing,
    /// Stepped at least once.
    Evolved,
}

/// Scalars an organism starts with at admission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialVitals {
    /// Starting coherence.
    pub coherence: f64,
    /// Starting entropy.
    pub entropy: f64,
    /// Starting consciousness level.
    pub consciousness: f64,
}

impl Default for InitialVitals {
    fn default() -> Self {
        Self {
            coherence: COHERENCE_MIN,
            entropy: DEFAULT_ENTROPY,
            consciousness: PHI_THRESHOLD,
        }
    }
}

/// A single evolving entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    /// Display name (usually the source file stem). Not part of identity.
    pub name: String,
    /// Content fingerprint, fixed at admission.
    pub identity: IdentityHash,
    /// Number of evolution steps applied so far.
    pub generation: u64,
    /// Raw manifold position.
    pub state_vector: StateVector6D,
    /// Inputs to the stability metric.
    pub convergence: ConvergenceState,
    /// Primary coherence scalar, subject to repair and population pull.
    pub coherence: f64,
    /// Disorder scalar, `>= 0`.
    pub entropy: f64,
    /// Consciousness level, `>= 0`. Zero is absorbing.
    pub consciousness_level: f64,
    /// Credited while coherence is high. Never decreases.
    pub accumulated_yield: f64,
    /// Lifecycle status.
    pub status: OrganismStatus,
}

impl Organism {
    /// Create a generation-0 organism with a default [`ConvergenceState`].
    pub fn new(name: impl Into<String>, identity: IdentityHash, vitals: InitialVitals) -> Self {
        Self {
            name: name.into(),
            identity,
            generation: 0,
            state_vector: StateVector6D::default(),
            convergence: ConvergenceState::default(),
            coherence: vitals.coherence,
            entropy: vitals.entropy,
            consciousness_level: vitals.consciousness,
            accumulated_yield: 0.0,
            status: OrganismStatus::Initializing,
        }
    }

    /// Current stability metric, derived from [`Organism::convergence`].
    pub const fn xi(&self) -> f64 {
        self.convergence.xi()
    }

    /// Copy the primary coherence scalar into the convergence state.
    ///
    /// Consciousness and decoherence mirrors are left as they are.
    pub const fn mirror_coherence(&mut self) {
        self.convergence.coherence = self.coherence;
    }
}
