//! Read-only platform report.
//!
//! [`build_report`] snapshots a [`Registry`] and the engine's counters into
//! a serializable [`PlatformReport`] with five groups: `meta`,
//! `physics_constants`, `ecosystem`, `corpus`, and `organisms`. Building a
//! report never mutates what it reads.
//!
//! Xi values may be infinite and are written through
//! [`coherence_types::real`] so the document reads back losslessly.

use chrono::{DateTime, Utc};
use coherence_types::constants::{
    BELL_FIDELITY, COHERENCE_MIN, LAMBDA_PHI, PHI_THRESHOLD, PLANCK_LENGTH, PLANCK_TIME,
    THETA_LOCK,
};
use coherence_types::{IdentityHash, Organism, OrganismStatus};
use serde::{Deserialize, Serialize};

use crate::engine::EvolutionEngine;
use crate::metric::is_stable;
use crate::registry::Registry;

/// Platform release string carried in report metadata.
pub const PLATFORM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Coarse platform lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlatformMode {
    /// Loading organisms, nothing evolved yet.
    #[default]
    Initializing,
    /// The evolution loop has completed.
    Evolved,
}

/// Facts about the run that live outside the registry and engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// When the platform started.
    pub started_at: DateTime<Utc>,
    /// Current platform mode.
    pub mode: PlatformMode,
    /// Successful admissions during loading.
    pub organisms_loaded: u64,
    /// Jobs parsed from the workload corpus.
    pub jobs_analyzed: u64,
    /// Corpus entries skipped as malformed.
    pub skipped_malformed: u64,
}

impl ReportContext {
    /// A fresh context for a platform starting at `started_at`.
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            mode: PlatformMode::Initializing,
            organisms_loaded: 0,
            jobs_analyzed: 0,
            skipped_malformed: 0,
        }
    }
}

/// Complete exported platform state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformReport {
    /// Run metadata.
    pub meta: ReportMeta,
    /// Fixed numeric parameters.
    pub physics_constants: PhysicsConstants,
    /// Population-wide aggregates.
    pub ecosystem: EcosystemSummary,
    /// Workload corpus totals.
    pub corpus: CorpusSummary,
    /// One record per live organism, in identity order.
    pub organisms: Vec<OrganismRecord>,
}

impl PlatformReport {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a report previously rendered with [`PlatformReport::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Platform release.
    pub version: String,
    /// When the report was built.
    pub generated: DateTime<Utc>,
    /// Seconds between platform start and report generation.
    pub uptime_seconds: f64,
    /// Platform mode at generation time.
    pub mode: PlatformMode,
}

/// The fixed numeric parameters every update rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct PhysicsConstants {
    /// Memory coefficient.
    pub LAMBDA_PHI: f64,
    /// Consciousness threshold.
    pub PHI_THRESHOLD: f64,
    /// Target lock angle in degrees.
    pub THETA_LOCK: f64,
    /// Reference fidelity.
    pub BELL_FIDELITY: f64,
    /// Minimum admission coherence.
    pub COHERENCE_MIN: f64,
    /// Fundamental length scale.
    pub PLANCK_LENGTH: f64,
    /// Fundamental time scale.
    pub PLANCK_TIME: f64,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            LAMBDA_PHI,
            PHI_THRESHOLD,
            THETA_LOCK,
            BELL_FIDELITY,
            COHERENCE_MIN,
            PLANCK_LENGTH,
            PLANCK_TIME,
        }
    }
}

/// Population-wide aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcosystemSummary {
    /// Successful admissions during loading.
    pub organisms_loaded: u64,
    /// Live organisms at report time.
    pub organism_count: u64,
    /// Mean coherence across the registry.
    pub mean_coherence: f64,
    /// Mean xi across the registry.
    #[serde(with = "coherence_types::real")]
    pub mean_xi: f64,
    /// Engine-lifetime entropy corrections.
    pub corrections: u64,
    /// Admissions that replaced an existing identity.
    pub identity_collisions: u64,
    /// Organisms passing the stability predicate.
    pub stable_organisms: u64,
}

/// Workload corpus totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Jobs parsed.
    pub jobs_analyzed: u64,
    /// Entries skipped as malformed.
    pub skipped_malformed: u64,
}

/// Exported view of a single organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismRecord {
    /// Display name.
    pub name: String,
    /// Content fingerprint.
    pub identity: IdentityHash,
    /// Steps applied.
    pub generation: u64,
    /// Lifecycle status.
    pub status: OrganismStatus,
    /// Primary coherence scalar.
    pub coherence: f64,
    /// Consciousness level.
    pub consciousness_level: f64,
    /// Entropy.
    pub entropy: f64,
    /// Accumulated yield.
    pub accumulated_yield: f64,
    /// Stability metric; may be infinite.
    #[serde(with = "coherence_types::real")]
    pub xi: f64,
    /// Lock angle in degrees.
    pub lock_angle: f64,
    /// x, y, z, t, phase, curvature.
    pub state_vector: [f64; 6],
}

impl From<&Organism> for OrganismRecord {
    fn from(organism: &Organism) -> Self {
        Self {
            name: organism.name.clone(),
            identity: organism.identity.clone(),
            generation: organism.generation,
            status: organism.status,
            coherence: organism.coherence,
            consciousness_level: organism.consciousness_level,
            entropy: organism.entropy,
            accumulated_yield: organism.accumulated_yield,
            xi: organism.xi(),
            lock_angle: organism.convergence.lock_angle,
            state_vector: organism.state_vector.to_array(),
        }
    }
}

/// Snapshot `registry` and `engine` into a report generated at `now`.
pub fn build_report(
    registry: &Registry,
    engine: &EvolutionEngine,
    context: &ReportContext,
    now: DateTime<Utc>,
) -> PlatformReport {
    let uptime_seconds = now
        .signed_duration_since(context.started_at)
        .to_std()
        .map_or(0.0, |d| d.as_secs_f64());

    let organisms: Vec<OrganismRecord> = registry.iter().map(OrganismRecord::from).collect();
    let stable = registry
        .iter()
        .filter(|o| is_stable(&o.convergence))
        .count();

    PlatformReport {
        meta: ReportMeta {
            version: PLATFORM_VERSION.to_owned(),
            generated: now,
            uptime_seconds,
            mode: context.mode,
        },
        physics_constants: PhysicsConstants::default(),
        ecosystem: EcosystemSummary {
            organisms_loaded: context.organisms_loaded,
            organism_count: u64::try_from(organisms.len()).unwrap_or(u64::MAX),
            mean_coherence: registry.mean_coherence(),
            mean_xi: registry.mean_xi(),
            corrections: engine.corrections(),
            identity_collisions: registry.collisions(),
            stable_organisms: u64::try_from(stable).unwrap_or(u64::MAX),
        },
        corpus: CorpusSummary {
            jobs_analyzed: context.jobs_analyzed,
            skipped_malformed: context.skipped_malformed,
        },
        organisms,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeDelta;
    use coherence_types::InitialVitals;

    use super::*;
    use crate::engine::DEFAULT_DT;

    fn context() -> ReportContext {
        let mut ctx = ReportContext::new(DateTime::<Utc>::UNIX_EPOCH);
        ctx.organisms_loaded = 2;
        ctx.jobs_analyzed = 7;
        ctx.skipped_malformed = 1;
        ctx
    }

    #[test]
    fn report_reflects_registry_and_engine() {
        let mut registry = Registry::new();
        let _ = registry.admit("a", b"a");
        let _ = registry.admit("b", b"b");
        let mut engine = EvolutionEngine::new();
        let _ = engine.phase_conjugate_correction(2.0);

        let now = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(90);
        let report = build_report(&registry, &engine, &context(), now);

        assert_eq!(report.meta.uptime_seconds, 90.0);
        assert_eq!(report.meta.mode, PlatformMode::Initializing);
        assert_eq!(report.physics_constants.THETA_LOCK, 51.843);
        assert_eq!(report.ecosystem.organism_count, 2);
        assert_eq!(report.ecosystem.organisms_loaded, 2);
        assert_eq!(report.ecosystem.corrections, 1);
        assert_eq!(report.ecosystem.mean_coherence, registry.mean_coherence());
        assert_eq!(report.corpus.jobs_analyzed, 7);
        assert_eq!(report.corpus.skipped_malformed, 1);
        assert_eq!(report.organisms.len(), 2);
    }

    #[test]
    fn building_does_not_mutate() {
        let mut registry = Registry::new();
        let _ = registry.admit("a", b"a");
        let engine = EvolutionEngine::new();
        let before = registry.clone();
        let _ = build_report(&registry, &engine, &context(), Utc::now());
        let a: Vec<&Organism> = before.iter().collect();
        let b: Vec<&Organism> = registry.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn infinite_xi_round_trips() {
        let vitals = InitialVitals {
            entropy: 0.0,
            ..InitialVitals::default()
        };
        let mut registry = Registry::with_vitals(vitals);
        let id = registry.admit("still", b"still").identity.clone();
        let mut engine = EvolutionEngine::new();
        {
            let org = registry.get_mut(&id).unwrap();
            org.consciousness_level = 1.0;
            let _ = engine.step(org, DEFAULT_DT);
            assert!(org.xi().is_infinite());
        }

        let report = build_report(&registry, &engine, &context(), Utc::now());
        assert!(report.ecosystem.mean_xi.is_infinite());

        let json = report.to_json().unwrap();
        let back = PlatformReport::from_json(&json).unwrap();
        assert_eq!(back, report);
        assert!(back.organisms.first().unwrap().xi.is_infinite());
    }

    #[test]
    fn finite_fields_round_trip_exactly() {
        let mut registry = Registry::new();
        let _ = registry.admit("a", b"a");
        let mut engine = EvolutionEngine::new();
        for org in registry.iter_mut() {
            for _ in 0..3 {
                let _ = engine.step(org, DEFAULT_DT);
            }
        }
        let report = build_report(&registry, &engine, &context(), Utc::now());
        let back = PlatformReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn report_has_five_top_level_groups() {
        let registry = Registry::new();
        let engine = EvolutionEngine::new();
        let report = build_report(&registry, &engine, &context(), Utc::now());
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        for key in ["meta", "physics_constants", "ecosystem", "corpus", "organisms"] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(
            value["physics_constants"]
                .as_object()
                .unwrap()
                .contains_key("LAMBDA_PHI")
        );
    }

    #[test]
    fn uptime_never_negative() {
        let registry = Registry::new();
        let engine = EvolutionEngine::new();
        let ctx = ReportContext::new(Utc::now() + TimeDelta::seconds(60));
        let report = build_report(&registry, &engine, &ctx, Utc::now());
        assert_eq!(report.meta.uptime_seconds, 0.0);
    }
}
