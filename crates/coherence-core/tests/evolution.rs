//! End-to-end tests for the coherence core: admission, stepping,
//! population normalization, and report export.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::indexing_slicing
)]

use coherence_core::evolution::{IterationCallback, IterationSummary, NoOpCallback};
use coherence_core::metric::is_stable;
use coherence_core::report::PlatformMode;
use coherence_core::{
    EvolutionEngine, PlatformReport, Registry, ReportContext, build_report, evolve_population,
};
use coherence_types::constants::{COHERENCE_MIN, LAMBDA_PHI, THETA_LOCK};
use coherence_types::{IdentityHash, InitialVitals, OrganismStatus};

#[test]
fn two_steps_from_default_admission() {
    let mut registry = Registry::new();
    let id = registry.admit("genesis", b"organism genesis").identity.clone();
    assert_eq!(registry.get(&id).unwrap().coherence, COHERENCE_MIN);

    let mut engine = EvolutionEngine::new();
    let org = registry.get_mut(&id).unwrap();
    assert_eq!(org.entropy, 0.03);
    assert_eq!(org.consciousness_level, 7.6901);

    let _ = engine.step(org, 0.1);
    let _ = engine.step(org, 0.1);

    assert_eq!(org.generation, 2);
    assert_eq!(org.entropy, 0.03);
    assert_eq!(engine.corrections(), 0);
    assert_eq!(org.status, OrganismStatus::Evolved);
    assert_eq!(org.accumulated_yield, 2.0 * (0.97 * LAMBDA_PHI * 1e7));
}

#[test]
fn identical_content_is_one_organism() {
    let mut registry = Registry::new();
    let a = registry.admit("first", b"same bytes").identity.clone();
    let b = registry.admit("second", b"same bytes").identity.clone();
    assert_eq!(a, b);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.collisions(), 1);
}

#[test]
fn population_converges_toward_mean_coherence() {
    let mut registry = Registry::new();
    let low = registry.admit("low", b"low").identity.clone();
    let high = registry.admit("high", b"high").identity.clone();
    registry.get_mut(&low).unwrap().coherence = 0.5;
    registry.get_mut(&high).unwrap().coherence = 1.0;

    let mut engine = EvolutionEngine::new();
    let summary = evolve_population(&mut registry, &mut engine, 30, 0.1, &mut NoOpCallback);

    let gap = 0.25 * 0.9_f64.powi(30);
    let low = registry.get(&low).unwrap();
    let high = registry.get(&high).unwrap();
    assert!((0.75 - low.coherence - gap).abs() < 1e-9);
    assert!((high.coherence - 0.75 - gap).abs() < 1e-9);
    assert!((summary.mean_coherence - 0.75).abs() < 1e-12);
    assert_eq!(low.generation, 30);
}

#[test]
fn lock_angle_converges_and_stability_follows_xi() {
    let vitals = InitialVitals {
        entropy: 0.0,
        ..InitialVitals::default()
    };
    let mut registry = Registry::with_vitals(vitals);
    let id = registry.admit("still", b"still").identity.clone();
    {
        let org = registry.get_mut(&id).unwrap();
        org.convergence.lock_angle = THETA_LOCK + 1.0;
    }

    let mut engine = EvolutionEngine::new();
    let _ = evolve_population(&mut registry, &mut engine, 50, 0.1, &mut NoOpCallback);

    let org = registry.get(&id).unwrap();
    assert!(org.convergence.angle_error() < 0.01);
    // Zero entropy floors decoherence, so xi is infinite and the state is stable.
    assert!(org.xi().is_infinite());
    assert!(is_stable(&org.convergence));
}

#[test]
fn callback_observes_monotone_yield() {
    struct YieldWatch {
        last: f64,
    }
    impl IterationCallback for YieldWatch {
        fn on_iteration(&mut self, _summary: &IterationSummary, registry: &Registry) {
            let total: f64 = registry.iter().map(|o| o.accumulated_yield).sum();
            assert!(total >= self.last);
            self.last = total;
        }
    }

    let mut registry = Registry::new();
    for i in 0..5 {
        let _ = registry.admit(&format!("o{i}"), format!("organism {i}").as_bytes());
    }
    let mut engine = EvolutionEngine::new();
    let mut watch = YieldWatch { last: 0.0 };
    let _ = evolve_population(&mut registry, &mut engine, 10, 0.1, &mut watch);
    assert!(watch.last > 0.0);
}

#[test]
fn exported_report_reads_back() {
    let mut registry = Registry::new();
    let _ = registry.admit("alpha", b"alpha");
    let _ = registry.admit("beta", b"beta");
    let mut engine = EvolutionEngine::new();
    let _ = evolve_population(&mut registry, &mut engine, 5, 0.1, &mut NoOpCallback);

    let mut context = ReportContext::new(chrono::Utc::now());
    context.mode = PlatformMode::Evolved;
    context.organisms_loaded = 2;
    let report = build_report(&registry, &engine, &context, chrono::Utc::now());

    let json = report.to_json().unwrap();
    let back = PlatformReport::from_json(&json).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.meta.mode, PlatformMode::Evolved);
    assert_eq!(back.organisms.len(), 2);

    let alpha = back
        .organisms
        .iter()
        .find(|o| o.identity == IdentityHash::from_content(b"alpha"))
        .unwrap();
    assert_eq!(alpha.generation, 5);
    assert_eq!(alpha.state_vector[3], registry.get(&alpha.identity).unwrap().state_vector.t);
}
