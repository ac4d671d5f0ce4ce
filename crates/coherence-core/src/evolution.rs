//! Population evolution loop.
//!
//! One iteration steps every organism in the registry exactly once, in
//! identity order, and then runs the population normalizer exactly once.
//! Stepping and normalization are never interleaved.
//!
//! The loop is bounded by a caller-supplied iteration count and has no
//! cancellation or timeout. Observers hook in through [`IterationCallback`];
//! they see the registry read-only.

use tracing::{debug, info};

use crate::channel;
use crate::engine::EvolutionEngine;
use crate::metric::is_stable;
use crate::registry::Registry;

/// Snapshot taken after one iteration completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationSummary {
    /// 1-based iteration number.
    pub iteration: u64,
    /// Mean xi across the registry after normalization.
    pub mean_xi: f64,
    /// Mean coherence across the registry after normalization.
    pub mean_coherence: f64,
    /// Entropy corrections applied during this iteration.
    pub corrections: u64,
    /// Organisms passing the stability predicate.
    pub stable: usize,
}

/// Result of a bounded evolution run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionSummary {
    /// Iterations executed.
    pub iterations: u64,
    /// Mean xi after the final iteration (0 when nothing ran).
    pub mean_xi: f64,
    /// Mean coherence after the final iteration.
    pub mean_coherence: f64,
    /// Engine correction count at the end of the run.
    pub corrections: u64,
    /// Organisms passing the stability predicate at the end of the run.
    pub stable_organisms: usize,
}

/// Callback invoked after each iteration completes.
pub trait IterationCallback {
    /// Called after the normalization pass of each iteration.
    fn on_iteration(&mut self, summary: &IterationSummary, registry: &Registry);
}

/// A no-op iteration callback.
pub struct NoOpCallback;

impl IterationCallback for NoOpCallback {
    fn on_iteration(&mut self, _summary: &IterationSummary, _registry: &Registry) {}
}

/// Run one iteration: step every organism, then normalize once.
pub fn run_iteration(
    registry: &mut Registry,
    engine: &mut EvolutionEngine,
    dt: f64,
    iteration: u64,
) -> IterationSummary {
    let corrections_before = engine.corrections();

    for organism in registry.iter_mut() {
        let _ = engine.step(organism, dt);
    }

    registry.normalize_population();

    let summary = IterationSummary {
        iteration,
        mean_xi: registry.mean_xi(),
        mean_coherence: registry.mean_coherence(),
        corrections: engine.corrections().saturating_sub(corrections_before),
        stable: count_stable(registry),
    };

    debug!(
        target: channel::CONVERGENCE,
        iteration,
        mean_xi = summary.mean_xi,
        mean_coherence = summary.mean_coherence,
        corrections = summary.corrections,
        stable = summary.stable,
        "Iteration complete"
    );

    summary
}

/// Evolve the whole registry for `iterations` iterations.
pub fn evolve_population(
    registry: &mut Registry,
    engine: &mut EvolutionEngine,
    iterations: u64,
    dt: f64,
    callback: &mut dyn IterationCallback,
) -> EvolutionSummary {
    info!(
        target: channel::CONVERGENCE,
        iterations,
        dt,
        organisms = registry.len(),
        "Evolving ecosystem"
    );

    let mut mean_xi = 0.0;
    for iteration in 1..=iterations {
        let summary = run_iteration(registry, engine, dt, iteration);
        mean_xi = summary.mean_xi;
        callback.on_iteration(&summary, registry);
    }

    let result = EvolutionSummary {
        iterations,
        mean_xi,
        mean_coherence: registry.mean_coherence(),
        corrections: engine.corrections(),
        stable_organisms: count_stable(registry),
    };

    info!(
        target: channel::CONVERGENCE,
        iterations,
        mean_xi = result.mean_xi,
        mean_coherence = result.mean_coherence,
        corrections = result.corrections,
        stable = result.stable_organisms,
        "Evolution complete"
    );

    result
}

fn count_stable(registry: &Registry) -> usize {
    registry
        .iter()
        .filter(|o| is_stable(&o.convergence))
        .count()
}
