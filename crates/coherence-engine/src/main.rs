//! Platform binary for the coherence simulation.
//!
//! Wires configuration, logging, organism loading, corpus analysis, the
//! evolution loop, the status display, and the report export together. It
//! runs once to completion; there is no daemon mode.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `coherence-config.yaml`
//! 2. Create the platform directory layout
//! 3. Initialize structured logging (stdout plus per-channel files)
//! 4. Import uploads, if an upload directory is configured
//! 5. Scan the workload corpus
//! 6. Admit every organism source
//! 7. Evolve the population
//! 8. Build the report, show the status display, and export it

mod corpus;
mod error;
mod export;
mod hud;
mod loader;
mod logging;

use std::fs;
use std::path::Path;

use chrono::Utc;
use coherence_core::channel;
use coherence_core::config::PlatformConfig;
use coherence_core::evolution::NoOpCallback;
use coherence_core::{
    EvolutionEngine, PlatformMode, Registry, ReportContext, build_report, evolve_population,
};
use tracing::info;

use crate::error::EngineError;
use crate::loader::FsSourceLoader;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "coherence-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, directory setup, logging, corpus
/// listing, or the export fails. Individual malformed organisms or corpus
/// entries are counted and logged instead.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Utc::now();

    // 1. Load configuration.
    let config = load_config()?;

    // 2. Create the directory layout.
    for dir in config.paths.platform_dirs() {
        fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
    }

    // 3. Initialize structured logging.
    logging::init(&config.logging, &config.paths.logs_dir())?;
    info!(
        target: channel::PLATFORM,
        version = coherence_core::report::PLATFORM_VERSION,
        root = %config.paths.root.display(),
        iterations = config.evolution.iterations,
        dt = config.evolution.dt,
        "coherence-engine starting"
    );

    let mut context = ReportContext::new(started_at);

    // 4. Import uploads.
    if let Some(uploads) = &config.paths.uploads {
        let imported =
            loader::import_uploads(uploads, &config.paths.organisms_dir(), &config.paths.sdk_dir())?;
        info!(
            target: channel::PLATFORM,
            organisms = imported.organisms,
            sdk_files = imported.sdk_files,
            "Uploads imported"
        );
    }

    // 5. Scan the workload corpus.
    let corpus_dir = config
        .paths
        .corpus
        .clone()
        .unwrap_or_else(|| config.paths.workloads_dir());
    let corpus_stats = corpus::scan_corpus(&corpus_dir).map_err(EngineError::from)?;
    corpus::log_stats(&corpus_stats);
    context.jobs_analyzed = corpus_stats.total_jobs;
    context.skipped_malformed = corpus_stats.skipped_malformed;

    // 6. Admit organisms.
    let mut registry = Registry::with_vitals(config.admission.initial_vitals());
    let loaded = loader::scan_organisms(&config.paths.organisms_dir(), &mut registry, &FsSourceLoader)?;
    context.organisms_loaded = loaded.loaded;

    // 7. Evolve.
    let mut engine = EvolutionEngine::new();
    if registry.is_empty() {
        info!(target: channel::PLATFORM, "No organisms loaded, skipping evolution");
    } else {
        let summary = evolve_population(
            &mut registry,
            &mut engine,
            config.evolution.iterations,
            config.evolution.dt,
            &mut NoOpCallback,
        );
        context.mode = PlatformMode::Evolved;
        info!(
            target: channel::PLATFORM,
            iterations = summary.iterations,
            stable = summary.stable_organisms,
            "Ecosystem evolved"
        );
    }

    // 8. Report, display, export.
    let report = build_report(&registry, &engine, &context, Utc::now());
    hud::show(&report, &corpus_stats);
    let path = export::export_report(&report, &config.paths.output_dir())?;

    info!(
        target: channel::PLATFORM,
        path = %path.display(),
        organisms = report.ecosystem.organism_count,
        corrections = report.ecosystem.corrections,
        "coherence-engine finished"
    );
    Ok(())
}

/// Load configuration from `coherence-config.yaml`, falling back to the
/// defaults (with environment overrides) when the file is absent.
fn load_config() -> Result<PlatformConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok(PlatformConfig::from_file(config_path)?)
    } else {
        let mut config = PlatformConfig::default();
        config.paths.apply_env_overrides();
        Ok(config)
    }
}
