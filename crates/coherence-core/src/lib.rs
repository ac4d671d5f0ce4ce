//! Entity registry, evolution engine, and population normalization for the
//! coherence platform.
//!
//! This crate owns every piece of iterative logic. It performs no file or
//! network I/O of its own: organism sources arrive through the
//! [`SourceLoader`] seam, and reports leave as plain values.
//!
//! # Modules
//!
//! - [`channel`] -- Tracing targets for the four notice channels.
//! - [`config`] -- Configuration loading from `coherence-config.yaml`.
//! - [`engine`] -- [`EvolutionEngine`]: the per-organism update step and
//!   its correction counter.
//! - [`evolution`] -- The population loop: step everyone, then normalize.
//! - [`metric`] -- Stability metric and convergence predicates.
//! - [`registry`] -- [`Registry`]: admission, repair, population mean, and
//!   the damped consensus pass.
//! - [`report`] -- Read-only snapshot of a registry and engine counters.
//!
//! [`EvolutionEngine`]: engine::EvolutionEngine
//! [`Registry`]: registry::Registry
//! [`SourceLoader`]: registry::SourceLoader

pub mod channel;
pub mod config;
pub mod engine;
pub mod evolution;
pub mod metric;
pub mod registry;
pub mod report;

pub use engine::{EvolutionEngine, StepOutcome};
pub use evolution::{EvolutionSummary, IterationCallback, IterationSummary, evolve_population};
pub use registry::{AdmissionError, Registry, SourceLoader};
pub use report::{PlatformMode, PlatformReport, ReportContext, build_report};
