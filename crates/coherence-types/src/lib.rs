//! Shared type definitions for the coherence evolution platform.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. It holds no iteration logic: the evolution engine, the
//! registry and the population normalizer live in `coherence-core`.
//!
//! # Modules
//!
//! - [`constants`] -- Fixed numeric parameters shared by every update rule
//! - [`identity`] -- Content-derived [`IdentityHash`] fingerprints
//! - [`state`] -- [`StateVector6D`] and [`ConvergenceState`] value types
//! - [`organism`] -- The [`Organism`] entity and its lifecycle status
//! - [`real`] -- Serde helpers that keep non-finite reals lossless

pub mod constants;
pub mod identity;
pub mod organism;
pub mod real;
pub mod state;

// Re-export primary types at crate root for convenience.
pub use identity::IdentityHash;
pub use organism::{InitialVitals, Organism, OrganismStatus};
pub use state::{ConvergenceState, StateVector6D, compute_xi};
