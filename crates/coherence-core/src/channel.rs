//! Tracing targets for the platform's notice channels.
//!
//! Every notice the core emits goes to exactly one of these targets. The
//! engine binary routes each target to its own log file, so the channel a
//! notice is written on is part of the contract while its text is not.
//!
//! ```ignore
//! tracing::info!(target: channel::LINEAGE, identity = %id, "Symmetrized on admission");
//! ```

/// Identity lineage: admission repairs and organism imports.
pub const LINEAGE: &str = "coherence::lineage";

/// Identity integrity: failed admissions, identity collisions, skipped inputs.
pub const INTEGRITY: &str = "coherence::integrity";

/// General platform notices: loading, export, start and stop.
pub const PLATFORM: &str = "coherence::platform";

/// Convergence notices: per-iteration summaries and corpus statistics.
pub const CONVERGENCE: &str = "coherence::convergence";

/// All channels with the file stem each is written to.
pub const ALL: [(&str, &str); 4] = [
    (LINEAGE, "lineage"),
    (INTEGRITY, "integrity"),
    (PLATFORM, "platform"),
    (CONVERGENCE, "convergence"),
];
