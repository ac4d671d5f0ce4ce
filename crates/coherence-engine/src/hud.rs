//! Terminal status display.
//!
//! Everything here renders to a `String`; the only side effect is the
//! final `print!` in [`show`].

use std::fmt::Write as _;

use coherence_core::report::PlatformReport;

use crate::corpus::CorpusStats;

/// Cells in the coherence bar.
pub const BAR_WIDTH: usize = 30;

/// Sample jobs listed under the corpus section.
pub const RECENT_JOBS: usize = 5;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BOLD_MAGENTA: &str = "\x1b[1;35m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const BOLD_YELLOW: &str = "\x1b[1;33m";
const BOLD_RED: &str = "\x1b[1;31m";

const RULE: &str = "════════════════════════════════════════════════════════════";

/// Render a coherence value in `[0, 1]` as a coloured bar of `width` cells.
///
/// The fill is truncated, so a cell only lights once it is fully earned.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn coherence_bar(value: f64, width: usize) -> String {
    let fraction = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let filled = ((fraction * width as f64) as usize).min(width);

    let colour = if value > 0.9 {
        BOLD_MAGENTA
    } else if value > 0.7 {
        BOLD_GREEN
    } else if value > 0.5 {
        BOLD_YELLOW
    } else {
        BOLD_RED
    };

    format!(
        "{colour}{}{}{RESET}",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled))
    )
}

/// Stability band of a xi value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XiBand {
    /// Infinite or above 1000.
    Perfect,
    /// Above 100.
    Optimal,
    /// Above 10.
    Stable,
    /// Above 1.
    Marginal,
    /// Everything else, including NaN.
    Critical,
}

impl XiBand {
    /// Classify `xi`.
    pub const fn of(xi: f64) -> Self {
        // Positive infinity lands here too.
        if xi > 1000.0 {
            Self::Perfect
        } else if xi > 100.0 {
            Self::Optimal
        } else if xi > 10.0 {
            Self::Stable
        } else if xi > 1.0 {
            Self::Marginal
        } else {
            Self::Critical
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Optimal => "OPTIMAL",
            Self::Stable => "STABLE",
            Self::Marginal => "MARGINAL",
            Self::Critical => "CRITICAL",
        }
    }

    const fn colour(self) -> &'static str {
        match self {
            Self::Perfect => BOLD_MAGENTA,
            Self::Optimal => BOLD_GREEN,
            Self::Stable | Self::Marginal => BOLD_YELLOW,
            Self::Critical => BOLD_RED,
        }
    }
}

/// Coloured xi readout: `∞ PERFECT`, or the value followed by its band.
pub fn xi_indicator(xi: f64) -> String {
    let band = XiBand::of(xi);
    let colour = band.colour();
    let label = band.label();
    match band {
        XiBand::Perfect => format!("{colour}∞ {label}{RESET}"),
        XiBand::Critical => format!("{colour}{xi:.2} {label}{RESET}"),
        _ => format!("{colour}{xi:.1} {label}{RESET}"),
    }
}

/// Render the full status display.
pub fn render(report: &PlatformReport, corpus: &CorpusStats) -> String {
    let eco = &report.ecosystem;
    let constants = &report.physics_constants;
    let mut out = String::new();

    let _ = writeln!(out, "{CYAN}{RULE}{RESET}");
    let _ = writeln!(out, "{BOLD}  COHERENCE PLATFORM v{}{RESET}", report.meta.version);
    let _ = writeln!(out, "{CYAN}{RULE}{RESET}");
    let _ = writeln!(out, "  Uptime:      {:.1}s", report.meta.uptime_seconds);
    let _ = writeln!(out, "  Mode:        {:?}", report.meta.mode);
    let _ = writeln!(
        out,
        "  Organisms:   {} live / {} loaded",
        eco.organism_count, eco.organisms_loaded
    );
    let _ = writeln!(out, "  Collisions:  {}", eco.identity_collisions);
    let _ = writeln!(out);

    let _ = writeln!(out, "{BOLD}  CORPUS{RESET}");
    let _ = writeln!(
        out,
        "  Jobs:        {} ({} completed, {:.1}% success)",
        corpus.total_jobs,
        corpus.completed_jobs,
        corpus.success_rate * 100.0
    );
    let _ = writeln!(out, "  Cost:        {}", corpus.total_cost);
    let _ = writeln!(out, "  Malformed:   {}", corpus.skipped_malformed);
    for (backend, count) in &corpus.backends {
        let _ = writeln!(out, "    {backend:<20} {count}");
    }
    for job in corpus.jobs.iter().take(RECENT_JOBS) {
        let mark = if job.success { GREEN } else { YELLOW };
        let _ = writeln!(
            out,
            "    {mark}{:<12}{RESET} {:<16} {:<10} {}",
            job.job_id, job.backend, job.status, job.created
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{BOLD}  CONVERGENCE{RESET}");
    let _ = writeln!(
        out,
        "  Coherence:   {} {:.4}",
        coherence_bar(eco.mean_coherence, BAR_WIDTH),
        eco.mean_coherence
    );
    let _ = writeln!(out, "  Xi:          {}", xi_indicator(eco.mean_xi));
    let _ = writeln!(out, "  Stable:      {}", eco.stable_organisms);
    let _ = writeln!(out, "  Corrections: {}", eco.corrections);
    let _ = writeln!(out);

    let _ = writeln!(out, "{BOLD}  CONSTANTS{RESET}");
    let _ = writeln!(out, "  LAMBDA_PHI    = {:e}", constants.LAMBDA_PHI);
    let _ = writeln!(out, "  PHI_THRESHOLD = {}", constants.PHI_THRESHOLD);
    let _ = writeln!(out, "  THETA_LOCK    = {}°", constants.THETA_LOCK);
    let _ = writeln!(out, "  BELL_FIDELITY = {}", constants.BELL_FIDELITY);
    let _ = writeln!(out, "{CYAN}{RULE}{RESET}");

    out
}

/// Print the status display to stdout.
pub fn show(report: &PlatformReport, corpus: &CorpusStats) {
    print!("{}", render(report, corpus));
}
