//! Workload corpus scanner.
//!
//! A corpus directory holds one subdirectory per workload. Each job inside
//! is described by a `<job>-info.json` file; a sibling `<job>-result.json`
//! marks the job as completed.
//!
//! Info files that cannot be read or parsed are skipped and counted in
//! [`CorpusStats::skipped_malformed`]. Failing to list a directory is fatal
//! and surfaces as [`CorpusError`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use coherence_core::channel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Suffix identifying job description files.
pub const INFO_SUFFIX: &str = "-info.json";

/// Suffix identifying job result files.
pub const RESULT_SUFFIX: &str = "-result.json";

/// Maximum number of jobs kept in [`CorpusStats::jobs`].
pub const JOB_SAMPLE_LIMIT: usize = 50;

/// Errors that abort a corpus scan.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// A directory could not be listed.
    #[error("failed to list {}: {source}", path.display())]
    Io {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Raw job description as written by the workload archive.
#[derive(Debug, Deserialize)]
struct JobInfo {
    #[serde(default = "unknown")]
    id: String,
    #[serde(default = "unknown")]
    backend: String,
    #[serde(default = "unknown")]
    status: String,
    #[serde(default)]
    created: String,
    #[serde(default)]
    cost: f64,
}

fn unknown() -> String {
    "unknown".to_owned()
}

/// A parsed job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    /// Job identifier.
    pub job_id: String,
    /// Backend the job ran on.
    pub backend: String,
    /// Reported job status.
    pub status: String,
    /// Creation timestamp as written in the archive.
    pub created: String,
    /// Cost units charged. Any JSON number is accepted.
    pub cost: f64,
    /// Whether a result file exists.
    pub success: bool,
}

/// Aggregate corpus statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    /// Jobs parsed.
    pub total_jobs: u64,
    /// Jobs with a result file.
    pub completed_jobs: u64,
    /// Sum of job costs.
    pub total_cost: f64,
    /// Job count per backend.
    pub backends: BTreeMap<String, u64>,
    /// `completed_jobs / total_jobs`, zero for an empty corpus.
    pub success_rate: f64,
    /// Info files skipped because they could not be read or parsed.
    pub skipped_malformed: u64,
    /// The first [`JOB_SAMPLE_LIMIT`] jobs in scan order.
    pub jobs: Vec<JobRecord>,
}

/// Scan every workload under `dir`. A missing directory yields empty stats.
pub fn scan_corpus(dir: &Path) -> Result<CorpusStats, CorpusError> {
    let mut stats = CorpusStats::default();
    if !dir.is_dir() {
        return Ok(stats);
    }

    for workload in sorted_entries(dir)? {
        if !workload.is_dir() {
            continue;
        }
        for info_path in sorted_entries(&workload)? {
            if !is_info_file(&info_path) {
                continue;
            }
            match parse_job(&info_path) {
                Ok(job) => record(&mut stats, job),
                Err(reason) => {
                    stats.skipped_malformed = stats.skipped_malformed.saturating_add(1);
                    warn!(
                        target: channel::INTEGRITY,
                        file = %info_path.display(),
                        reason = %reason,
                        "Skipped malformed job description"
                    );
                }
            }
        }
    }

    if stats.total_jobs > 0 {
        stats.success_rate = as_f64(stats.completed_jobs) / as_f64(stats.total_jobs);
    }

    Ok(stats)
}

/// Log corpus statistics on the convergence channel.
pub fn log_stats(stats: &CorpusStats) {
    info!(
        target: channel::CONVERGENCE,
        total_jobs = stats.total_jobs,
        completed = stats.completed_jobs,
        success_rate = stats.success_rate,
        total_cost = stats.total_cost,
        skipped_malformed = stats.skipped_malformed,
        "Corpus analyzed"
    );
    for (backend, count) in &stats.backends {
        info!(target: channel::CONVERGENCE, backend = %backend, jobs = count, "Backend usage");
    }
}

fn record(stats: &mut CorpusStats, job: JobRecord) {
    stats.total_jobs = stats.total_jobs.saturating_add(1);
    stats.total_cost += job.cost;
    if job.success {
        stats.completed_jobs = stats.completed_jobs.saturating_add(1);
    }
    let count = stats.backends.entry(job.backend.clone()).or_insert(0);
    *count = count.saturating_add(1);
    if stats.jobs.len() < JOB_SAMPLE_LIMIT {
        stats.jobs.push(job);
    }
}

fn parse_job(info_path: &Path) -> Result<JobRecord, String> {
    let contents = fs::read_to_string(info_path).map_err(|e| e.to_string())?;
    let info: JobInfo = serde_json::from_str(&contents).map_err(|e| e.to_string())?;

    let success = result_path(info_path).is_some_and(|p| p.is_file());

    Ok(JobRecord {
        job_id: info.id,
        backend: info.backend,
        status: info.status,
        created: info.created,
        cost: info.cost,
        success,
    })
}

fn is_info_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(INFO_SUFFIX))
}

fn result_path(info_path: &Path) -> Option<PathBuf> {
    let name = info_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(INFO_SUFFIX)?;
    Some(info_path.with_file_name(format!("{stem}{RESULT_SUFFIX}")))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        paths.push(entry.map_err(io_err)?.path());
    }
    paths.sort();
    Ok(paths)
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(count: u64) -> f64 {
    count as f64
}
