//! Report export.

use std::fs;
use std::path::{Path, PathBuf};

use coherence_core::channel;
use coherence_core::report::PlatformReport;
use tracing::info;

use crate::error::EngineError;

/// File name of the exported platform state.
pub const STATE_FILE: &str = "platform_state.json";

/// Write `report` as pretty JSON into `output_dir`, returning the file path.
pub fn export_report(report: &PlatformReport, output_dir: &Path) -> Result<PathBuf, EngineError> {
    let path = output_dir.join(STATE_FILE);
    let json = report.to_json()?;
    fs::write(&path, json).map_err(|e| EngineError::io(&path, e))?;

    info!(
        target: channel::PLATFORM,
        path = %path.display(),
        organisms = report.organisms.len(),
        "Platform state exported"
    );
    Ok(path)
}
