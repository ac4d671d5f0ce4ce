//! File-system organism sources and upload import.
//!
//! [`FsSourceLoader`] is the production [`SourceLoader`]. [`scan_organisms`]
//! admits every `*.dna` file in a directory; a failed admission is counted
//! and logged by the registry but never stops the scan.

use std::fs;
use std::path::{Path, PathBuf};

use coherence_core::channel;
use coherence_core::registry::{Registry, SourceLoader};
use tracing::{debug, info};

use crate::error::EngineError;

/// Extension of organism source files.
pub const ORGANISM_EXTENSION: &str = "dna";

/// Extensions imported into the sdk directory.
pub const SDK_EXTENSIONS: [&str; 3] = ["py", "sh", "txt"];

/// Reads organism sources from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceLoader;

impl SourceLoader for FsSourceLoader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Outcome of an organism directory scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Sources admitted into the registry.
    pub loaded: u64,
    /// Sources whose admission failed.
    pub failed: u64,
}

/// Outcome of an upload import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Organism sources copied.
    pub organisms: u64,
    /// Scripts and notes copied.
    pub sdk_files: u64,
}

/// Files in `dir` whose extension is one of `extensions`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn files_with_extension(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, EngineError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EngineError::io(dir, e))?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Admit every organism source in `dir`.
pub fn scan_organisms(
    dir: &Path,
    registry: &mut Registry,
    loader: &dyn SourceLoader,
) -> Result<LoadSummary, EngineError> {
    info!(target: channel::PLATFORM, dir = %dir.display(), "Loading organisms");

    let mut summary = LoadSummary::default();
    for path in files_with_extension(dir, &[ORGANISM_EXTENSION])? {
        // The registry logs the failure on the integrity channel.
        if registry.admit_source(loader, &path).is_ok() {
            summary.loaded = summary.loaded.saturating_add(1);
        } else {
            summary.failed = summary.failed.saturating_add(1);
        }
    }

    info!(
        target: channel::PLATFORM,
        loaded = summary.loaded,
        failed = summary.failed,
        "Organism loading complete"
    );
    Ok(summary)
}

/// Copy organism sources and sdk files out of an upload directory.
pub fn import_uploads(
    uploads: &Path,
    organisms_dir: &Path,
    sdk_dir: &Path,
) -> Result<ImportSummary, EngineError> {
    info!(target: channel::PLATFORM, uploads = %uploads.display(), "Importing uploaded corpus");

    let mut summary = ImportSummary::default();

    for source in files_with_extension(uploads, &[ORGANISM_EXTENSION])? {
        copy_into(&source, organisms_dir)?;
        summary.organisms = summary.organisms.saturating_add(1);
        info!(target: channel::LINEAGE, file = %source.display(), "Imported organism");
    }

    for source in files_with_extension(uploads, &SDK_EXTENSIONS)? {
        copy_into(&source, sdk_dir)?;
        summary.sdk_files = summary.sdk_files.saturating_add(1);
        debug!(target: channel::PLATFORM, file = %source.display(), "Imported sdk file");
    }

    info!(
        target: channel::PLATFORM,
        organisms = summary.organisms,
        sdk_files = summary.sdk_files,
        "Import complete"
    );
    Ok(summary)
}

fn copy_into(source: &Path, dest_dir: &Path) -> Result<(), EngineError> {
    let Some(name) = source.file_name() else {
        return Ok(());
    };
    let dest = dest_dir.join(name);
    fs::copy(source, &dest).map_err(|e| EngineError::io(&dest, e))?;
    Ok(())
}
