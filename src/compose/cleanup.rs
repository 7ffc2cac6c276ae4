//! Intermediate file bookkeeping
//!
//! Intermediates sit next to the output and take their names from it, so
//! two runs writing different outputs never share scratch files.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Result of removing intermediates. Failures here never fail a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Intermediates created for one output file
#[derive(Debug)]
pub struct Intermediates {
    dir: PathBuf,
    stem: OsString,
    extension: Option<OsString>,
    avoid: Vec<PathBuf>,
    reserved: Vec<(u32, PathBuf)>,
}

impl Intermediates {
    /// Intermediates are named after `output` and never take the name of an
    /// `avoid` path or of a file already on disk.
    pub fn for_output(output: &Path, avoid: &[&Path]) -> Self {
        Self {
            dir: output.parent().map(Path::to_path_buf).unwrap_or_default(),
            stem: output
                .file_stem()
                .map(|s| s.to_os_string())
                .unwrap_or_else(|| OsString::from("output")),
            extension: output.extension().map(|e| e.to_os_string()),
            avoid: avoid.iter().map(|p| p.to_path_buf()).collect(),
            reserved: Vec::new(),
        }
    }

    /// `<stem>_temp_<exponent - 1>[_<attempt>].<ext>`
    fn candidate(&self, exponent: u32, attempt: u32) -> PathBuf {
        let mut name = self.stem.clone();
        name.push(format!("_temp_{}", exponent.saturating_sub(1)));
        if attempt > 0 {
            name.push(format!("_{}", attempt));
        }
        if let Some(ext) = &self.extension {
            name.push(".");
            name.push(ext);
        }
        self.dir.join(name)
    }

    fn is_taken(&self, path: &Path) -> bool {
        path.exists()
            || self.avoid.iter().any(|p| same_file(p, path))
            || self.reserved.iter().any(|(_, p)| p == path)
    }

    /// Pick a free path for the intermediate holding `2^exponent` copies.
    ///
    /// Must be called before the tool writes it, so a partially written file
    /// is still cleaned up. Repeated calls return the same path.
    pub fn reserve(&mut self, exponent: u32) -> PathBuf {
        if let Some(path) = self.path_for(exponent) {
            return path.to_path_buf();
        }
        let mut attempt = 0;
        let mut path = self.candidate(exponent, attempt);
        while self.is_taken(&path) {
            debug!("{} is taken; trying another name", path.display());
            attempt += 1;
            path = self.candidate(exponent, attempt);
        }
        self.reserved.push((exponent, path.clone()));
        path
    }

    pub fn path_for(&self, exponent: u32) -> Option<&Path> {
        self.reserved
            .iter()
            .find(|(e, _)| *e == exponent)
            .map(|(_, p)| p.as_path())
    }

    pub fn reserved(&self) -> Vec<PathBuf> {
        self.reserved.iter().map(|(_, p)| p.clone()).collect()
    }

    /// Delete every reserved intermediate except `protected` paths
    pub fn cleanup(&self, protected: &[&Path]) -> CleanupReport {
        remove_files(&self.reserved(), protected)
    }
}

/// True when both paths name the same file, comparing canonical forms when
/// both exist.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Delete each path that exists and is not protected.
///
/// Missing files are skipped, so running this twice is harmless.
pub fn remove_files(paths: &[PathBuf], protected: &[&Path]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for path in paths {
        if protected.iter().any(|p| *p == path.as_path()) {
            debug!("Keeping protected file {}", path.display());
            continue;
        }
        if !path.exists() {
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed intermediate {}", path.display());
                report.removed.push(path.clone());
            }
            Err(e) => {
                warn!("Could not remove temporary file {}: {}", path.display(), e);
                report.failed.push((path.clone(), e.to_string()));
            }
        }
    }

    report
}
