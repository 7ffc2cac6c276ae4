//! External tool configuration
//!
//! Locates the executables vidloop drives. Resolution order for each tool:
//! 1. An explicit path from the command line or environment
//! 2. The platform's default install location (MKVToolNix only)
//! 3. A `PATH` lookup

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{LooperError, Result};

/// Executable name of the MKVToolNix merge/identify tool
pub const MKVMERGE: &str = "mkvmerge";

/// Executable name of the FFmpeg probe tool
pub const FFPROBE: &str = "ffprobe";

/// Where MKVToolNix installs itself by default on this platform
pub fn default_mkvmerge_install() -> Option<PathBuf> {
    if cfg!(windows) {
        Some(PathBuf::from(r"C:\Program Files\MKVToolNix\mkvmerge.exe"))
    } else if cfg!(target_os = "macos") {
        Some(PathBuf::from(
            "/Applications/MKVToolNix.app/Contents/MacOS/mkvmerge",
        ))
    } else {
        None
    }
}

/// User-supplied tool locations (CLI flags or environment)
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub mkvmerge: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

/// Resolved tool locations for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPaths {
    /// mkvmerge is mandatory: it both merges and acts as the fallback probe
    pub mkvmerge: PathBuf,
    /// ffprobe is optional: the preferred, sub-second duration probe
    pub ffprobe: Option<PathBuf>,
}

impl ToolPaths {
    /// Discover every tool, failing only when mkvmerge cannot be found
    pub fn discover(overrides: &ToolOverrides) -> Result<Self> {
        let mkvmerge = find_executable(
            MKVMERGE,
            overrides.mkvmerge.as_deref(),
            default_mkvmerge_install().as_deref(),
        )
        .ok_or_else(|| LooperError::ToolNotFound {
            tool: overrides
                .mkvmerge
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| MKVMERGE.to_string()),
        })?;
        info!("Using mkvmerge at {}", mkvmerge.display());

        let ffprobe = find_executable(FFPROBE, overrides.ffprobe.as_deref(), None);
        match &ffprobe {
            Some(path) => info!("Using ffprobe at {}", path.display()),
            None => warn!(
                "ffprobe not found; durations will come from mkvmerge only, which may fail on some files"
            ),
        }

        Ok(Self { mkvmerge, ffprobe })
    }
}

/// Locate an executable, preferring an explicit location over the default
/// install location over `PATH`.
///
/// An explicit location that cannot be found disables the tool rather than
/// silently picking a different binary.
pub fn find_executable(
    name: &str,
    explicit: Option<&Path>,
    default_install: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        return match which::which(path) {
            Ok(found) => Some(found),
            Err(e) => {
                warn!("Configured {} '{}' not usable: {}", name, path.display(), e);
                None
            }
        };
    }

    if let Some(path) = default_install {
        if path.is_file() {
            debug!("Found {} at default install location", name);
            return Some(path.to_path_buf());
        }
    }

    match which::which(name) {
        Ok(found) => {
            debug!("Found {} on PATH", name);
            Some(found)
        }
        Err(_) => None,
    }
}
