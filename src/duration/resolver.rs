//! Ordered fallback over duration probes

use std::path::Path;

use log::{debug, info};

use super::{DurationProbe, FfprobeProbe, MediaDuration, MkvmergeProbe};
use crate::config::ToolPaths;
use crate::error::{LooperError, Result};

/// Tries each probe in order and returns the first positive reading.
///
/// A probe that is unavailable is skipped silently (logged at debug level).
/// Only when every probe is unavailable, or none is configured, does
/// resolution fail.
pub struct DurationResolver {
    probes: Vec<Box<dyn DurationProbe>>,
}

impl DurationResolver {
    /// Create a resolver with no probes
    pub fn new() -> Self {
        Self { probes: Vec::new() }
    }

    /// Standard chain: ffprobe first when available, mkvmerge as fallback
    pub fn from_tools(tools: &ToolPaths) -> Self {
        let mut resolver = Self::new();
        if let Some(ffprobe) = &tools.ffprobe {
            resolver.push(Box::new(FfprobeProbe::new(ffprobe)));
        }
        resolver.push(Box::new(MkvmergeProbe::new(&tools.mkvmerge)));
        resolver
    }

    /// Append a probe, builder style
    pub fn with_probe(mut self, probe: impl DurationProbe + 'static) -> Self {
        self.push(Box::new(probe));
        self
    }

    /// Append a probe at the lowest priority
    pub fn push(&mut self, probe: Box<dyn DurationProbe>) {
        self.probes.push(probe);
    }

    /// Probe names in the order they are tried
    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn resolve(&self, path: &Path) -> Result<MediaDuration> {
        for probe in &self.probes {
            debug!("Probing duration of {} with {}", path.display(), probe.name());
            match probe.probe(path) {
                Ok(duration) => {
                    info!("{} reports {} for {}", probe.name(), duration, path.display());
                    return Ok(duration);
                }
                Err(reason) => debug!("{} unavailable: {}", probe.name(), reason),
            }
        }

        Err(LooperError::DurationUnresolved {
            path: path.to_path_buf(),
        })
    }
}

impl Default for DurationResolver {
    fn default() -> Self {
        Self::new()
    }
}
