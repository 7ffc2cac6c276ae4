//! mkvmerge identification probe
//!
//! Fallback probe: reads the container duration from `mkvmerge -J`.
//! Durations there are integer nanoseconds.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{capture_stdout, positive_secs, DurationProbe, MediaDuration, Unavailable};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

#[derive(Debug, Deserialize)]
struct Identification {
    #[serde(default)]
    container: Option<Container>,
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(default)]
    properties: Option<DurationProperties>,
}

#[derive(Debug, Deserialize)]
struct Track {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    properties: Option<DurationProperties>,
}

#[derive(Debug, Deserialize)]
struct DurationProperties {
    #[serde(default)]
    duration: Option<f64>,
}

fn nonzero_nanos(properties: &Option<DurationProperties>) -> Option<f64> {
    properties
        .as_ref()
        .and_then(|p| p.duration)
        .filter(|ns| *ns != 0.0)
}

/// Extract a duration from `mkvmerge -J` identification output.
///
/// The container duration wins; otherwise the first video track that
/// carries a non-zero duration.
pub fn parse_identification_json(json: &str) -> Result<MediaDuration, Unavailable> {
    let identification: Identification =
        serde_json::from_str(json).map_err(|e| Unavailable::Malformed(e.to_string()))?;

    let nanos = identification
        .container
        .as_ref()
        .and_then(|c| nonzero_nanos(&c.properties))
        .or_else(|| {
            identification
                .tracks
                .iter()
                .filter(|t| t.kind.as_deref() == Some("video"))
                .find_map(|t| nonzero_nanos(&t.properties))
        })
        .ok_or(Unavailable::MissingDuration)?;

    positive_secs(nanos / NANOS_PER_SEC)
}

/// Duration probe backed by MKVToolNix's `mkvmerge -J`
#[derive(Debug, Clone)]
pub struct MkvmergeProbe {
    program: PathBuf,
}

impl MkvmergeProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DurationProbe for MkvmergeProbe {
    fn name(&self) -> &str {
        "mkvmerge"
    }

    fn probe(&self, path: &Path) -> Result<MediaDuration, Unavailable> {
        let stdout = capture_stdout(&self.program, [OsStr::new("-J"), path.as_os_str()])?;
        parse_identification_json(&stdout)
    }
}
