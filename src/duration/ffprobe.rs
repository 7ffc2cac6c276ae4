//! ffprobe duration probe
//!
//! Preferred probe: reads container and stream metadata with sub-second
//! precision.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{capture_stdout, positive_secs, DurationProbe, MediaDuration, Unavailable};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: Option<SecondsField>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    duration: Option<SecondsField>,
}

/// ffprobe writes durations as strings ("12.345000"); accept numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SecondsField {
    Text(String),
    Number(f64),
}

impl SecondsField {
    fn secs(&self) -> Option<f64> {
        match self {
            SecondsField::Text(s) => s.trim().parse().ok(),
            SecondsField::Number(n) => Some(*n),
        }
    }
}

/// Extract a duration from `ffprobe -print_format json -show_format -show_streams`.
///
/// The format-level duration wins; otherwise the first video stream that
/// carries a usable duration.
pub fn parse_ffprobe_json(json: &str) -> Result<MediaDuration, Unavailable> {
    let output: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| Unavailable::Malformed(e.to_string()))?;

    let format_secs = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(SecondsField::secs);

    let stream_secs = output
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("video"))
        .filter_map(|s| s.duration.as_ref().and_then(SecondsField::secs));

    let mut last_rejected = None;
    for secs in format_secs.into_iter().chain(stream_secs) {
        match positive_secs(secs) {
            Ok(duration) => return Ok(duration),
            Err(e) => last_rejected = Some(e),
        }
    }

    Err(last_rejected.unwrap_or(Unavailable::MissingDuration))
}

const PROBE_ARGS: [&str; 6] = [
    "-v",
    "quiet",
    "-print_format",
    "json",
    "-show_format",
    "-show_streams",
];

/// Duration probe backed by FFmpeg's `ffprobe`
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: PathBuf,
}

impl FfprobeProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DurationProbe for FfprobeProbe {
    fn name(&self) -> &str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> Result<MediaDuration, Unavailable> {
        let mut args: Vec<&OsStr> = PROBE_ARGS.into_iter().map(OsStr::new).collect();
        args.push(path.as_os_str());

        let stdout = capture_stdout(&self.program, args)?;
        parse_ffprobe_json(&stdout)
    }
}
