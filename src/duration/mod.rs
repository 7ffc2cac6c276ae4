//! Media duration probing
//!
//! This module provides:
//! - `MediaDuration`, a validated positive length in seconds
//! - `DurationProbe` trait for external duration probes
//! - ffprobe and mkvmerge probe implementations
//! - `DurationResolver`, an ordered fallback chain over probes

mod ffprobe;
mod mkvmerge;
mod resolver;

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::process::Command;

use serde::Serialize;
use thiserror::Error;

use crate::error::{LooperError, Result};

pub use ffprobe::{parse_ffprobe_json, FfprobeProbe};
pub use mkvmerge::{parse_identification_json, MkvmergeProbe};
pub use resolver::DurationResolver;

/// Length of a media file in seconds. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MediaDuration(f64);

impl MediaDuration {
    /// Validate a raw reading. Zero, negative and non-finite values are rejected.
    pub fn from_secs(secs: f64) -> Result<Self> {
        if secs.is_finite() && secs > 0.0 {
            Ok(Self(secs))
        } else {
            Err(LooperError::InvalidDuration { secs })
        }
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    pub fn as_minutes(self) -> f64 {
        self.0 / 60.0
    }

    pub fn as_hours(self) -> f64 {
        self.0 / 3600.0
    }
}

impl fmt::Display for MediaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}

/// Why a probe could not produce a duration. Never escalated on its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Unavailable {
    #[error("could not run probe: {0}")]
    Launch(String),

    #[error("probe exited with status {0:?}")]
    ExitStatus(Option<i32>),

    #[error("malformed probe output: {0}")]
    Malformed(String),

    #[error("no duration field in probe output")]
    MissingDuration,

    #[error("probe reported a non-positive duration: {0}")]
    NotPositive(f64),
}

/// An external program that can report a media file's duration
pub trait DurationProbe {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Read the duration of `path`, or explain why it is unavailable
    fn probe(&self, path: &Path) -> std::result::Result<MediaDuration, Unavailable>;
}

/// Turn a raw seconds value into a duration, treating zero as unavailable
pub(crate) fn positive_secs(secs: f64) -> std::result::Result<MediaDuration, Unavailable> {
    MediaDuration::from_secs(secs).map_err(|_| Unavailable::NotPositive(secs))
}

/// Run a probe program to completion and return its stdout
pub(crate) fn capture_stdout<I, S>(
    program: &Path,
    args: I,
) -> std::result::Result<String, Unavailable>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Unavailable::Launch(e.to_string()))?;

    if !output.status.success() {
        return Err(Unavailable::ExitStatus(output.status.code()));
    }

    String::from_utf8(output.stdout).map_err(|e| Unavailable::Malformed(e.to_string()))
}
