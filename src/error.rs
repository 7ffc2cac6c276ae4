//! Error handling for vidloop
//!
//! Every terminal failure of a loop operation maps to one variant here.
//! Probe unavailability is not an error: the duration resolver absorbs it
//! and only reports `DurationUnresolved` once every probe has been tried.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for vidloop operations
pub type Result<T> = std::result::Result<T, LooperError>;

/// Main error type for vidloop operations
#[derive(Error, Debug)]
pub enum LooperError {
    // Input Errors
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Output path is the source file itself: {path}")]
    OutputIsSource { path: PathBuf },

    #[error("Invalid target duration: {value} (must be a positive number)")]
    InvalidTarget { value: f64 },

    // Duration Errors
    #[error("Could not determine the duration of {path} with any available probe")]
    DurationUnresolved { path: PathBuf },

    #[error("Invalid media duration: {secs}s (must be positive)")]
    InvalidDuration { secs: f64 },

    // Planning Errors
    #[error("Loop count too large: {loops} copies (maximum {max})")]
    LoopCountTooLarge { loops: f64, max: u64 },

    // Tool Errors
    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed during {step}:\n{diagnostic}")]
    MergeFailed {
        tool: String,
        step: String,
        status: Option<i32>,
        diagnostic: String,
    },

    // File Errors
    #[error("Failed to copy {from} to {to}: {source}")]
    FileCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Console Errors
    #[error("Prompt failed: {reason}")]
    Prompt { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LooperError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LooperError::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            LooperError::OutputIsSource { .. } => "OUTPUT_IS_SOURCE",
            LooperError::InvalidTarget { .. } => "INVALID_TARGET",
            LooperError::DurationUnresolved { .. } => "DURATION_UNRESOLVED",
            LooperError::InvalidDuration { .. } => "INVALID_DURATION",
            LooperError::LoopCountTooLarge { .. } => "LOOP_COUNT_TOO_LARGE",
            LooperError::ToolNotFound { .. } => "TOOL_NOT_FOUND",
            LooperError::ToolLaunch { .. } => "TOOL_LAUNCH_FAILED",
            LooperError::MergeFailed { .. } => "MERGE_FAILED",
            LooperError::FileCopy { .. } => "FILE_COPY_FAILED",
            LooperError::FileMove { .. } => "FILE_MOVE_FAILED",
            LooperError::Prompt { .. } => "PROMPT_FAILED",
            LooperError::Io(_) => "IO_ERROR",
            LooperError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can fix this error by changing inputs or setup
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LooperError::SourceNotFound { .. }
                | LooperError::OutputIsSource { .. }
                | LooperError::InvalidTarget { .. }
                | LooperError::ToolNotFound { .. }
                | LooperError::DurationUnresolved { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LooperError::SourceNotFound { .. } => vec![
                "Check the file path is correct",
                "Wrap paths containing spaces in quotes",
            ],
            LooperError::OutputIsSource { .. } => {
                vec!["Choose an output path different from the source file"]
            }
            LooperError::InvalidTarget { .. } => {
                vec!["Enter the target duration in hours, e.g. 1, 2.5 or 10"]
            }
            LooperError::DurationUnresolved { .. } => vec![
                "Install FFmpeg so that ffprobe is available on PATH",
                "Point --ffprobe or VIDLOOP_FFPROBE at an ffprobe executable",
                "Check that the file plays in a media player",
            ],
            LooperError::ToolNotFound { .. } => vec![
                "Install MKVToolNix from https://mkvtoolnix.download/",
                "Point --mkvmerge or VIDLOOP_MKVMERGE at the mkvmerge executable",
            ],
            LooperError::MergeFailed { .. } => vec![
                "Read the mkvmerge output above for the cause",
                "Check there is enough free disk space next to the output file",
            ],
            _ => vec![],
        }
    }
}
