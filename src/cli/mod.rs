//! CLI Module
//!
//! Command-line interface for vidloop.

pub mod commands;
pub mod prompt;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::ToolOverrides;

/// Vidloop - loop a video to a target length with MKVToolNix
#[derive(Parser, Debug)]
#[command(name = "vidloop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the mkvmerge executable
    #[arg(long, global = true, env = "VIDLOOP_MKVMERGE")]
    pub mkvmerge: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, global = true, env = "VIDLOOP_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Without a subcommand, runs interactively like `vidloop run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn tool_overrides(&self) -> ToolOverrides {
        ToolOverrides {
            mkvmerge: self.mkvmerge.clone(),
            ffprobe: self.ffprobe.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Loop a video until it reaches the target duration
    #[command(name = "run")]
    Run(RunArgs),

    /// Show the loop count and merge plan without merging anything
    #[command(name = "plan")]
    Plan {
        /// Source video file
        source: PathBuf,

        /// Target duration in hours
        #[arg(short = 't', long)]
        hours: f64,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the duration of a video
    #[command(name = "probe")]
    Probe {
        /// Video file to inspect
        source: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Source video file (prompted for when omitted)
    pub source: Option<PathBuf>,

    /// Target duration in hours (prompted for when omitted)
    #[arg(short = 't', long)]
    pub hours: Option<f64>,

    /// Output file (defaults to <source>_looped_<hours>hr.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Default output next to the source: `<stem>_looped_<H>hr<.ext>`, with the
/// target hours truncated to a whole number.
pub fn looped_output_path(source: &Path, target_hours: f64) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let mut name = format!("{}_looped_{}hr", stem, target_hours.trunc() as u64);
    if let Some(ext) = source.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    source.with_file_name(name)
}
