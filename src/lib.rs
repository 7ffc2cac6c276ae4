//! Vidloop - loop a video to a target duration
//!
//! Given a source video and a target length, vidloop works out how many
//! whole copies of the source are needed and builds that concatenation with
//! as few external merge invocations as possible.
//!
//! # Architecture
//!
//! - [`duration`]: ordered fallback over external duration probes
//!   (ffprobe, then mkvmerge)
//! - [`planner`]: loop count from source and target durations
//! - [`compose`]: doubling + assembly merge plan, executed against a
//!   [`compose::MergeTool`] with intermediate cleanup
//!
//! A loop count of `L` costs `⌊log2 L⌋` self-merges plus at most one
//! assembly merge. For example 5 copies take three merges
//! (1+1, 2+2, then 4+1) and 8 copies take three merges and a rename.

pub mod cli;
pub mod compose;
pub mod config;
pub mod duration;
pub mod error;
pub mod planner;
pub mod progress;

pub use compose::{ComposeReport, Composer, CompositionPlan, MergeTool, Mkvmerge};
pub use duration::{DurationProbe, DurationResolver, MediaDuration};
pub use error::{LooperError, Result};
pub use planner::{plan_loop_count, LoopCount, LoopPlan};
