//! Loop composition
//!
//! This module provides:
//! - `CompositionPlan`: doubling + assembly schedule for a loop count
//! - `MergeTool` trait and the mkvmerge implementation
//! - `Composer`: executes a plan and cleans up intermediates
//!
//! The schedule needs `⌊log2 L⌋` self-merges plus at most one assembly
//! merge, instead of `L - 1` sequential merges.

mod cleanup;
mod composer;
mod merge;
mod plan;

pub use cleanup::{remove_files, CleanupReport, Intermediates};
pub use composer::{ComposeReport, Composer};
pub use merge::{diagnostic_text, mkvmerge_args, MergeError, MergeTool, Mkvmerge};
pub use plan::{ArtifactRef, CompositionPlan, Finish, MergeStep};
