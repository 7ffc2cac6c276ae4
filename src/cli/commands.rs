//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use super::prompt::{ask_source_path, ask_target_hours, confirm};
use super::{looped_output_path, RunArgs};
use crate::compose::{CompositionPlan, Composer, Mkvmerge};
use crate::config::{ToolOverrides, ToolPaths};
use crate::duration::{DurationResolver, MediaDuration};
use crate::error::{LooperError, Result};
use crate::planner::{plan_for_hours, LoopPlan};
use crate::progress::with_spinner;

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(LooperError::SourceNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn print_duration(duration: MediaDuration) {
    println!(
        "Video duration: {:.2} seconds (~{:.2} minutes).",
        duration.as_secs(),
        duration.as_minutes()
    );
}

/// Loop a video to the target duration.
pub fn run(args: RunArgs, overrides: &ToolOverrides) -> Result<()> {
    let tools = ToolPaths::discover(overrides)?;

    let source = match args.source {
        Some(path) => path,
        None => ask_source_path()?,
    };
    require_file(&source)?;

    let target_hours = match args.hours {
        Some(hours) => hours,
        None => ask_target_hours()?,
    };
    if !target_hours.is_finite() || target_hours <= 0.0 {
        return Err(LooperError::InvalidTarget {
            value: target_hours,
        });
    }

    info!("Analyzing {} to get its duration", source.display());
    let duration = DurationResolver::from_tools(&tools).resolve(&source)?;
    print_duration(duration);

    let plan = plan_for_hours(duration, target_hours)?;
    println!(
        "To reach {} hours, the video will be looped {} times.",
        target_hours, plan.loop_count
    );
    println!(
        "The final video will be approximately {:.2} hours long.",
        plan.final_hours()
    );

    if !args.yes && !confirm("Do you want to proceed?")? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| looped_output_path(&source, target_hours));
    println!("Starting merge process. Output file will be:\n{}", output.display());

    let mkvmerge = Mkvmerge::new(&tools.mkvmerge);
    let composer = Composer::new(&mkvmerge);
    let show_spinner = std::io::stderr().is_terminal();
    let result = with_spinner(
        "Merging video (this might take a while)...",
        show_spinner,
        || composer.compose(&source, plan.loop_count, &output),
    );

    match result {
        Ok(report) => {
            if !report.cleanup.is_clean() {
                warn!(
                    "{} temporary file(s) could not be removed",
                    report.cleanup.failed.len()
                );
            }
            println!(
                "Success! Video looped successfully ({} merge invocation(s)).",
                report.merge_invocations
            );
            Ok(())
        }
        Err(e) => {
            println!("Error: The merge process failed. Please check the output above for details.");
            Err(e)
        }
    }
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    source: &'a Path,
    output: PathBuf,
    duration_secs: f64,
    loop_plan: LoopPlan,
    composition: CompositionPlan,
}

/// Show what `run` would do, without merging.
pub fn plan(source: &Path, target_hours: f64, json: bool, overrides: &ToolOverrides) -> Result<()> {
    info!("Planning loop of {} to {} hours", source.display(), target_hours);
    require_file(source)?;

    let tools = ToolPaths::discover(overrides)?;
    let duration = DurationResolver::from_tools(&tools).resolve(source)?;
    let loop_plan = plan_for_hours(duration, target_hours)?;
    let composition = CompositionPlan::build(loop_plan.loop_count);
    let output = looped_output_path(source, target_hours);

    if json {
        let report = PlanOutput {
            source,
            output,
            duration_secs: duration.as_secs(),
            loop_plan,
            composition,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_duration(duration);
    println!(
        "Loop count: {} (final length {:.2} hours, target {} hours)",
        loop_plan.loop_count,
        loop_plan.final_hours(),
        target_hours
    );
    println!("Output: {}", output.display());
    println!("{}", composition);

    Ok(())
}

/// Print the duration of a video.
pub fn probe(source: &Path, overrides: &ToolOverrides) -> Result<()> {
    info!("Probing: {}", source.display());
    require_file(source)?;

    let tools = ToolPaths::discover(overrides)?;
    let duration = DurationResolver::from_tools(&tools).resolve(source)?;
    print_duration(duration);

    Ok(())
}
