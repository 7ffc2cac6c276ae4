//! Plan execution
//!
//! Runs a `CompositionPlan` against a `MergeTool`, strictly in order. Any
//! failed merge stops the run; intermediates are removed either way.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::cleanup::{same_file, CleanupReport, Intermediates};
use super::merge::{MergeError, MergeTool};
use super::plan::{ArtifactRef, CompositionPlan, Finish, MergeStep};
use crate::error::{LooperError, Result};
use crate::planner::LoopCount;

/// What a successful composition did
#[derive(Debug, Clone)]
pub struct ComposeReport {
    pub plan: CompositionPlan,
    pub output: PathBuf,
    /// Merge-tool invocations actually made
    pub merge_invocations: usize,
    pub cleanup: CleanupReport,
}

/// Builds the N-fold concatenation of a source with a merge tool
pub struct Composer<'a> {
    tool: &'a dyn MergeTool,
}

impl<'a> Composer<'a> {
    pub fn new(tool: &'a dyn MergeTool) -> Self {
        Self { tool }
    }

    /// Write `loop_count` back-to-back copies of `source` to `output`.
    ///
    /// Blocks until every external merge has finished.
    pub fn compose(
        &self,
        source: &Path,
        loop_count: LoopCount,
        output: &Path,
    ) -> Result<ComposeReport> {
        if !source.is_file() {
            return Err(LooperError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        if same_file(source, output) {
            return Err(LooperError::OutputIsSource {
                path: output.to_path_buf(),
            });
        }

        let plan = CompositionPlan::build(loop_count);
        info!(
            "Composing {} copies of {} with {} merge(s)",
            loop_count,
            source.display(),
            plan.merge_invocations()
        );
        self.execute(plan, source, output)
    }

    fn execute(&self, plan: CompositionPlan, source: &Path, output: &Path) -> Result<ComposeReport> {
        let mut work = Intermediates::for_output(output, &[source, output]);
        for exponent in plan.intermediate_exponents() {
            work.reserve(exponent);
        }
        let mut merges = 0;
        let outcome = self.run_steps(&plan, source, output, &mut work, &mut merges);

        if !plan.doublings.is_empty() {
            info!("Cleaning up temporary files...");
        }
        let cleanup = work.cleanup(&[source, output]);

        outcome.map(|()| ComposeReport {
            plan,
            output: output.to_path_buf(),
            merge_invocations: merges,
            cleanup,
        })
    }

    fn run_steps(
        &self,
        plan: &CompositionPlan,
        source: &Path,
        output: &Path,
        work: &mut Intermediates,
        merges: &mut usize,
    ) -> Result<()> {
        for step in &plan.doublings {
            let label = format!("doubling phase (merging into {}x)", step.copies);
            self.run_merge(step, source, output, work, &label)?;
            *merges += 1;
        }

        match &plan.finish {
            Finish::CopySource => {
                info!("Number of loops is 1; copying instead of merging");
                fs::copy(source, output)
                    .map(|_| ())
                    .map_err(|e| LooperError::FileCopy {
                        from: source.to_path_buf(),
                        to: output.to_path_buf(),
                        source: e,
                    })
            }
            Finish::MoveIntoPlace { artifact } => {
                let from = resolve(*artifact, source, output, work);
                info!("Moving {} into place", artifact);
                move_file(&from, output)
            }
            Finish::Assemble { step } => {
                let label = format!("final assembly ({} copies)", step.copies);
                self.run_merge(step, source, output, work, &label)?;
                *merges += 1;
                Ok(())
            }
        }
    }

    fn run_merge(
        &self,
        step: &MergeStep,
        source: &Path,
        output: &Path,
        work: &mut Intermediates,
        label: &str,
    ) -> Result<()> {
        let inputs: Vec<PathBuf> = step
            .inputs
            .iter()
            .map(|a| resolve(*a, source, output, work))
            .collect();
        let input_refs: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
        let target = resolve(step.output, source, output, work);

        debug!("{}: {}", label, step);
        self.tool
            .merge(&input_refs, &target)
            .map_err(|e| match e {
                MergeError::Launch(err) => LooperError::ToolLaunch {
                    tool: self.tool.name().to_string(),
                    source: err,
                },
                MergeError::Failed { status, diagnostic } => LooperError::MergeFailed {
                    tool: self.tool.name().to_string(),
                    step: label.to_string(),
                    status,
                    diagnostic,
                },
            })
    }
}

fn resolve(
    artifact: ArtifactRef,
    source: &Path,
    output: &Path,
    work: &mut Intermediates,
) -> PathBuf {
    match artifact {
        ArtifactRef::Source => source.to_path_buf(),
        ArtifactRef::Intermediate { exponent } => work.reserve(exponent),
        ArtifactRef::Output => output.to_path_buf(),
    }
}

/// Rename, falling back to copy + delete (e.g. across file systems)
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Err(rename_err) = fs::rename(from, to) {
        debug!("Rename failed ({}); copying instead", rename_err);
        fs::copy(from, to).map_err(|e| LooperError::FileMove {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        })?;
        // The leftover is a reserved intermediate; cleanup removes it.
        let _ = fs::remove_file(from);
    }
    Ok(())
}
