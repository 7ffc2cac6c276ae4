//! Merge tool interface and the mkvmerge implementation
//!
//! One calling convention serves both phases: an ordered list of inputs
//! concatenated into one output. Doubling passes the same file twice.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use thiserror::Error;

/// Why a merge invocation did not succeed
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("could not start merge tool: {0}")]
    Launch(#[source] std::io::Error),

    #[error("merge tool exited with status {status:?}: {diagnostic}")]
    Failed {
        status: Option<i32>,
        diagnostic: String,
    },
}

/// An external program that concatenates media files in order
pub trait MergeTool {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Concatenate `inputs` in the given order into `output`.
    ///
    /// Blocks until the external process exits.
    fn merge(&self, inputs: &[&Path], output: &Path) -> Result<(), MergeError>;
}

/// Command-line arguments for `mkvmerge -o OUT ( IN1 ) + ( IN2 ) ...`
pub fn mkvmerge_args(inputs: &[&Path], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-o".into(), output.into()];
    for (i, input) in inputs.iter().enumerate() {
        if i > 0 {
            args.push("+".into());
        }
        args.push("(".into());
        args.push((*input).into());
        args.push(")".into());
    }
    args
}

/// Pick the text worth showing from a failed run.
///
/// mkvmerge reports its errors on stdout, so stdout is used when stderr
/// is empty.
pub fn diagnostic_text(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        return stderr.into_owned();
    }
    let stdout = String::from_utf8_lossy(stdout);
    if !stdout.trim().is_empty() {
        return stdout.into_owned();
    }
    "No error output.".to_string()
}

/// MKVToolNix `mkvmerge` used as the merge tool
#[derive(Debug, Clone)]
pub struct Mkvmerge {
    program: PathBuf,
}

impl Mkvmerge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MergeTool for Mkvmerge {
    fn name(&self) -> &str {
        "mkvmerge"
    }

    fn merge(&self, inputs: &[&Path], output: &Path) -> Result<(), MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::Failed {
                status: None,
                diagnostic: "no input files to merge".to_string(),
            });
        }

        let args = mkvmerge_args(inputs, output);
        debug!("Running {} {:?}", self.program.display(), args);

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(MergeError::Launch)?;

        if result.status.success() {
            Ok(())
        } else {
            Err(MergeError::Failed {
                status: result.status.code(),
                diagnostic: diagnostic_text(&result.stderr, &result.stdout),
            })
        }
    }
}
