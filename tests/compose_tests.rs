//! Composition Tests
//!
//! End-to-end runs of the composer against an in-process merge tool that
//! concatenates file bytes, so output content can be checked exactly.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use test_case::test_case;

use vidloop::compose::{Composer, MergeError, MergeTool};
use vidloop::duration::MediaDuration;
use vidloop::{plan_loop_count, CompositionPlan, LoopCount, LooperError};

const CLIP: &[u8] = b"<clip>";

/// Merge tool that concatenates input bytes; optionally fails on one call
struct ByteConcat {
    calls: RefCell<Vec<(Vec<PathBuf>, PathBuf)>>,
    fail_on_call: Option<usize>,
}

impl ByteConcat {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on_call: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl MergeTool for ByteConcat {
    fn name(&self) -> &str {
        "byte-concat"
    }

    fn merge(&self, inputs: &[&Path], output: &Path) -> Result<(), MergeError> {
        let index = self.call_count();
        self.calls.borrow_mut().push((
            inputs.iter().map(|p| p.to_path_buf()).collect(),
            output.to_path_buf(),
        ));

        if self.fail_on_call == Some(index) {
            // Leave a partial file behind, as a crashed tool would
            fs::write(output, b"partial").unwrap();
            return Err(MergeError::Failed {
                status: Some(2),
                diagnostic: "Error: simulated failure\nsecond line".to_string(),
            });
        }

        let mut bytes = Vec::new();
        for input in inputs {
            bytes.extend(fs::read(input).unwrap());
        }
        fs::write(output, bytes).unwrap();
        Ok(())
    }
}

/// Merge tool whose executable cannot be started
struct Unlaunchable;

impl MergeTool for Unlaunchable {
    fn name(&self) -> &str {
        "missing-tool"
    }

    fn merge(&self, _inputs: &[&Path], _output: &Path) -> Result<(), MergeError> {
        Err(MergeError::Launch(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        )))
    }
}

struct Fixture {
    dir: TempDir,
    source: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let source = dir.path().join("clip.mkv");
    fs::write(&source, CLIP).unwrap();
    let output = dir.path().join("clip_looped_1hr.mkv");
    Fixture {
        dir,
        source,
        output,
    }
}

fn loops(n: u64) -> LoopCount {
    LoopCount::new(n).unwrap()
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn temp(f: &Fixture, index: u32) -> PathBuf {
    f.dir.path().join(format!("clip_looped_1hr_temp_{}.mkv", index))
}

// === Fast Paths ===

#[test]
fn test_single_loop_copies_without_merging() {
    let f = fixture();
    let tool = ByteConcat::new();

    let report = Composer::new(&tool)
        .compose(&f.source, loops(1), &f.output)
        .unwrap();

    assert_eq!(report.merge_invocations, 0);
    assert_eq!(tool.call_count(), 0);
    assert_eq!(fs::read(&f.output).unwrap(), CLIP);
    assert_eq!(fs::read(&f.source).unwrap(), CLIP);
}

#[test]
fn test_eight_loops_moves_largest_power() {
    let f = fixture();
    let tool = ByteConcat::new();

    let report = Composer::new(&tool)
        .compose(&f.source, loops(8), &f.output)
        .unwrap();

    assert_eq!(report.merge_invocations, 3);
    assert_eq!(fs::read(&f.output).unwrap(), CLIP.repeat(8));
    assert_eq!(
        files_in(f.dir.path()),
        vec!["clip.mkv", "clip_looped_1hr.mkv"]
    );
}

// === Doubling + Assembly ===

#[test]
fn test_five_loops_uses_three_merges() {
    let f = fixture();
    let tool = ByteConcat::new();

    let report = Composer::new(&tool)
        .compose(&f.source, loops(5), &f.output)
        .unwrap();

    assert_eq!(report.merge_invocations, 3);
    let calls = tool.calls.borrow();
    assert_eq!(
        *calls,
        vec![
            (vec![f.source.clone(), f.source.clone()], temp(&f, 0)),
            (vec![temp(&f, 0), temp(&f, 0)], temp(&f, 1)),
            (vec![temp(&f, 1), f.source.clone()], f.output.clone()),
        ]
    );
    assert_eq!(fs::read(&f.output).unwrap(), CLIP.repeat(5));
    assert_eq!(report.cleanup.removed, vec![temp(&f, 0), temp(&f, 1)]);
}

#[test]
fn test_every_count_up_to_forty() {
    for n in 1..=40u64 {
        let f = fixture();
        let tool = ByteConcat::new();

        let report = Composer::new(&tool)
            .compose(&f.source, loops(n), &f.output)
            .unwrap();

        let expected_merges = CompositionPlan::build(loops(n)).merge_invocations();
        assert_eq!(report.merge_invocations, expected_merges, "merges for {n}");
        assert_eq!(tool.call_count(), expected_merges, "tool calls for {n}");
        assert_eq!(fs::read(&f.output).unwrap(), CLIP.repeat(n as usize), "content for {n}");
        assert_eq!(
            files_in(f.dir.path()),
            vec!["clip.mkv", "clip_looped_1hr.mkv"],
            "leftovers for {n}"
        );
        assert_eq!(fs::read(&f.source).unwrap(), CLIP, "source untouched for {n}");
    }
}

// === Failure Handling ===

#[test_case(1 ; "during doubling")]
#[test_case(3 ; "during assembly")]
fn test_merge_failure_aborts_and_cleans_up(fail_on: usize) {
    let f = fixture();
    // 11 = 8 + 2 + 1: three doublings then one assembly merge
    let tool = ByteConcat::failing_on(fail_on);

    let err = Composer::new(&tool)
        .compose(&f.source, loops(11), &f.output)
        .unwrap_err();

    match err {
        LooperError::MergeFailed {
            tool: name,
            status,
            diagnostic,
            ..
        } => {
            assert_eq!(name, "byte-concat");
            assert_eq!(status, Some(2));
            assert_eq!(diagnostic, "Error: simulated failure\nsecond line");
        }
        other => panic!("Expected MergeFailed, got {:?}", other),
    }

    // Nothing runs after the failing call
    assert_eq!(tool.call_count(), fail_on + 1);

    let leftovers = files_in(f.dir.path());
    assert!(
        leftovers.iter().all(|name| !name.contains("_temp_")),
        "intermediates left behind: {:?}",
        leftovers
    );
    assert_eq!(fs::read(&f.source).unwrap(), CLIP);
}

#[test]
fn test_launch_failure_is_reported() {
    let f = fixture();

    let err = Composer::new(&Unlaunchable)
        .compose(&f.source, loops(3), &f.output)
        .unwrap_err();

    assert_eq!(err.error_code(), "TOOL_LAUNCH_FAILED");
    assert_eq!(files_in(f.dir.path()), vec!["clip.mkv"]);
}

// === Input Validation ===

#[test]
fn test_output_must_differ_from_source() {
    let f = fixture();
    let tool = ByteConcat::new();

    let err = Composer::new(&tool)
        .compose(&f.source, loops(4), &f.source)
        .unwrap_err();

    assert!(matches!(err, LooperError::OutputIsSource { .. }));
    assert_eq!(tool.call_count(), 0);
    assert_eq!(fs::read(&f.source).unwrap(), CLIP);
}

#[test]
fn test_missing_source() {
    let f = fixture();
    let tool = ByteConcat::new();

    let err = Composer::new(&tool)
        .compose(&f.dir.path().join("missing.mkv"), loops(2), &f.output)
        .unwrap_err();

    assert!(matches!(err, LooperError::SourceNotFound { .. }));
}

#[test_case(2 ; "moved into place")]
#[test_case(3 ; "assembled")]
fn test_source_named_like_an_intermediate_is_untouched(n: u64) {
    let dir = tempdir().unwrap();
    let source = dir.path().join("show_temp_0.mkv");
    let bystander = dir.path().join("show_temp_0_1.mkv");
    let output = dir.path().join("show.mkv");
    fs::write(&source, CLIP).unwrap();
    fs::write(&bystander, b"mine").unwrap();
    let tool = ByteConcat::new();

    Composer::new(&tool)
        .compose(&source, loops(n), &output)
        .unwrap();

    assert_eq!(fs::read(&source).unwrap(), CLIP);
    assert_eq!(fs::read(&bystander).unwrap(), b"mine");
    assert_eq!(fs::read(&output).unwrap(), CLIP.repeat(n as usize));
    for (_, written) in tool.calls.borrow().iter() {
        assert_ne!(written, &source);
        assert_ne!(written, &bystander);
    }
    assert_eq!(
        files_in(dir.path()),
        vec!["show.mkv", "show_temp_0.mkv", "show_temp_0_1.mkv"]
    );
}

// === Planner + Composer ===

#[test]
fn test_plan_then_compose() {
    let f = fixture();
    let tool = ByteConcat::new();

    // A 1234.5s clip needs 3 copies to pass one hour
    let source_len = MediaDuration::from_secs(1234.5).unwrap();
    let plan = plan_loop_count(source_len, 3600.0).unwrap();
    assert_eq!(plan.loop_count.get(), 3);

    Composer::new(&tool)
        .compose(&f.source, plan.loop_count, &f.output)
        .unwrap();

    assert_eq!(tool.call_count(), 2);
    assert_eq!(fs::read(&f.output).unwrap(), CLIP.repeat(3));
}
