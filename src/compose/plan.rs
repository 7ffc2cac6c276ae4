//! Composition planning
//!
//! Builds the merge schedule for a loop count without touching the disk:
//! a doubling phase producing every power-of-two multiple up to the loop
//! count, then a greedy binary decomposition that picks which multiples to
//! concatenate into the output.

use std::fmt;

use serde::Serialize;

use crate::planner::LoopCount;

/// A media file taking part in composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactRef {
    /// The original video. Read-only.
    Source,
    /// `2^exponent` copies of the source, owned by the composer
    Intermediate { exponent: u32 },
    /// The user-visible result
    Output,
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRef::Source => write!(f, "source"),
            ArtifactRef::Intermediate { exponent } => write!(f, "{}x", 1u64 << exponent),
            ArtifactRef::Output => write!(f, "output"),
        }
    }
}

/// One external merge invocation: concatenate `inputs` in order into `output`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStep {
    pub inputs: Vec<ArtifactRef>,
    pub output: ArtifactRef,
    /// Copies of the source contained in `output`
    pub copies: u64,
}

impl fmt::Display for MergeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        write!(f, "{} -> {} ({} copies)", inputs.join(" + "), self.output, self.copies)
    }
}

/// How the output file comes into existence once doubling is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Finish {
    /// Loop count 1: plain file copy of the source, no merge
    CopySource,
    /// Loop count is a power of two: rename that intermediate to the output
    MoveIntoPlace { artifact: ArtifactRef },
    /// Several multiples: one ordered multi-input merge into the output
    Assemble { step: MergeStep },
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finish::CopySource => write!(f, "copy source -> output"),
            Finish::MoveIntoPlace { artifact } => write!(f, "move {} -> output", artifact),
            Finish::Assemble { step } => write!(f, "merge {}", step),
        }
    }
}

/// Complete merge schedule for one loop count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionPlan {
    pub loop_count: LoopCount,
    /// Self-merges, each doubling the previous largest multiple
    pub doublings: Vec<MergeStep>,
    /// Exponents picked by binary decomposition, highest first
    pub selected: Vec<u32>,
    pub finish: Finish,
}

impl CompositionPlan {
    pub fn build(loop_count: LoopCount) -> Self {
        let total = loop_count.get();

        if total == 1 {
            return Self {
                loop_count,
                doublings: Vec::new(),
                selected: vec![0],
                finish: Finish::CopySource,
            };
        }

        // table[k] holds 2^k copies
        let mut table = vec![ArtifactRef::Source];
        let mut doublings = Vec::new();
        let mut power: u64 = 1;
        while power * 2 <= total {
            let input = table[table.len() - 1];
            let output = ArtifactRef::Intermediate {
                exponent: table.len() as u32,
            };
            power *= 2;
            doublings.push(MergeStep {
                inputs: vec![input, input],
                output,
                copies: power,
            });
            table.push(output);
        }

        let mut remaining = total;
        let mut selected = Vec::new();
        for exponent in (0..table.len() as u32).rev() {
            let power = 1u64 << exponent;
            if remaining >= power {
                selected.push(exponent);
                remaining -= power;
            }
            if remaining == 0 {
                break;
            }
        }

        let finish = match selected.as_slice() {
            [only] => Finish::MoveIntoPlace {
                artifact: table[*only as usize],
            },
            picked => Finish::Assemble {
                step: MergeStep {
                    inputs: picked.iter().map(|&e| table[e as usize]).collect(),
                    output: ArtifactRef::Output,
                    copies: total,
                },
            },
        };

        Self {
            loop_count,
            doublings,
            selected,
            finish,
        }
    }

    /// Number of external merge-tool invocations the plan needs
    pub fn merge_invocations(&self) -> usize {
        let assembly = usize::from(matches!(self.finish, Finish::Assemble { .. }));
        self.doublings.len() + assembly
    }

    /// Powers of two available after doubling: 1, 2, 4, ...
    pub fn table_powers(&self) -> Vec<u64> {
        (0..=self.doublings.len() as u32).map(|e| 1u64 << e).collect()
    }

    /// Powers chosen for assembly, highest first; they sum to the loop count
    pub fn selected_powers(&self) -> Vec<u64> {
        self.selected.iter().map(|&e| 1u64 << e).collect()
    }

    /// Exponents of every intermediate the doubling phase creates
    pub fn intermediate_exponents(&self) -> impl Iterator<Item = u32> + '_ {
        self.doublings.iter().filter_map(|step| match step.output {
            ArtifactRef::Intermediate { exponent } => Some(exponent),
            _ => None,
        })
    }
}

impl fmt::Display for CompositionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} copies, {} merge invocation(s)",
            self.loop_count,
            self.merge_invocations()
        )?;
        for (i, step) in self.doublings.iter().enumerate() {
            writeln!(f, "  double {}: {}", i + 1, step)?;
        }
        write!(f, "  finish: {}", self.finish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn plan(n: u64) -> CompositionPlan {
        CompositionPlan::build(LoopCount::new(n).unwrap())
    }

    #[test]
    fn test_single_loop_is_copy() {
        let p = plan(1);
        assert_eq!(p.finish, Finish::CopySource);
        assert_eq!(p.merge_invocations(), 0);
        assert!(p.doublings.is_empty());
    }

    #[test]
    fn test_five_loops() {
        let p = plan(5);
        assert_eq!(p.table_powers(), vec![1, 2, 4]);
        assert_eq!(p.selected_powers(), vec![4, 1]);
        assert_eq!(
            p.finish,
            Finish::Assemble {
                step: MergeStep {
                    inputs: vec![
                        ArtifactRef::Intermediate { exponent: 2 },
                        ArtifactRef::Source
                    ],
                    output: ArtifactRef::Output,
                    copies: 5,
                }
            }
        );
        assert_eq!(p.merge_invocations(), 3);
        assert_eq!(p.intermediate_exponents().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_eight_loops_moves_into_place() {
        let p = plan(8);
        assert_eq!(p.doublings.len(), 3);
        assert_eq!(
            p.finish,
            Finish::MoveIntoPlace {
                artifact: ArtifactRef::Intermediate { exponent: 3 }
            }
        );
        assert_eq!(p.merge_invocations(), 3);
    }

    #[test]
    fn test_doubling_is_self_merge() {
        let p = plan(4);
        assert_eq!(
            p.doublings,
            vec![
                MergeStep {
                    inputs: vec![ArtifactRef::Source, ArtifactRef::Source],
                    output: ArtifactRef::Intermediate { exponent: 1 },
                    copies: 2,
                },
                MergeStep {
                    inputs: vec![
                        ArtifactRef::Intermediate { exponent: 1 },
                        ArtifactRef::Intermediate { exponent: 1 }
                    ],
                    output: ArtifactRef::Intermediate { exponent: 2 },
                    copies: 4,
                },
            ]
        );
    }

    #[test_case(2, 1, 1 ; "two")]
    #[test_case(3, 1, 2 ; "three")]
    #[test_case(7, 2, 3 ; "seven")]
    #[test_case(1000, 9, 6 ; "thousand")]
    #[test_case(36_000, 15, 5 ; "ten hours of one second clips")]
    fn test_counts(n: u64, doublings: usize, selected: usize) {
        let p = plan(n);
        assert_eq!(p.doublings.len(), doublings);
        assert_eq!(p.selected.len(), selected);
    }

    #[test]
    fn test_table_and_selection_properties() {
        for n in 1..=1025u64 {
            let p = plan(n);
            let largest = 1u64 << (63 - n.leading_zeros());

            let table = p.table_powers();
            assert_eq!(*table.last().unwrap(), largest, "largest power for {n}");
            assert!(table.windows(2).all(|w| w[1] == w[0] * 2));

            let selected = p.selected_powers();
            assert_eq!(selected.iter().sum::<u64>(), n, "selection sums to {n}");
            assert_eq!(selected.len() as u32, n.count_ones(), "popcount of {n}");
            assert!(selected.windows(2).all(|w| w[0] > w[1]), "highest first");

            let expected_merges = p.doublings.len() + usize::from(n.count_ones() > 1);
            assert_eq!(p.merge_invocations(), expected_merges);
        }
    }

    #[test]
    fn test_display() {
        let text = plan(5).to_string();
        assert!(text.starts_with("5 copies, 3 merge invocation(s)"));
        assert!(text.contains("source + source -> 2x (2 copies)"));
        assert!(text.contains("finish: merge 4x + source -> output (5 copies)"));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(plan(3)).unwrap();
        assert_eq!(json["loop_count"], 3);
        assert_eq!(json["finish"]["action"], "assemble");
        assert_eq!(json["finish"]["step"]["inputs"][0]["kind"], "intermediate");
        assert_eq!(json["finish"]["step"]["inputs"][1]["kind"], "source");
    }
}
