//! Character-level text diff used to compare two note versions.
//!
//! The diff is computed from a longest-common-subsequence table, so it is
//! quadratic in the input lengths. Note titles and contents are capped at a
//! few hundred characters, which keeps the table small.

use serde_derive::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffType {
    Equal,
    Added,
    Removed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffSegment {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: DiffType,
}

/// Both sides of a diff. Removed text is shown on both sides, added text
/// only on the right, so the right side reads as a full edit script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDiff {
    pub left_text: String,
    pub right_text: String,
    pub left_segments: Vec<DiffSegment>,
    pub right_segments: Vec<DiffSegment>,
}

impl TextDiff {
    pub fn between(left: &str, right: &str) -> Self {
        let left_chars: Vec<char> = left.chars().collect();
        let right_chars: Vec<char> = right.chars().collect();

        let mut left_segments = vec![];
        let mut right_segments = vec![];
        for (c, kind) in edit_script(&left_chars, &right_chars) {
            match kind {
                DiffType::Equal | DiffType::Removed => {
                    push_merged(&mut left_segments, c, kind);
                    push_merged(&mut right_segments, c, kind);
                }
                DiffType::Added => push_merged(&mut right_segments, c, kind),
            }
        }

        TextDiff {
            left_text: left.to_string(),
            right_text: right.to_string(),
            left_segments,
            right_segments,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.right_segments
            .iter()
            .any(|segment| segment.kind != DiffType::Equal)
    }
}

fn edit_script(left: &[char], right: &[char]) -> Vec<(char, DiffType)> {
    let width = right.len() + 1;
    let mut lcs = vec![0u32; (left.len() + 1) * width];
    for i in 1..=left.len() {
        for j in 1..=right.len() {
            lcs[i * width + j] = if left[i - 1] == right[j - 1] {
                lcs[(i - 1) * width + j - 1] + 1
            } else {
                lcs[(i - 1) * width + j].max(lcs[i * width + j - 1])
            };
        }
    }

    // Walk back from the end; insertions win ties so they land after deletions.
    let mut script = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (left.len(), right.len());
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && left[i - 1] == right[j - 1] {
            script.push((left[i - 1], DiffType::Equal));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i * width + j - 1] >= lcs[(i - 1) * width + j]) {
            script.push((right[j - 1], DiffType::Added));
            j -= 1;
        } else {
            script.push((left[i - 1], DiffType::Removed));
            i -= 1;
        }
    }
    script.reverse();
    script
}

fn push_merged(segments: &mut Vec<DiffSegment>, c: char, kind: DiffType) {
    match segments.last_mut() {
        Some(last) if last.kind == kind => last.text.push(c),
        _ => segments.push(DiffSegment {
            text: c.to_string(),
            kind,
        }),
    }
}
