use crate::session::{AnswerKey, SessionState};
use etap_config::battery::{Battery, STAGE_COUNT};
use indexmap::IndexMap;

/// A stage qualifies when its block sum reaches this threshold.
pub const STAGE_THRESHOLD: u32 = 27;
/// Results with at least this many idealized answers carry a warning.
pub const DISTORTION_WARNING_THRESHOLD: u8 = 4;

/// Derived scoring outcome. Never stored, always recomputed from the
/// session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentResult {
    /// Classified stage, 0..=7; 0 means stage 1 did not reach the threshold.
    pub stage: u8,
    /// Per-stage block sums, keyed 1..=7 in ascending order.
    pub sums: IndexMap<u8, u32>,
    /// Count of idealized answers in the idealization block.
    pub distortion: u8,
}

impl AssessmentResult {
    #[must_use]
    pub fn distorted(&self) -> bool {
        self.distortion >= DISTORTION_WARNING_THRESHOLD
    }
}

/// Pure scoring over a session with blocks A, B and C fully answered.
///
/// The stage is the count of consecutive qualifying stages starting at 1:
/// the scan stops at the first stage whose sum is below the threshold,
/// regardless of later sums.
#[must_use]
pub fn compute(battery: &Battery, session: &SessionState) -> AssessmentResult {
    let sums: IndexMap<u8, u32> = (1..=STAGE_COUNT)
        .map(|stage| {
            let sum = session
                .answers(AnswerKey::Stage(stage))
                .iter()
                .map(|value| u32::from(*value))
                .sum();
            (stage, sum)
        })
        .collect();

    let mut stage = 0;
    for num in 1..=STAGE_COUNT {
        if sums.get(&num).copied().unwrap_or(0) >= STAGE_THRESHOLD {
            stage = num;
        } else {
            break;
        }
    }

    let distortion = session
        .answers(AnswerKey::Idealization)
        .iter()
        .enumerate()
        .filter(|(index, value)| battery.is_idealized(*index, **value == 1))
        .count();
    // Bounded by the idealization block length, which fits into u8.
    let distortion = u8::try_from(distortion).unwrap_or(u8::MAX);

    AssessmentResult { stage, sums, distortion }
}
