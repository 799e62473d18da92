use etap_config::interpretation::{Interpretation, InterpretationCatalog, Level};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no interpretation exists for stage {0}")]
    NoInterpretation(u8),
    #[error("no level of stage {stage} matches score {score}")]
    NoMatchingLevel { stage: u8, score: u32 },
}

/// The resolved interpretation for a computed (stage, score) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretationMatch<'a> {
    pub stage: u8,
    pub stage_title: &'a str,
    pub score: u32,
    pub level: &'a Level,
}

/// Looks up the interpretation for `stage` and scans its level buckets for
/// the first one whose inclusive range contains the stage's own sum (score
/// 0 for stage 0). Idempotent by construction.
pub fn resolve<'a>(
    catalog: &'a InterpretationCatalog,
    stage: u8,
    sums: &IndexMap<u8, u32>,
) -> Result<InterpretationMatch<'a>, ResolveError> {
    let interpretation: &Interpretation = catalog.get(stage).ok_or(ResolveError::NoInterpretation(stage))?;
    let score = if stage == 0 {
        0
    } else {
        sums.get(&stage).copied().unwrap_or(0)
    };
    let level = interpretation
        .levels
        .iter()
        .find(|level| level.contains(score))
        .ok_or(ResolveError::NoMatchingLevel { stage, score })?;
    Ok(InterpretationMatch {
        stage,
        stage_title: &interpretation.title,
        score,
        level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: &str, min: u32, max: u32) -> Level {
        Level {
            id: id.to_owned(),
            title: id.to_owned(),
            min,
            max,
            description: format!("{id} description"),
            recommendations: vec![format!("{id} recommendation")],
        }
    }

    fn catalog() -> InterpretationCatalog {
        InterpretationCatalog {
            stages: IndexMap::from([
                (
                    0,
                    Interpretation {
                        stage: 0,
                        title: "before the threshold".to_owned(),
                        levels: vec![level("below", 0, 26)],
                    },
                ),
                (
                    3,
                    Interpretation {
                        stage: 3,
                        title: "stage three".to_owned(),
                        levels: vec![level("low", 0, 20), level("medium", 21, 40), level("high", 41, 99)],
                    },
                ),
            ]),
        }
    }

    #[test]
    fn resolves_first_matching_bucket() {
        let catalog = catalog();
        let sums = IndexMap::from([(3, 40u32)]);
        let matched = resolve(&catalog, 3, &sums).unwrap();
        assert_eq!(matched.level.id, "medium");
        assert_eq!(matched.score, 40);
        assert_eq!(matched.stage_title, "stage three");
    }

    #[test]
    fn boundary_scores_resolve_inclusively() {
        let catalog = catalog();
        assert_eq!(resolve(&catalog, 3, &IndexMap::from([(3, 21u32)])).unwrap().level.id, "medium");
        assert_eq!(resolve(&catalog, 3, &IndexMap::from([(3, 20u32)])).unwrap().level.id, "low");
        assert_eq!(resolve(&catalog, 3, &IndexMap::from([(3, 41u32)])).unwrap().level.id, "high");
    }

    #[test]
    fn stage_zero_resolves_with_score_zero() {
        let catalog = catalog();
        // stage 0 ignores the sums entirely
        let sums = IndexMap::from([(1, 26u32)]);
        let matched = resolve(&catalog, 0, &sums).unwrap();
        assert_eq!(matched.level.id, "below");
        assert_eq!(matched.score, 0);
    }

    #[test]
    fn missing_stage_is_a_data_gap() {
        let catalog = catalog();
        let err = resolve(&catalog, 5, &IndexMap::new()).unwrap_err();
        assert_eq!(err, ResolveError::NoInterpretation(5));
    }

    #[test]
    fn score_in_a_gap_is_a_data_gap() {
        let catalog = catalog();
        let err = resolve(&catalog, 3, &IndexMap::from([(3, 100u32)])).unwrap_err();
        assert_eq!(err, ResolveError::NoMatchingLevel { stage: 3, score: 100 });
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = catalog();
        let sums = IndexMap::from([(3, 33u32)]);
        let first = resolve(&catalog, 3, &sums).unwrap();
        let second = resolve(&catalog, 3, &sums).unwrap();
        assert_eq!(first, second);
    }
}
