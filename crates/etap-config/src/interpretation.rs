use crate::error::{CatalogError, ValidationError};
use crate::v01::interpretation::InterpretationV01;
use etap_utils::id_map::{ItemId, id_map};
use etap_utils::loader::{Filter, Loader};
use futures::StreamExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
#[serde(tag = "version")]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub enum VersionConfig {
    #[serde(rename = "0.1")]
    V01 { interpretations: Vec<InterpretationV01> },
}

/// A named score sub-range within a stage's interpretation. Bounds are
/// inclusive on both ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Level {
    pub id: String,
    pub title: String,
    pub min: u32,
    pub max: u32,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Level {
    #[must_use]
    pub fn contains(&self, score: u32) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Interpretation {
    pub stage: u8,
    pub title: String,
    pub levels: Vec<Level>,
}

impl ItemId for Interpretation {
    type IdType = u8;

    fn id(&self) -> Self::IdType {
        self.stage
    }
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct InterpretationCatalog {
    #[serde(with = "id_map")]
    pub stages: IndexMap<u8, Interpretation>,
}

impl InterpretationCatalog {
    #[must_use]
    pub fn get(&self, stage: u8) -> Option<&Interpretation> {
        self.stages.get(&stage)
    }

    /// Ranges within one stage must be mutually exclusive; gaps are legal.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for interpretation in self.stages.values() {
            let stage = interpretation.stage;
            if stage > 7 {
                return Err(ValidationError::InterpretationStageOutOfRange(stage));
            }
            if interpretation.levels.is_empty() {
                return Err(ValidationError::NoLevels { stage });
            }
            for level in &interpretation.levels {
                if level.min > level.max {
                    return Err(ValidationError::InvertedLevelRange {
                        stage,
                        level: level.id.clone(),
                        min: level.min,
                        max: level.max,
                    });
                }
            }
            let mut sorted: Vec<&Level> = interpretation.levels.iter().collect();
            sorted.sort_by_key(|level| level.min);
            for pair in sorted.windows(2) {
                if pair[1].min <= pair[0].max {
                    return Err(ValidationError::OverlappingLevels {
                        stage,
                        first: pair[0].id.clone(),
                        second: pair[1].id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Loads and merges all interpretation documents from the config
/// directory. A stage described twice is a startup error.
pub async fn load(loader: &Loader) -> Result<InterpretationCatalog, CatalogError> {
    tracing::debug!("loading interpretations");
    let mut stages = IndexMap::new();
    let mut stream = loader.load_dir("interpretations", Filter::Yaml);
    while let Some(file) = stream.next().await {
        let file = file?;
        let VersionConfig::V01 { interpretations } = serde_yml::from_slice::<VersionConfig>(&file.content)
            .map_err(etap_utils::loader::error::LoadingError::from)?;
        for interpretation in interpretations {
            let interpretation: Interpretation = interpretation.into();
            let stage = interpretation.stage;
            if stages.insert(stage, interpretation).is_some() {
                return Err(CatalogError::DuplicateInterpretation(stage));
            }
        }
    }
    if stages.is_empty() {
        return Err(CatalogError::NoDocument);
    }
    stages.sort_keys();
    tracing::debug!(stages = stages.len(), "loaded interpretation catalog");
    Ok(InterpretationCatalog { stages })
}
