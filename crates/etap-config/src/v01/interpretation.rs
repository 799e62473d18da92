use crate::interpretation::{Interpretation, Level};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LevelV01 {
    pub id: String,
    pub title: String,
    /// # Inclusive lower bound of the score range
    pub min: u32,
    /// # Inclusive upper bound of the score range
    pub max: u32,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct InterpretationV01 {
    /// # Stage the interpretation belongs to (0..=7)
    pub stage: u8,
    pub title: String,
    pub levels: Vec<LevelV01>,
}

impl From<LevelV01> for Level {
    fn from(v01: LevelV01) -> Self {
        Self {
            id: v01.id,
            title: v01.title,
            min: v01.min,
            max: v01.max,
            description: v01.description,
            recommendations: v01.recommendations,
        }
    }
}

impl From<InterpretationV01> for Interpretation {
    fn from(v01: InterpretationV01) -> Self {
        Self {
            stage: v01.stage,
            title: v01.title,
            levels: v01.levels.into_iter().map(Into::into).collect(),
        }
    }
}
