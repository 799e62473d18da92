use crate::battery::{Battery, BooleanQuestion, OpenQuestion, ScaledQuestion, StageBlock};
use etap_utils::id_map::{ItemId, id_map};
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScaledQuestionV01 {
    /// # Unique identifier of the statement
    pub id: String,
    /// # Statement shown to the respondent
    pub text: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct BooleanQuestionV01 {
    pub id: String,
    pub text: String,
    #[serde(default)]
    /// # Idealization mark
    /// The answer value that indicates idealized self-presentation, if any.
    pub ideal_when: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct OpenQuestionV01 {
    pub id: String,
    pub text: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct StageBlockV01 {
    /// # Stage number (1..=7)
    pub stage: u8,
    pub title: String,
    pub questions: Vec<ScaledQuestionV01>,
}

impl ItemId for StageBlockV01 {
    type IdType = u8;

    fn id(&self) -> Self::IdType {
        self.stage
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct BatteryV01 {
    /// # Unique identifier for the battery
    pub id: String,
    /// # Human-readable battery title
    pub title: String,
    pub screening: Vec<ScaledQuestionV01>,
    #[serde(with = "id_map")]
    pub stages: IndexMap<u8, StageBlockV01>,
    pub idealization: Vec<BooleanQuestionV01>,
    pub interview: Vec<OpenQuestionV01>,
}

impl From<ScaledQuestionV01> for ScaledQuestion {
    fn from(v01: ScaledQuestionV01) -> Self {
        Self {
            id: v01.id,
            text: v01.text,
        }
    }
}

impl From<BatteryV01> for Battery {
    fn from(v01: BatteryV01) -> Self {
        Self {
            battery_id: v01.id,
            title: v01.title,
            screening: v01.screening.into_iter().map(Into::into).collect(),
            stages: v01
                .stages
                .into_iter()
                .map(|(stage, block)| {
                    (
                        stage,
                        StageBlock {
                            stage: block.stage,
                            title: block.title,
                            questions: block.questions.into_iter().map(Into::into).collect(),
                        },
                    )
                })
                .collect(),
            idealization: v01
                .idealization
                .into_iter()
                .map(|q| BooleanQuestion {
                    id: q.id,
                    text: q.text,
                    ideal_when: q.ideal_when,
                })
                .collect(),
            interview: v01
                .interview
                .into_iter()
                .map(|q| OpenQuestion { id: q.id, text: q.text })
                .collect(),
        }
    }
}
