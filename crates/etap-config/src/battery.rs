use crate::error::{CatalogError, ValidationError};
use crate::v01::battery::BatteryV01;
use etap_utils::id_map::{ItemId, id_map};
use etap_utils::loader::{Filter, Loader};
use futures::StreamExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scaled answers range over `0..=SCALE_MAX`.
pub const SCALE_MAX: u8 = 4;
/// Stage blocks are keyed `1..=STAGE_COUNT` and processed in ascending order.
pub const STAGE_COUNT: u8 = 7;

#[derive(Deserialize, Debug)]
#[serde(tag = "version")]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub enum VersionConfig {
    #[serde(rename = "0.1")]
    V01 { battery: BatteryV01 },
}

#[derive(Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScaledQuestion {
    pub id: String,
    pub text: String,
}

/// A boolean statement of the idealization block. `ideal_when` marks the
/// answer that indicates idealized self-presentation; a question can carry
/// at most one such mark, so no index ever belongs to both sets.
#[derive(Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct BooleanQuestion {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal_when: Option<bool>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct OpenQuestion {
    pub id: String,
    pub text: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct StageBlock {
    pub stage: u8,
    pub title: String,
    pub questions: Vec<ScaledQuestion>,
}

impl ItemId for StageBlock {
    type IdType = u8;

    fn id(&self) -> Self::IdType {
        self.stage
    }
}

/// The fixed question battery: the screening block (scaled, "A"), the
/// stage blocks (scaled, "B1".."B7"), the idealization block (boolean,
/// "C") and the interview prompts (open text, "D").
#[derive(Serialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Battery {
    pub battery_id: String,
    pub title: String,
    pub screening: Vec<ScaledQuestion>,
    #[serde(with = "id_map")]
    pub stages: IndexMap<u8, StageBlock>,
    pub idealization: Vec<BooleanQuestion>,
    pub interview: Vec<OpenQuestion>,
}

impl Battery {
    #[must_use]
    pub fn stage(&self, stage: u8) -> Option<&StageBlock> {
        self.stages.get(&stage)
    }

    /// Idealization-set membership: does answering `value` to the question
    /// at `index` indicate an over-idealized self-report?
    #[must_use]
    pub fn is_idealized(&self, index: usize, value: bool) -> bool {
        self.idealization
            .get(index)
            .and_then(|question| question.ideal_when)
            .is_some_and(|ideal| ideal == value)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.screening.is_empty() {
            return Err(ValidationError::EmptyBlock { block: "A".to_owned() });
        }
        for stage in 1..=STAGE_COUNT {
            let block = self.stages.get(&stage).ok_or(ValidationError::MissingStage(stage))?;
            if block.questions.is_empty() {
                return Err(ValidationError::EmptyBlock {
                    block: format!("B{stage}"),
                });
            }
        }
        if let Some(stage) = self.stages.keys().find(|stage| !(1..=STAGE_COUNT).contains(*stage)) {
            return Err(ValidationError::StageOutOfRange(*stage));
        }
        if self.idealization.is_empty() {
            return Err(ValidationError::EmptyBlock { block: "C".to_owned() });
        }
        if self.interview.is_empty() {
            return Err(ValidationError::EmptyBlock { block: "D".to_owned() });
        }
        Ok(())
    }
}

/// Loads the single battery document from a config directory. Exactly one
/// battery is expected; zero or several is a startup error.
pub async fn load(loader: &Loader) -> Result<Battery, CatalogError> {
    tracing::debug!("loading battery");
    let mut found: Option<(String, Battery)> = None;
    let mut stream = loader.load_dir("battery", Filter::Yaml);
    while let Some(file) = stream.next().await {
        let file = file?;
        let VersionConfig::V01 { battery } = serde_yml::from_slice::<VersionConfig>(&file.content)
            .map_err(etap_utils::loader::error::LoadingError::from)?;
        let battery: Battery = battery.into();
        if let Some((first, _)) = &found {
            return Err(CatalogError::DuplicateBattery {
                first: first.clone(),
                second: file.metadata.key,
            });
        }
        found = Some((file.metadata.key, battery));
    }
    let (key, battery) = found.ok_or(CatalogError::NoDocument)?;
    tracing::debug!(
        key,
        battery_id = battery.battery_id,
        screening = battery.screening.len(),
        stages = battery.stages.len(),
        idealization = battery.idealization.len(),
        interview = battery.interview.len(),
        "loaded battery"
    );
    Ok(battery)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(id: &str) -> ScaledQuestion {
        ScaledQuestion {
            id: id.to_owned(),
            text: format!("statement {id}"),
        }
    }

    fn minimal_battery() -> Battery {
        let stages = (1..=STAGE_COUNT)
            .map(|stage| {
                (
                    stage,
                    StageBlock {
                        stage,
                        title: format!("stage {stage}"),
                        questions: vec![scaled(&format!("b{stage}-1"))],
                    },
                )
            })
            .collect();
        Battery {
            battery_id: "test".to_owned(),
            title: "Test battery".to_owned(),
            screening: vec![scaled("a1")],
            stages,
            idealization: vec![
                BooleanQuestion {
                    id: "c1".to_owned(),
                    text: "always calm".to_owned(),
                    ideal_when: Some(true),
                },
                BooleanQuestion {
                    id: "c2".to_owned(),
                    text: "sometimes distracted".to_owned(),
                    ideal_when: Some(false),
                },
                BooleanQuestion {
                    id: "c3".to_owned(),
                    text: "neutral filler".to_owned(),
                    ideal_when: None,
                },
            ],
            interview: vec![OpenQuestion {
                id: "d1".to_owned(),
                text: "describe".to_owned(),
            }],
        }
    }

    #[test]
    fn valid_battery_passes_validation() {
        minimal_battery().validate().unwrap();
    }

    #[test]
    fn missing_stage_is_fatal() {
        let mut battery = minimal_battery();
        battery.stages.shift_remove(&4);
        assert!(matches!(battery.validate(), Err(ValidationError::MissingStage(4))));
    }

    #[test]
    fn empty_stage_block_is_fatal() {
        let mut battery = minimal_battery();
        battery.stages.get_mut(&2).unwrap().questions.clear();
        assert!(matches!(battery.validate(), Err(ValidationError::EmptyBlock { .. })));
    }

    #[test]
    fn idealization_membership_follows_the_mark() {
        let battery = minimal_battery();
        assert!(battery.is_idealized(0, true));
        assert!(!battery.is_idealized(0, false));
        assert!(battery.is_idealized(1, false));
        assert!(!battery.is_idealized(2, true));
        assert!(!battery.is_idealized(2, false));
        // out of range indexes are never idealized
        assert!(!battery.is_idealized(99, true));
    }

    #[test]
    fn parses_versioned_document() {
        let document = r#"
version: "0.1"
battery:
  id: etap-7d
  title: "Этап-Тест 7D"
  screening:
    - id: a1
      text: "statement one"
  stages:
    - stage: 1
      title: "Первый этап"
      questions:
        - id: b1-1
          text: "stage statement"
  idealization:
    - id: c1
      text: "never angry"
      ideal-when: true
  interview:
    - id: d1
      text: "describe your experience"
"#;
        let VersionConfig::V01 { battery } = serde_yml::from_str::<VersionConfig>(document).unwrap();
        let battery: Battery = battery.into();
        assert_eq!(battery.battery_id, "etap-7d");
        assert_eq!(battery.screening.len(), 1);
        assert_eq!(battery.stages.get(&1).unwrap().questions.len(), 1);
        assert_eq!(battery.idealization[0].ideal_when, Some(true));
    }
}
