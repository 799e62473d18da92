use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("block {block} contains no questions")]
    EmptyBlock { block: String },
    #[error("stage block {0} is missing from the battery")]
    MissingStage(u8),
    #[error("stage {0} is outside the supported range 1..=7")]
    StageOutOfRange(u8),
    #[error("interpretation stage {0} is outside the supported range 0..=7")]
    InterpretationStageOutOfRange(u8),
    #[error("level \"{level}\" of stage {stage} has min {min} greater than max {max}")]
    InvertedLevelRange { stage: u8, level: String, min: u32, max: u32 },
    #[error("levels \"{first}\" and \"{second}\" of stage {stage} overlap")]
    OverlappingLevels { stage: u8, first: String, second: String },
    #[error("stage {stage} defines no levels")]
    NoLevels { stage: u8 },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Loading(#[from] etap_utils::loader::error::LoadingError),
    #[error("no document found in the config directory")]
    NoDocument,
    #[error("more than one battery document found ({first} and {second})")]
    DuplicateBattery { first: String, second: String },
    #[error("stage {0} is interpreted by more than one document")]
    DuplicateInterpretation(u8),
}
