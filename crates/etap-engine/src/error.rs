use crate::session::AnswerKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("block {key} is already fully answered")]
    BlockFull { key: AnswerKey },
    #[error("answer value {value} is outside the allowed range for block {key}")]
    ValueOutOfRange { key: AnswerKey, value: u8 },
    #[error("battery has no stage block {0}")]
    UnknownStage(u8),
    #[error("interview is already fully answered")]
    InterviewFull,
}
