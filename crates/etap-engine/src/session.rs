use crate::error::SessionError;
use etap_config::battery::{Battery, SCALE_MAX};
use indexmap::IndexMap;
use std::fmt;

/// Key of an answer sequence: the screening block ("A"), one of the stage
/// blocks ("B1".."B7") or the idealization block ("C").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerKey {
    Screening,
    Stage(u8),
    Idealization,
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKey::Screening => write!(f, "A"),
            AnswerKey::Stage(stage) => write!(f, "B{stage}"),
            AnswerKey::Idealization => write!(f, "C"),
        }
    }
}

/// Per-respondent mutable record of collected answers. Created when a
/// conversation starts, discarded when it reaches a terminal state.
/// Answers are append-only; every cursor equals the number of answers
/// recorded for its block while that block is active.
#[derive(Debug, Default)]
pub struct SessionState {
    answers: IndexMap<AnswerKey, Vec<u8>>,
    open_answers: Vec<String>,
    /// Index into the ascending stage keys while in the stage block (0..=6).
    stage_cursor: usize,
    /// Position within the current stage's question list.
    stage_position: usize,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn answers(&self, key: AnswerKey) -> &[u8] {
        self.answers.get(&key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn open_answers(&self) -> &[String] {
        &self.open_answers
    }

    #[must_use]
    pub fn stage_cursor(&self) -> usize {
        self.stage_cursor
    }

    #[must_use]
    pub fn stage_position(&self) -> usize {
        self.stage_position
    }

    fn capacity(battery: &Battery, key: AnswerKey) -> Result<usize, SessionError> {
        match key {
            AnswerKey::Screening => Ok(battery.screening.len()),
            AnswerKey::Stage(stage) => battery
                .stage(stage)
                .map(|block| block.questions.len())
                .ok_or(SessionError::UnknownStage(stage)),
            AnswerKey::Idealization => Ok(battery.idealization.len()),
        }
    }

    /// Appends a scaled or boolean answer and advances the block cursor.
    /// Rejected without mutation when the block is already full or the
    /// value is outside the answer domain.
    pub fn record_answer(&mut self, battery: &Battery, key: AnswerKey, value: u8) -> Result<(), SessionError> {
        let max = match key {
            AnswerKey::Idealization => 1,
            AnswerKey::Screening | AnswerKey::Stage(_) => SCALE_MAX,
        };
        if value > max {
            return Err(SessionError::ValueOutOfRange { key, value });
        }
        let capacity = Self::capacity(battery, key)?;
        let answers = self.answers.entry(key).or_default();
        if answers.len() >= capacity {
            return Err(SessionError::BlockFull { key });
        }
        answers.push(value);
        if let AnswerKey::Stage(_) = key {
            self.stage_position += 1;
            let stage_len = Self::capacity(battery, key)?;
            if self.stage_position >= stage_len {
                self.stage_cursor += 1;
                self.stage_position = 0;
            }
        }
        Ok(())
    }

    /// Appends an interview answer and advances the interview cursor.
    pub fn record_open_answer(&mut self, battery: &Battery, text: String) -> Result<(), SessionError> {
        if self.open_answers.len() >= battery.interview.len() {
            return Err(SessionError::InterviewFull);
        }
        self.open_answers.push(text);
        Ok(())
    }

    /// Cursor of a block, always equal to the recorded answer count.
    #[must_use]
    pub fn cursor(&self, key: AnswerKey) -> usize {
        self.answers(key).len()
    }

    #[must_use]
    pub fn interview_cursor(&self) -> usize {
        self.open_answers.len()
    }

    pub fn into_open_answers(self) -> Vec<String> {
        self.open_answers
    }
}
