use crate::battery::Battery;
use crate::error::ValidationError;
use crate::interpretation::InterpretationCatalog;

pub mod battery;
pub mod error;
pub mod interpretation;
pub mod v01;

/// The full immutable catalog the flow engine runs on: the question
/// battery plus the stage interpretation data. Loaded once at startup,
/// shared read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub battery: Battery,
    pub interpretations: InterpretationCatalog,
}

impl QuestionBank {
    /// Startup validation. A failure here is fatal: the engine cannot run
    /// on an incomplete battery or malformed interpretation ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.battery.validate()?;
        self.interpretations.validate()?;
        Ok(())
    }
}
