// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid competition window: start {start} / deadline {deadline} / end {end}")]
    InvalidCompetitionWindow {
        start: String,
        deadline: String,
        end: String,
    },

    #[error("Invalid competition duration: {0} months")]
    InvalidDuration(u32),

    #[error("Calendar computation out of range: {0}")]
    CalendarOverflow(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
