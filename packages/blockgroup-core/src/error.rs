use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two edits of one batch address overlapping ranges.
    #[error("conflicting edits: {0}")]
    Conflict(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    /// A drop had no adjacent eligible block. The gesture falls back to a plain move.
    #[error("no grouping target at position {0}")]
    NoGroupingTarget(usize),
    #[error("position {pos} out of range for document of size {size}")]
    PositionOutOfRange { pos: usize, size: usize },
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("no group at position {0}")]
    NotAGroup(usize),
    #[error("drag session armed against version {armed}, document is at {current}")]
    StaleSession { armed: u64, current: u64 },
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Declined gestures are not failures: the host carries on with its default behavior.
    pub fn is_declined(&self) -> bool {
        matches!(self, Error::NoGroupingTarget(_) | Error::StaleSession { .. })
    }
}
