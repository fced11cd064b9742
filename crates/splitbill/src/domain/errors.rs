//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("a person needs a name")]
    MissingName,
    #[error("a person needs at least one bill line")]
    MissingBillLines,
    #[error("no person at position {index} (list has {len})")]
    UnknownEntry { index: usize, len: usize },
}
