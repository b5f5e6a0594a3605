use thiserror::Error;

/// Errors raised by heap mutators and container operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("wrong type argument: expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("position {0} is not on a character boundary")]
    NotCharBoundary(usize),
    #[error("invalid character code {0:#x}")]
    InvalidCharacter(u32),
}
