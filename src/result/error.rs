use super::Offset;
use std::fmt;

/// Result container misuse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultError {
    /// A row result was given something other than a record
    InvalidRow { kind: &'static str },
    /// A projected column is missing from the row at `offset`
    ColumnNotFound { column: String, offset: Offset },
    /// An offset that is neither an integer nor a string
    InvalidOffset { offset: String },
    /// A scalar result was given a list, map or operation
    InvalidScalar { kind: &'static str },
    /// No integer offset is left to append at
    OffsetOverflow,
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultError::InvalidRow { kind } => {
                write!(f, "Row results only accept records, got {}", kind)
            }
            ResultError::ColumnNotFound { column, offset } => {
                write!(f, "Column '{}' not found in row at offset {}", column, offset)
            }
            ResultError::InvalidOffset { offset } => {
                write!(f, "Invalid offset {}: expected an integer or a string", offset)
            }
            ResultError::InvalidScalar { kind } => {
                write!(f, "Scalar results only accept null or scalar values, got {}", kind)
            }
            ResultError::OffsetOverflow => write!(f, "Cannot append: the highest offset is already {}", i64::MAX),
        }
    }
}

impl std::error::Error for ResultError {}
