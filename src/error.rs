use std::fmt;

/// Reasons a packing request is rejected before any attempt runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    ZeroDimension { name: String },
    DuplicateName { name: String },
    /// Widths or heights add up past `u32::MAX`, so coordinates could overflow.
    TooLarge,
    InvalidConfig(String),
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::ZeroDimension { name } => {
                write!(f, "rectangle '{name}' must have non-zero width and height")
            }
            PackError::DuplicateName { name } => {
                write!(f, "rectangle name '{name}' is used more than once")
            }
            PackError::TooLarge => write!(f, "total rectangle dimensions exceed 4294967295"),
            PackError::InvalidConfig(msg) => write!(f, "invalid search config: {msg}"),
        }
    }
}

impl std::error::Error for PackError {}
