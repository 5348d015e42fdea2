use std::fmt;

pub mod attribute;
pub mod candidate;
pub mod roster;
pub mod validate;

pub use attribute::{Attribute, ATTRIBUTE_COUNT};
pub use candidate::Candidate;

/// Malformed candidate data. Raised by the roster loader and the matrix
/// builder; never produced for soft conditions (those resolve to neutral
/// defaults and surface through [validate] instead).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    EmptyRoster,
    DuplicateName(String),
    UnknownAttribute { candidate: String, value: String },
    MissingColumn(&'static str),
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRoster => write!(f, "roster contains no candidates"),
            Self::DuplicateName(name) => write!(f, "duplicate candidate name '{name}'"),
            Self::UnknownAttribute { candidate, value } => {
                write!(f, "candidate '{candidate}' has unknown attribute '{value}'")
            }
            Self::MissingColumn(column) => write!(f, "roster is missing column '{column}'"),
        }
    }
}

impl std::error::Error for InvalidInput {}
