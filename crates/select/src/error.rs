//! Selector parsing error types

use std::fmt;

use sapling_dom::DomError;
use thiserror::Error;

/// Selector parsing result type
pub type SelectorResult<T> = Result<T, SelectorError>;

/// Location in selector source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Selector parsing errors
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Unexpected {found} at {location}")]
    UnexpectedToken {
        found: String,
        location: SourceLocation,
    },

    #[error("Unterminated string at {location}")]
    UnterminatedString { location: SourceLocation },

    #[error("Unknown pseudo-class ':{name}' at {location}")]
    UnknownPseudoClass {
        name: String,
        location: SourceLocation,
    },

    #[error("Invalid an+b expression '{expr}' at {location}")]
    InvalidNth {
        expr: String,
        location: SourceLocation,
    },

    #[error("Empty selector at {location}")]
    Empty { location: SourceLocation },
}

impl SelectorError {
    /// Get the source location of this error
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnexpectedToken { location, .. } => *location,
            Self::UnterminatedString { location } => *location,
            Self::UnknownPseudoClass { location, .. } => *location,
            Self::InvalidNth { location, .. } => *location,
            Self::Empty { location } => *location,
        }
    }

    pub fn unexpected(found: impl Into<String>, location: SourceLocation) -> Self {
        Self::UnexpectedToken {
            found: found.into(),
            location,
        }
    }
}

impl From<SelectorError> for DomError {
    fn from(err: SelectorError) -> Self {
        DomError::Syntax(err.to_string())
    }
}
