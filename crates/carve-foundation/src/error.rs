//! Error handling for carve

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for carve operations
pub type CarveResult<T> = Result<T, CarveError>;

/// Zero-based position inside a document, columns counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// Errors raised while extracting a component
#[derive(Debug, Error)]
pub enum CarveError {
    /// The document (or the wrapped selection) is not valid JSX/TSX
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        location: Option<SourceLocation>,
    },

    /// The selected text is not markup
    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    /// The selected markup is not inside a class, function or arrow-function component
    #[error("Invalid component: {message}")]
    InvalidComponent { message: String },

    /// Offsets, names or language ids supplied by the caller are unusable
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CarveError {
    /// Create a parse error without a location
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: None,
        }
    }

    /// Create a parse error pointing at a position in the document
    pub fn parse_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Parse {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create an invalid selection error
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection {
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "E_PARSE",
            Self::InvalidSelection { .. } => "E_INVALID_SELECTION",
            Self::InvalidComponent { .. } => "E_INVALID_COMPONENT",
            Self::InvalidInput { .. } => "E_INVALID_INPUT",
            Self::Io(_) => "E_IO",
            Self::Internal { .. } => "E_INTERNAL",
        }
    }

    /// Short message suitable for an editor notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse { message, location } => match location {
                Some(loc) => format!(
                    "Could not parse the document at {}:{}: {}",
                    loc.line + 1,
                    loc.column + 1,
                    message
                ),
                None => format!("Could not parse the document: {}", message),
            },
            Self::InvalidSelection { .. } => "Invalid JSX selected".to_string(),
            Self::InvalidComponent { .. } => {
                "Selected JSX is not inside a component".to_string()
            }
            other => other.to_string(),
        }
    }
}
