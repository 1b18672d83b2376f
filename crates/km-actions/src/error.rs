//! Error types for action construction

use km_core::PlistError;
use thiserror::Error;

/// Result type for action construction
pub type ActionResult<T> = Result<T, ActionError>;

/// An action could not be built from the options it was given
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// A required option is missing or blank
    #[error("{action}: missing required option '{field}'")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },

    /// Options are present but do not fit together
    #[error("{action}: {reason}")]
    InvalidOptions { action: &'static str, reason: String },

    /// A value could not be converted to its plist form
    #[error(transparent)]
    Plist(#[from] PlistError),
}

impl ActionError {
    pub(crate) fn invalid(action: &'static str, reason: impl Into<String>) -> Self {
        ActionError::InvalidOptions {
            action,
            reason: reason.into(),
        }
    }
}
