//! Result and error types for Storyboard.

use std::fmt;
use thiserror::Error;

/// Result type for Storyboard operations
pub type StoryboardResult<T> = Result<T, StoryboardError>;

/// Where in a script an error was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Stage title, if the error belongs to a stage
    pub stage: Option<String>,
    /// 1-based sub-step index within the stage
    pub sub_step: Option<usize>,
}

impl ErrorContext {
    /// Context for errors not tied to a particular stage.
    #[must_use]
    pub const fn script() -> Self {
        Self {
            stage: None,
            sub_step: None,
        }
    }

    /// Context for a whole stage.
    #[must_use]
    pub fn stage(title: impl Into<String>) -> Self {
        Self {
            stage: Some(title.into()),
            sub_step: None,
        }
    }

    /// Narrow this context to a 1-based sub-step.
    #[must_use]
    pub fn with_sub_step(mut self, index: usize) -> Self {
        self.sub_step = Some(index);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.stage, self.sub_step) {
            (Some(stage), Some(step)) => write!(f, "stage '{stage}', sub-step {step}"),
            (Some(stage), None) => write!(f, "stage '{stage}'"),
            (None, Some(step)) => write!(f, "sub-step {step}"),
            (None, None) => write!(f, "script"),
        }
    }
}

/// Errors that can occur in Storyboard
#[derive(Debug, Error)]
pub enum StoryboardError {
    /// Invalid script, group, or duration. Always raised before rendering starts.
    #[error("Configuration error at {context}: {message}")]
    Configuration {
        /// Offending stage / sub-step
        context: ErrorContext,
        /// Error message
        message: String,
    },

    /// The rendering surface rejected a command
    #[error("Rendering surface error: {message}")]
    Surface {
        /// Error message
        message: String,
    },

    /// Operation called in the wrong sequencer state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Timing verification input was malformed
    #[error("Timing check failed: {message}")]
    Timing {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StoryboardError {
    /// Configuration error with no stage context.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            context: ErrorContext::script(),
            message: message.into(),
        }
    }

    /// Configuration error attributed to a stage / sub-step.
    #[must_use]
    pub fn config_at(context: ErrorContext, message: impl Into<String>) -> Self {
        Self::Configuration {
            context,
            message: message.into(),
        }
    }

    /// Rendering surface error.
    #[must_use]
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }

    /// Invalid state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Attach stage context to a configuration error that has none yet.
    #[must_use]
    pub fn in_context(self, context: &ErrorContext) -> Self {
        match self {
            Self::Configuration { context: own, message } if own == ErrorContext::script() => {
                Self::Configuration {
                    context: context.clone(),
                    message,
                }
            }
            other => other,
        }
    }

    /// Whether this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
