//! Error taxonomy for the plan-generation pipeline.

use thiserror::Error;

/// Errors produced while validating, requesting, or streaming a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The request could not be sent, or the server answered with a
    /// non-success status. `status` is None when no response was received.
    #[error("transport error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    /// The response body ended unexpectedly or could not be read.
    #[error("stream error: {0}")]
    Stream(String),

    #[error("cancelled")]
    Cancelled,
}

impl PlanError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PlanError::Validation {
            field,
            message: message.into(),
        }
    }

    /// True when the caller may resubmit the same request unchanged.
    /// Validation failures need a corrected request first.
    pub fn is_resubmittable(&self) -> bool {
        matches!(self, PlanError::Transport { .. } | PlanError::Stream(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlanError::Cancelled)
    }
}

impl From<reqwest::Error> for PlanError {
    fn from(e: reqwest::Error) -> Self {
        PlanError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
