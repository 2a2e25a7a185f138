use std::fmt;

use thiserror::Error;

/// Why a single candidate model did not produce captions.
///
/// These never reach the user; the orchestrator logs them and moves on to the
/// next candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Transport(String),
    Status { code: u16, body: String },
    NoCaptions,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(msg) => write!(f, "transport error: {}", msg),
            FailureReason::Status { code, body } => write!(f, "status {}: {}", code, body),
            FailureReason::NoCaptions => write!(f, "no usable captions in model output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerModelFailure {
    pub model: String,
    pub reason: FailureReason,
}

impl fmt::Display for PerModelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {} failed: {}", self.model, self.reason)
    }
}

fn describe_last(last: &Option<PerModelFailure>) -> String {
    last.as_ref()
        .map(|failure| format!(" (last: {})", failure))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum MemeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
    #[error("Image required")]
    MissingImage,
    #[error("No image loaded in session")]
    NoImage,
    #[error("Invalid text style: {0}")]
    InvalidStyle(String),
    #[error("Provider error: {0}")]
    Provider(FailureReason),
    #[error("All {attempts} candidate models failed{}", describe_last(.last))]
    AllModelsFailed {
        attempts: usize,
        last: Option<PerModelFailure>,
    },
    #[error("Render source unavailable: {0}")]
    RenderSourceUnavailable(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl MemeError {
    /// Message safe to show to an end user. Diagnostic detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            MemeError::UnsupportedMedia(_) => "Please choose an image file.".to_string(),
            MemeError::MissingImage => "Image required".to_string(),
            MemeError::NoImage => "Upload an image first!".to_string(),
            MemeError::InvalidStyle(msg) => format!("Invalid text style: {}", msg),
            MemeError::AllModelsFailed { .. } | MemeError::Provider(_) => {
                "Failed to generate captions. Please try again.".to_string()
            }
            MemeError::RenderSourceUnavailable(_) => {
                "Could not export the meme: the source image is unavailable.".to_string()
            }
            MemeError::ConfigError(_) => "The service is not configured for this operation.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for MemeError {
    fn from(e: serde_json::Error) -> Self {
        MemeError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MemeError>;
