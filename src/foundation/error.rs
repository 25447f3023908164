use std::path::PathBuf;

/// Convenience result type used across newsreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy returned by engine APIs.
///
/// Asset failures are recoverable per image (the pipeline drops the image and continues); plan
/// and encoding failures are fatal to the render request.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Raised by the asset loader for a single input image or template.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("'{source_label}' is unreadable or corrupt: {reason}")]
    Corrupt { source_label: String, reason: String },

    #[error("'{source_label}' has an unsupported format: {reason}")]
    Unsupported { source_label: String, reason: String },

    #[error("'{source_label}' is too large: {reason}")]
    TooLarge { source_label: String, reason: String },
}

impl AssetError {
    pub fn corrupt(label: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corrupt {
            source_label: label.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(label: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unsupported {
            source_label: label.into(),
            reason: reason.to_string(),
        }
    }

    pub fn too_large(label: impl Into<String>, reason: impl ToString) -> Self {
        Self::TooLarge {
            source_label: label.into(),
            reason: reason.to_string(),
        }
    }

    /// Label of the offending source.
    pub fn source_label(&self) -> &str {
        match self {
            Self::Corrupt { source_label, .. }
            | Self::Unsupported { source_label, .. }
            | Self::TooLarge { source_label, .. } => source_label,
        }
    }
}

/// Contract violations. These are always surfaced, never recovered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no usable content: zero valid images and no title or summary text")]
    NoContent,

    #[error("keyframe count {keyframes} does not match duration count {durations}")]
    MismatchedLengths { keyframes: usize, durations: usize },

    #[error("frame count must be >= 1, got {0}")]
    InvalidFrameCount(usize),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failures while turning a render plan into a video file.
#[derive(thiserror::Error, Debug)]
pub enum EncodingError {
    #[error("render plan has no frames")]
    EmptyPlan,

    #[error("cannot write '{}': {reason}", path.display())]
    IoFailure { path: PathBuf, reason: String },

    #[error("codec failure: {0}")]
    CodecFailure(String),

    #[error("render was cancelled")]
    Cancelled,
}

impl EncodingError {
    pub fn io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::IoFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn codec(msg: impl Into<String>) -> Self {
        Self::CodecFailure(msg.into())
    }
}

impl ReelError {
    /// Build a [`ValidationError::Config`] error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::Config(msg.into()))
    }

    /// Return `true` when the error is an asset-level failure the pipeline may skip past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Asset(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
