use thiserror::Error;

/// Main error type for the Overlay-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Library save error: {0}")]
    Save(#[from] SaveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Failure taxonomy for the overlay-and-export pipeline
///
/// This is a closed set: every stage of the pipeline fails fast with exactly
/// one of these kinds, and no partial-success state exists. `ExportFailed`
/// carries the underlying encoder diagnostic when one was reported, `None`
/// for unrecognized terminal states.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to open source asset: {path}")]
    AssetCreationFailed { path: String },

    #[error("Required {kind} track missing or unresolvable: {path}")]
    TrackCreationFailed { kind: String, path: String },

    #[error("Failed to insert source time range into composition: {reason}")]
    TimeRangeInsertionFailed { reason: String },

    #[error("Overlay image could not be decoded: {reason}")]
    ImageLoadingFailed { reason: String },

    #[error("Export session could not be created: {reason}")]
    ExportSessionCreationFailed { reason: String },

    #[error("Export job failed: {}", .underlying.as_deref().unwrap_or("no diagnostic reported"))]
    ExportFailed { underlying: Option<String> },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Errors from the save-to-library boundary
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Media library access not authorized")]
    NotAuthorized,

    #[error("Media library import failed")]
    Unknown,
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Export(ExportError::AssetCreationFailed { path }) => {
                format!("Could not open video '{}'. Please check the file exists and is a supported container.", path)
            }
            Self::Export(ExportError::TrackCreationFailed { kind, path }) => {
                format!("'{}' has no usable {} track. Both a video and an audio track are required.", path, kind)
            }
            Self::Export(ExportError::ImageLoadingFailed { .. }) => {
                "The overlay image could not be decoded. Supported formats: PNG, JPEG.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

impl ExportError {
    /// True for the terminal export-job failure (as opposed to a setup failure)
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::ExportFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_failed_message_without_diagnostic() {
        let err = ExportError::ExportFailed { underlying: None };
        assert!(err.to_string().contains("no diagnostic reported"));
    }

    #[test]
    fn export_failed_message_with_diagnostic() {
        let err = ExportError::ExportFailed {
            underlying: Some("muxer rejected stream".to_string()),
        };
        assert!(err.to_string().contains("muxer rejected stream"));
        assert!(err.is_job_failure());
    }

    #[test]
    fn setup_failures_are_not_job_failures() {
        let err = ExportError::ExportSessionCreationFailed {
            reason: "ffmpeg not found".to_string(),
        };
        assert!(!err.is_job_failure());
    }
}
