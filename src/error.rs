//! Error handling for EDAI
//!
//! Every fatal condition maps to a process exit code. Recoverable conditions
//! (render/playback failures, corrupt metadata) are reported and the session
//! continues.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for EDAI operations
pub type Result<T> = std::result::Result<T, EdaiError>;

/// Exit code for a normal quit-and-save.
pub const EXIT_OK: u8 = 0;
/// Exit code when the user cancelled a prompt.
pub const EXIT_ABORTED: u8 = 1;
/// Exit code for preflight, validation and I/O failures.
pub const EXIT_FATAL: u8 = 2;

/// Main error type for EDAI operations
#[derive(Error, Debug)]
pub enum EdaiError {
    // File Errors
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Error while checking if the file exists: {}: {source}", .path.display())]
    PathCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file: {}: {source}", .path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {}: {source}", .path.display())]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Preflight Errors
    #[error(
        "Cannot continue because the following {} missing: {}",
        commands_phrase(.tools),
        .tools.join(", ")
    )]
    MissingTools { tools: Vec<String> },

    // Container Errors
    #[error(
        "Unable to save file because it is too large for EDAI. Your settings are {overage} bytes too large to be saved"
    )]
    ConfigTooLarge { overage: usize },

    #[error("Refusing to convert {}: conversion would overwrite it", .path.display())]
    DestinationConflict { path: PathBuf },

    // External Tool Errors
    #[error("Failed to decode {} using ffmpeg, make sure it is a valid audio file: {reason}", .path.display())]
    ConversionFailed { path: PathBuf, reason: String },

    #[error("An error occurred while rendering the file: {reason}")]
    RenderFailed { reason: String },

    #[error("Playback failed: {reason}")]
    PlaybackFailed { reason: String },

    #[error("Could not probe stream information: {reason}")]
    ProbeFailed { reason: String },

    #[error("Failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn commands_phrase(tools: &[String]) -> &'static str {
    if tools.len() > 1 {
        "commands are"
    } else {
        "command is"
    }
}

impl EdaiError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EdaiError::FileNotFound { .. } => "FILE_NOT_FOUND",
            EdaiError::PathCheck { .. } => "PATH_CHECK",
            EdaiError::FileReadError { .. } => "FILE_READ",
            EdaiError::FileWriteError { .. } => "FILE_WRITE",
            EdaiError::MissingTools { .. } => "MISSING_TOOLS",
            EdaiError::ConfigTooLarge { .. } => "CONFIG_TOO_LARGE",
            EdaiError::DestinationConflict { .. } => "DESTINATION_CONFLICT",
            EdaiError::ConversionFailed { .. } => "CONVERSION_FAILED",
            EdaiError::RenderFailed { .. } => "RENDER_FAILED",
            EdaiError::PlaybackFailed { .. } => "PLAYBACK_FAILED",
            EdaiError::ProbeFailed { .. } => "PROBE_FAILED",
            EdaiError::ToolLaunch { .. } => "TOOL_LAUNCH",
            EdaiError::Io(_) => "IO_ERROR",
            EdaiError::Json(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Process exit code when this error ends the session.
    pub fn exit_code(&self) -> u8 {
        EXIT_FATAL
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            EdaiError::FileNotFound { .. } => Some("Check the file path and try again."),
            EdaiError::MissingTools { .. } => {
                Some("You can usually install them using your system's package manager.")
            }
            EdaiError::ConfigTooLarge { .. } => {
                Some("Please remove some settings and try again.")
            }
            EdaiError::ConversionFailed { .. } => {
                Some("Check that the file plays in another application.")
            }
            EdaiError::RenderFailed { .. } => {
                Some("Make sure all of your settings are configured properly and try again.")
            }
            EdaiError::DestinationConflict { .. } => {
                Some("Rename the file so it does not carry the .edai or .edaitmp extension.")
            }
            _ => None,
        }
    }
}

/// Reasons an embedded metadata blob could not be read back.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("no closing delimiter within {limit} bytes of the blob start")]
    Unterminated { limit: usize },

    #[error("blob is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded blob is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("decoded blob is not a valid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
