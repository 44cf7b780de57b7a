//! Error types for the sharepoint_drive crate.

use thiserror::Error;

/// Errors that can occur when interacting with a SharePoint drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unsupported item type: {0}")]
    UnsupportedItemType(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Local I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid site name or URL: {0}")]
    InvalidSite(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

impl DriveError {
    /// Whether the remote reported the addressed item as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriveError::NotFound(_))
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
