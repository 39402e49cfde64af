//! Error types for the letter pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for gc-letters operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Layout overflow and image failures are not errors; they are
/// reported as [`crate::flow::Warning`]s on the rendered letter.
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting is missing or malformed. Raised before any page
    /// is created.
    #[error("Invalid letter configuration: {0}")]
    Config(String),

    /// A length string whose numeric part cannot be parsed.
    #[error("Invalid length value: {0:?}")]
    InvalidUnit(String),

    /// The image source could not be read.
    #[error("Image could not be loaded: {0}")]
    ImageLoad(String),

    /// The image bytes could not be decoded.
    #[error("Image could not be decoded: {0}")]
    ImageDecode(String),

    /// Writing the finished letter failed.
    #[error("Failed to save letter '{file}'")]
    Export {
        file: String,
        #[source]
        source: io::Error,
    },

    /// Malformed letter definition or canvas JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
