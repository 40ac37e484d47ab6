//! Error types for fogmap.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FogError {
    // Registry errors
    #[error("No representative observation for station {station}")]
    MissingRepresentative { station: String },

    #[error("Unknown station: {station}")]
    UnknownStation { station: String },

    #[error("Invalid station mode '{value}', expected none, fog or dense")]
    InvalidMode { value: String },

    // Geography errors
    #[error("Topology object '{name}' not found")]
    MissingObject { name: String },

    #[error("Invalid topology: {reason}")]
    Topology { reason: String },

    // Rendering errors
    #[error("Render failed: {0}")]
    Render(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FogError>;
