use thiserror::Error;

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Error type for the clustering and heatmap engines
#[derive(Error, Debug)]
pub enum OverlayError {
    /// Malformed geographic input (NaN, out-of-range lon/lat, empty set
    /// where one is required). Rejected before any managed state mutates.
    #[error("invalid input: {0}")]
    Input(String),

    /// Operation invoked in a state that cannot honor it
    /// (e.g. engine already destroyed).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Fixture/data file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture/data file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}
