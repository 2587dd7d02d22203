use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed matrix identifier '{id}': {message}")]
    MalformedIdentifier { id: String, message: String },

    #[error("Failed to fetch release '{release}': {message}")]
    ReleaseFetch { release: String, message: String },

    #[error("Failed to render logo for {matrix_id} in release '{release}': {message}")]
    Render {
        release: String,
        matrix_id: String,
        message: String,
    },

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },
}

/// Type alias for Result with HistoryError
pub type Result<T> = std::result::Result<T, HistoryError>;

impl HistoryError {
    /// Create a new MalformedIdentifier error
    pub fn malformed_identifier(id: impl Into<String>, message: impl Into<String>) -> Self {
        HistoryError::MalformedIdentifier {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a new ReleaseFetch error
    pub fn release_fetch(release: impl Into<String>, message: impl Into<String>) -> Self {
        HistoryError::ReleaseFetch {
            release: release.into(),
            message: message.into(),
        }
    }

    /// Create a new Render error
    pub fn render(
        release: impl Into<String>,
        matrix_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        HistoryError::Render {
            release: release.into(),
            matrix_id: matrix_id.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        HistoryError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}
