use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SecurityError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Image analysis failed: {0}")]
    ImageAnalysis(String),

    #[error("Invalid arming status: {0}")]
    InvalidArmingStatus(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SecurityError>;
