use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    #[error("expected {expected} hand landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("two-hand distance needs exactly 2 hands, got {0}")]
    HandCount(usize),

    #[error("invalid color `{0}`, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
