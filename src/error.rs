//! Error kinds for simulation setup and collision response

/// Simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Degenerate contact between bodies {a} and {b}: centres coincide")]
    DegenerateContact { a: usize, b: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::InvalidConfig(msg.into())
    }
}
