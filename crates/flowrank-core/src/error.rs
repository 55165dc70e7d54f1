//! Error types for FlowRank.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model response error: {0}")]
    ModelResponse(String),

    #[error("Instruction error: {0}")]
    Instruction(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
