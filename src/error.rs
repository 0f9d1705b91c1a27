use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error on line {line}: {reason} ({content:?})")]
    Format {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoverError>;
