use thiserror::Error;

#[derive(Error, Debug)]
pub enum HrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Cannot {action} #{id}: status is {from}")]
    InvalidTransition {
        id: u64,
        from: String,
        action: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, HrError>;
