use thiserror::Error;

#[derive(Error, Debug)]
pub enum DcpError {
    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("Failed to decode {file_name}: {reason}")]
    Decode { file_name: String, reason: String },

    #[error("No documents in batch")]
    EmptyBatch,

    #[error("Too many documents in batch: {count} (max {max})")]
    TooManyDocuments { count: usize, max: usize },

    #[error("Invalid section marker: {0}")]
    InvalidMarker(#[from] regex::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DcpError>;
