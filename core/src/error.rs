use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Short read at offset {offset:#x}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid boot sector: {0}")]
    FormatError(String),

    #[error("{region} index {index} out of range (limit {limit})")]
    RangeError {
        region: &'static str,
        index: u64,
        limit: u64,
    },

    #[error("Corrupt cluster chain: {0}")]
    ChainError(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] serde_json::Error),
}

/// Coarse classification of a [`FatError`], one per failure domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Range,
    Chain,
    NotFound,
    InvalidInput,
}

impl FatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FatError::IoError(_) | FatError::ShortRead { .. } => ErrorKind::Io,
            FatError::FormatError(_) => ErrorKind::Format,
            FatError::RangeError { .. } => ErrorKind::Range,
            FatError::ChainError(_) => ErrorKind::Chain,
            FatError::NotFound(_) => ErrorKind::NotFound,
            FatError::InvalidName(_) | FatError::Configuration(_) => ErrorKind::InvalidInput,
        }
    }
}
