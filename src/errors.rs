use thiserror::Error;

/// All errors that can occur in CypherCell.
///
/// None of the variants ever carries secret material, so formatting an
/// error is always safe to log.
#[derive(Debug, Error)]
pub enum CypherCellError {
    // --- Disclosure errors ---
    #[error("cell is empty (already wiped or disposed)")]
    EmptyCell,

    #[error("cell has expired (time-to-live exceeded)")]
    Expired,

    #[error("cell contents are not valid UTF-8")]
    InvalidEncoding,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for CypherCell results.
pub type Result<T> = std::result::Result<T, CypherCellError>;
