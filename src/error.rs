//! Error types for vehicle-locator.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LocatorError>;

/// Errors surfaced by loading, decoding and configuration.
///
/// An empty dataset and a query with no match are not errors: index builders
/// accept empty input and queries return `Option`.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// The position file is missing, unreadable or permission-denied.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a record.
    #[error("truncated record starting at byte {offset}: stream ended while reading `{field}`")]
    Truncated {
        field: &'static str,
        offset: usize,
    },

    /// A record that cannot be written in the binary layout.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LocatorError {
    /// True for the decode failure kind, as opposed to I/O or configuration errors.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, LocatorError::Truncated { .. })
    }
}
