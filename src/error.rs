//! Error types for the binary state tree.

use thiserror::Error;

/// Errors that can occur during tree operations.
///
/// Every check runs before the tree is touched, so a returned error never
/// leaves a partially applied mutation behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BstError {
    /// Invalid key length
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Invalid stem length
    #[error("invalid stem length: expected 31 bytes, got {0}")]
    InvalidStemLength(usize),

    /// Values must carry at least one byte
    #[error("empty value")]
    EmptyValue,

    /// Invalid proof
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, BstError>;
