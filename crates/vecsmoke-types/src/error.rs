//! Error types for the vecsmoke harness.

use thiserror::Error;

use crate::point::PointId;

/// Configuration and input errors raised before any network call.
#[derive(Debug, Error)]
pub enum SmokeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while reading an input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

/// Client-side validation failures for collections, points and queries.
///
/// A batch that fails validation is never sent, so the remote collection
/// is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Collection name is empty
    #[error("collection name must not be empty")]
    EmptyCollectionName,

    /// Dimensionality of zero
    #[error("vector dimensionality must be positive")]
    ZeroDimension,

    /// A point's vector length differs from the collection dimensionality
    #[error("point {id}: vector length {actual} does not match dimensionality {expected}")]
    DimensionMismatch {
        id: PointId,
        expected: u64,
        actual: usize,
    },

    /// Query vector length differs from the collection dimensionality
    #[error("query vector length {actual} does not match dimensionality {expected}")]
    QueryDimensionMismatch { expected: u64, actual: usize },

    /// The same id appears twice in one batch
    #[error("duplicate point id {0} in batch")]
    DuplicateId(PointId),

    /// Id is neither an unsigned integer nor a UUID
    #[error("invalid point id {0:?}: expected an unsigned integer or a UUID")]
    InvalidId(String),

    /// NaN or infinite vector component
    #[error("point {0}: vector contains a non-finite component")]
    NonFinite(PointId),

    /// Query vector contains NaN or infinity
    #[error("query vector contains a non-finite component")]
    NonFiniteQuery,

    /// Nothing to upsert
    #[error("point batch is empty")]
    EmptyBatch,

    /// Search limit of zero
    #[error("search limit must be positive")]
    ZeroLimit,
}
