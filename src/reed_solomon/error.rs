//! Error types for Reed-Solomon operations

use thiserror::Error;

/// Errors that can occur in field arithmetic, matrix algebra and coding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsError {
    /// Shard set or codec parameters are malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Matrix cell or row access outside the matrix
    #[error("Index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Operand shapes are incompatible for multiply or augment
    #[error("Dimension mismatch: {left_rows}x{left_cols} and {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    /// Only square matrices can be inverted
    #[error("Only square matrices can be inverted, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Matrix has no inverse
    #[error("Matrix is singular")]
    Singular,

    /// Division by the zero element of the field
    #[error("Division by zero in Galois field")]
    DivisionByZero,

    /// Polynomial does not generate the multiplicative group
    #[error("Duplicate logarithm while building tables for polynomial {0}")]
    InvalidPolynomial(u8),

    /// Fewer than `needed` shards are present
    #[error("Not enough shards present: have {present}, need {needed}")]
    InsufficientShards { present: usize, needed: usize },
}

/// Result type for Reed-Solomon operations
pub type Result<T> = std::result::Result<T, RsError>;
