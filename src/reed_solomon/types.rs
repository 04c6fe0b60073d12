//! Types and structures for Reed-Solomon operations

use super::error::{Result, RsError};
use super::galois::FIELD_SIZE;

/// Largest `k + m` the field can represent: each shard index becomes a
/// distinct Vandermonde evaluation point.
pub const MAX_TOTAL_SHARDS: usize = FIELD_SIZE;

/// Validated shard counts for a codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub data_shards: usize,
    pub parity_shards: usize,
}

impl CodecConfig {
    /// Check shard counts against the field size
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        if data_shards == 0 {
            return Err(RsError::InvalidArgument(
                "data shard count must be positive".to_string(),
            ));
        }
        if parity_shards == 0 {
            return Err(RsError::InvalidArgument(
                "parity shard count must be positive".to_string(),
            ));
        }
        if data_shards + parity_shards > MAX_TOTAL_SHARDS {
            return Err(RsError::InvalidArgument(format!(
                "total shard count {} exceeds {}",
                data_shards + parity_shards,
                MAX_TOTAL_SHARDS
            )));
        }

        Ok(Self {
            data_shards,
            parity_shards,
        })
    }

    #[inline]
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Whether `missing` simultaneous erasures can be repaired
    #[inline]
    pub fn can_recover(&self, missing: usize) -> bool {
        missing <= self.parity_shards
    }
}
