//! Reed-Solomon erasure codec over GF(2^8)
//!
//! ## Generator matrix
//!
//! A `(k+m) × k` Vandermonde matrix has the property that any `k` of its rows
//! form an invertible matrix, but encoding with it would scramble the data
//! shards. Multiplying it by the inverse of its top `k × k` square turns that
//! square into the identity while keeping the property, so data shards pass
//! through unchanged and the last `m` rows produce parity.
//!
//! ## Shard sets
//!
//! Every operation takes all `k + m` shards, data first, in equal-length
//! buffers owned by the caller. Buffers are checked before anything is
//! written, so a failing call leaves every shard untouched.

use super::error::{Result, RsError};
use super::galois::Galois8;
use super::matrix::Matrix;
use super::scalar::{mul_table, process_slice_multiply_mode, WriteOp};
use super::types::CodecConfig;
use log::debug;
use smallvec::SmallVec;
use std::ops::Range;

/// Bytes recomputed at a time when checking parity
const CHECK_CHUNK: usize = 4096;

type ShardRefs<'a> = SmallVec<[&'a [u8]; 32]>;
type ShardMuts<'a> = SmallVec<[&'a mut [u8]; 32]>;

/// Reed-Solomon coding over 8-bit values
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    config: CodecConfig,
    matrix: Matrix,
    /// Generator rows `k..k+m`, kept as bytes for the coding loops
    parity_rows: Vec<Vec<u8>>,
}

impl ReedSolomon {
    /// Build a codec for `data_shards` data and `parity_shards` parity shards
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        Self::with_config(CodecConfig::new(data_shards, parity_shards)?)
    }

    pub fn with_config(config: CodecConfig) -> Result<Self> {
        let matrix = build_matrix(config.data_shards, config.total_shards())?;
        let parity_rows = (config.data_shards..config.total_shards())
            .map(|r| matrix.row_bytes(r))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Built {}x{} generator matrix ({} data + {} parity)",
            matrix.rows(),
            matrix.cols(),
            config.data_shards,
            config.parity_shards
        );

        Ok(Self {
            config,
            matrix,
            parity_rows,
        })
    }

    #[inline]
    pub fn config(&self) -> CodecConfig {
        self.config
    }

    #[inline]
    pub fn data_shard_count(&self) -> usize {
        self.config.data_shards
    }

    #[inline]
    pub fn parity_shard_count(&self) -> usize {
        self.config.parity_shards
    }

    #[inline]
    pub fn total_shard_count(&self) -> usize {
        self.config.total_shards()
    }

    /// The `(k+m) × k` generator matrix
    pub fn generator_matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Compute parity for bytes `offset..offset + byte_count` of every shard.
    ///
    /// Writes only the parity buffers and never reads their previous
    /// contents.
    pub fn encode_parity<S>(&self, shards: &mut [S], offset: usize, byte_count: usize) -> Result<()>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let range = self.check_buffers_and_sizes(shards, offset, byte_count)?;

        let (data, parity) = shards.split_at_mut(self.data_shard_count());
        let inputs: ShardRefs = data.iter().map(|s| &s.as_ref()[range.clone()]).collect();
        let mut outputs: ShardMuts = parity
            .iter_mut()
            .map(|s| &mut s.as_mut()[range.clone()])
            .collect();
        let rows: ShardRefs = self.parity_rows.iter().map(Vec::as_slice).collect();

        code_some_shards(&rows, &inputs, &mut outputs);
        Ok(())
    }

    /// Returns true if the parity shards hold the parity of the data shards
    /// over the given byte range.
    pub fn is_parity_correct<S>(&self, shards: &[S], offset: usize, byte_count: usize) -> Result<bool>
    where
        S: AsRef<[u8]>,
    {
        let range = self.check_buffers_and_sizes(shards, offset, byte_count)?;

        let (data, parity) = shards.split_at(self.data_shard_count());
        let inputs: ShardRefs = data.iter().map(|s| &s.as_ref()[range.clone()]).collect();
        let to_check: ShardRefs = parity.iter().map(|s| &s.as_ref()[range.clone()]).collect();
        let rows: ShardRefs = self.parity_rows.iter().map(Vec::as_slice).collect();

        Ok(check_some_shards(&rows, &inputs, &to_check))
    }

    /// Recompute the shards flagged absent in `present`.
    ///
    /// Does nothing if every shard is present. Missing data shards are
    /// rebuilt from the first `k` present shards through the inverse of their
    /// generator rows; missing parity is then re-encoded from the complete
    /// data shards. Absent buffers must still have the right length; their
    /// contents are ignored and overwritten.
    pub fn decode_missing<S>(
        &self,
        shards: &mut [S],
        present: &[bool],
        offset: usize,
        byte_count: usize,
    ) -> Result<()>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let range = self.check_buffers_and_sizes(shards, offset, byte_count)?;
        let k = self.data_shard_count();
        let total = self.total_shard_count();

        if present.len() != total {
            return Err(RsError::InvalidArgument(format!(
                "presence vector has {} entries, expected {}",
                present.len(),
                total
            )));
        }

        let number_present = present.iter().filter(|&&p| p).count();
        if number_present == total {
            return Ok(());
        }
        if number_present < k {
            return Err(RsError::InsufficientShards {
                present: number_present,
                needed: k,
            });
        }

        // Rows of the generator for the shards we have; inverting them maps
        // those shards back to the original data.
        let valid_indices: SmallVec<[usize; 32]> = present
            .iter()
            .enumerate()
            .filter(|(_, &p)| p)
            .map(|(i, _)| i)
            .take(k)
            .collect();
        let mut sub_matrix = Matrix::zero(k, k);
        for (sub_row, &row) in valid_indices.iter().enumerate() {
            for c in 0..k {
                sub_matrix.set(sub_row, c, self.matrix.get(row, c)?)?;
            }
        }
        let decode_matrix = sub_matrix.invert()?;

        let missing_data: SmallVec<[usize; 32]> = (0..k).filter(|&i| !present[i]).collect();
        let missing_parity: SmallVec<[usize; 32]> = (k..total).filter(|&i| !present[i]).collect();
        debug!(
            "Decoding with shards {:?}: rebuilding data {:?}, parity {:?}",
            valid_indices, missing_data, missing_parity
        );

        if !missing_data.is_empty() {
            let decode_rows = missing_data
                .iter()
                .map(|&i| decode_matrix.row_bytes(i))
                .collect::<Result<Vec<_>>>()?;
            let rows: ShardRefs = decode_rows.iter().map(Vec::as_slice).collect();

            let mut inputs: ShardRefs = SmallVec::new();
            let mut outputs: ShardMuts = SmallVec::new();
            for (i, shard) in shards.iter_mut().enumerate() {
                let bytes = &mut shard.as_mut()[range.clone()];
                if present[i] {
                    if inputs.len() < k {
                        inputs.push(bytes);
                    }
                } else if i < k {
                    outputs.push(bytes);
                }
            }

            code_some_shards(&rows, &inputs, &mut outputs);
        }

        // All data shards are intact now, so parity is plain encoding
        if !missing_parity.is_empty() {
            let (data, parity) = shards.split_at_mut(k);
            let inputs: ShardRefs = data.iter().map(|s| &s.as_ref()[range.clone()]).collect();

            let mut rows: ShardRefs = SmallVec::new();
            let mut outputs: ShardMuts = SmallVec::new();
            for (j, shard) in parity.iter_mut().enumerate() {
                if !present[k + j] {
                    rows.push(&self.parity_rows[j]);
                    outputs.push(&mut shard.as_mut()[range.clone()]);
                }
            }

            code_some_shards(&rows, &inputs, &mut outputs);
        }

        Ok(())
    }

    /// Checks the shard count, equal lengths and the byte range, returning
    /// the range to process.
    pub fn check_buffers_and_sizes<S: AsRef<[u8]>>(
        &self,
        shards: &[S],
        offset: usize,
        byte_count: usize,
    ) -> Result<Range<usize>> {
        if shards.len() != self.total_shard_count() {
            return Err(RsError::InvalidArgument(format!(
                "wrong number of shards: {}, expected {}",
                shards.len(),
                self.total_shard_count()
            )));
        }

        let shard_length = shards[0].as_ref().len();
        if let Some(i) = shards.iter().position(|s| s.as_ref().len() != shard_length) {
            return Err(RsError::InvalidArgument(format!(
                "shards are different sizes: shard {} has {} bytes, shard 0 has {}",
                i,
                shards[i].as_ref().len(),
                shard_length
            )));
        }

        match offset.checked_add(byte_count) {
            Some(end) if end <= shard_length => Ok(offset..end),
            _ => Err(RsError::InvalidArgument(format!(
                "buffers too small: offset {} + byte count {} exceeds shard length {}",
                offset, byte_count, shard_length
            ))),
        }
    }
}

/// Multiplies a set of matrix rows by the input shards, writing one output
/// per row: `outputs[r] = Σ rows[r][c] * inputs[c]`.
fn code_some_shards(rows: &[&[u8]], inputs: &[&[u8]], outputs: &mut [&mut [u8]]) {
    for (row, output) in rows.iter().zip(outputs.iter_mut()) {
        for (c, (&coefficient, input)) in row.iter().zip(inputs).enumerate() {
            let mode = if c == 0 { WriteOp::Direct } else { WriteOp::Add };
            process_slice_multiply_mode(input, output, mul_table(coefficient), mode);
        }
    }
}

/// Same computation as [`code_some_shards`], compared against existing
/// buffers. Stops at the first mismatching chunk.
fn check_some_shards(rows: &[&[u8]], inputs: &[&[u8]], to_check: &[&[u8]]) -> bool {
    let len = to_check.first().map_or(0, |s| s.len());
    let mut scratch = [0u8; CHECK_CHUNK];

    for start in (0..len).step_by(CHECK_CHUNK) {
        let end = (start + CHECK_CHUNK).min(len);
        let computed = &mut scratch[..end - start];

        for (row, expected) in rows.iter().zip(to_check) {
            for (c, (&coefficient, input)) in row.iter().zip(inputs).enumerate() {
                let mode = if c == 0 { WriteOp::Direct } else { WriteOp::Add };
                process_slice_multiply_mode(&input[start..end], computed, mul_table(coefficient), mode);
            }
            if *computed != expected[start..end] {
                return false;
            }
        }
    }

    true
}

/// Create the encoding matrix: Vandermonde times the inverse of its top
/// square, so the top `data_shards` rows are the identity.
fn build_matrix(data_shards: usize, total_shards: usize) -> Result<Matrix> {
    let vandermonde = vandermonde(total_shards, data_shards)?;
    let top = vandermonde.submatrix(0, 0, data_shards, data_shards)?;
    vandermonde.multiply(&top.invert()?)
}

/// `V[r][c] = r^c`, with the row index used directly as a field element
fn vandermonde(rows: usize, cols: usize) -> Result<Matrix> {
    let mut result = Matrix::zero(rows, cols);
    for r in 0..rows {
        let base = Galois8::new(r as u8);
        for c in 0..cols {
            result.set(r, c, base.pow(c))?;
        }
    }
    Ok(result)
}
