//! Whole-payload encoding on top of the shard codec
//!
//! Splits a byte payload into `k` equal data shards, appends `m` parity
//! shards, and reassembles the payload from any `k` surviving shards. The
//! `_padded` / `_striped` forms accept any payload length and run the codec
//! through [`crate::parallel`].

use crate::parallel;
use crate::reed_solomon::{ReedSolomon, Result, RsError};
use log::debug;

/// Split `data` into `k` data shards and compute `m` parity shards.
///
/// `data.len()` must be a multiple of the codec's data shard count.
pub fn encode(codec: &ReedSolomon, data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let k = codec.data_shard_count();
    if data.len() % k != 0 {
        return Err(RsError::InvalidArgument(format!(
            "payload length {} is not a multiple of {} data shards",
            data.len(),
            k
        )));
    }

    let shard_size = data.len() / k;
    let mut shards = split_into_shards(codec, data, shard_size);
    codec.encode_parity(&mut shards, 0, shard_size)?;
    debug!("Encoded {} bytes into {} shards of {} bytes", data.len(), shards.len(), shard_size);
    Ok(shards)
}

/// Like [`encode`], but zero-pads the last data shard so any length works,
/// and computes parity stripe by stripe.
///
/// The caller keeps `data.len()` to pass back to [`decode_striped`].
pub fn encode_padded(codec: &ReedSolomon, data: &[u8], stripe_size: usize) -> Result<Vec<Vec<u8>>> {
    let shard_size = data.len().div_ceil(codec.data_shard_count());
    let mut shards = split_into_shards(codec, data, shard_size);
    parallel::encode_parity(codec, &mut shards, 0, shard_size, stripe_size)?;
    debug!(
        "Encoded {} bytes into {} shards of {} bytes ({} padding)",
        data.len(),
        shards.len(),
        shard_size,
        shard_size * codec.data_shard_count() - data.len()
    );
    Ok(shards)
}

/// Rebuild missing shards in place and return the first `original_len`
/// bytes of the concatenated data shards.
pub fn decode<S>(codec: &ReedSolomon, shards: &mut [S], present: &[bool], original_len: usize) -> Result<Vec<u8>>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    let shard_size = check_capacity(codec, shards, original_len)?;
    codec.decode_missing(shards, present, 0, shard_size)?;
    Ok(join_data_shards(codec, shards, original_len))
}

/// [`decode`] with the rebuild spread over stripes of `stripe_size` bytes
pub fn decode_striped<S>(
    codec: &ReedSolomon,
    shards: &mut [S],
    present: &[bool],
    original_len: usize,
    stripe_size: usize,
) -> Result<Vec<u8>>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    let shard_size = check_capacity(codec, shards, original_len)?;
    parallel::decode_missing(codec, shards, present, 0, shard_size, stripe_size)?;
    Ok(join_data_shards(codec, shards, original_len))
}

/// `k` data shards of `shard_size` bytes, zero-padded past the end of
/// `data`, followed by `m` zeroed parity shards
fn split_into_shards(codec: &ReedSolomon, data: &[u8], shard_size: usize) -> Vec<Vec<u8>> {
    (0..codec.total_shard_count())
        .map(|i| {
            let mut shard = if i < codec.data_shard_count() {
                let start = (i * shard_size).min(data.len());
                let end = (start + shard_size).min(data.len());
                data[start..end].to_vec()
            } else {
                Vec::new()
            };
            shard.resize(shard_size, 0);
            shard
        })
        .collect()
}

/// Rejects an `original_len` the data shards cannot hold; returns the
/// shard size.
fn check_capacity<S: AsRef<[u8]>>(codec: &ReedSolomon, shards: &[S], original_len: usize) -> Result<usize> {
    let shard_size = shards.first().map_or(0, |s| s.as_ref().len());
    let capacity = shard_size.saturating_mul(codec.data_shard_count());
    if original_len > capacity {
        return Err(RsError::InvalidArgument(format!(
            "original length {} exceeds data capacity {}",
            original_len, capacity
        )));
    }
    Ok(shard_size)
}

fn join_data_shards<S: AsRef<[u8]>>(codec: &ReedSolomon, shards: &[S], original_len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(original_len);
    for shard in &shards[..codec.data_shard_count()] {
        data.extend_from_slice(shard.as_ref());
    }
    data.truncate(original_len);
    data
}
