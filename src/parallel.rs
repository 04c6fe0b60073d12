//! Striped multi-threaded driver for the shard codec
//!
//! A byte range is cut into stripes of `stripe_size` bytes. Each stripe is a
//! full shard set made of disjoint sub-slices of the caller's buffers, so the
//! stripes are coded as independent codec calls on the rayon thread pool.

use crate::reed_solomon::{ReedSolomon, Result, RsError};
use log::debug;
use rayon::prelude::*;

/// Default stripe size: 64 KiB per shard
pub const DEFAULT_STRIPE_SIZE: usize = 64 * 1024;

fn check_stripe_size(stripe_size: usize) -> Result<()> {
    if stripe_size == 0 {
        return Err(RsError::InvalidArgument(
            "stripe size must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Cut every shard's `offset..offset + byte_count` into stripes and regroup
/// them as one shard set per stripe.
fn stripe_views_mut<'a, S>(
    codec: &ReedSolomon,
    shards: &'a mut [S],
    offset: usize,
    byte_count: usize,
    stripe_size: usize,
) -> Result<Vec<Vec<&'a mut [u8]>>>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    check_stripe_size(stripe_size)?;
    let range = codec.check_buffers_and_sizes(shards, offset, byte_count)?;

    let mut stripes: Vec<Vec<&mut [u8]>> = (0..byte_count.div_ceil(stripe_size))
        .map(|_| Vec::with_capacity(shards.len()))
        .collect();
    for shard in shards.iter_mut() {
        let chunks = shard.as_mut()[range.clone()].chunks_mut(stripe_size);
        for (stripe, chunk) in stripes.iter_mut().zip(chunks) {
            stripe.push(chunk);
        }
    }

    debug!("Split {} bytes into {} stripes", byte_count, stripes.len());
    Ok(stripes)
}

fn stripe_views<'a, S>(
    codec: &ReedSolomon,
    shards: &'a [S],
    offset: usize,
    byte_count: usize,
    stripe_size: usize,
) -> Result<Vec<Vec<&'a [u8]>>>
where
    S: AsRef<[u8]>,
{
    check_stripe_size(stripe_size)?;
    let range = codec.check_buffers_and_sizes(shards, offset, byte_count)?;

    let mut stripes: Vec<Vec<&[u8]>> = (0..byte_count.div_ceil(stripe_size))
        .map(|_| Vec::with_capacity(shards.len()))
        .collect();
    for shard in shards {
        let chunks = shard.as_ref()[range.clone()].chunks(stripe_size);
        for (stripe, chunk) in stripes.iter_mut().zip(chunks) {
            stripe.push(chunk);
        }
    }
    Ok(stripes)
}

/// [`ReedSolomon::encode_parity`], one stripe per task
pub fn encode_parity<S>(
    codec: &ReedSolomon,
    shards: &mut [S],
    offset: usize,
    byte_count: usize,
    stripe_size: usize,
) -> Result<()>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    stripe_views_mut(codec, shards, offset, byte_count, stripe_size)?
        .into_par_iter()
        .try_for_each(|mut stripe| {
            let len = stripe[0].len();
            codec.encode_parity(&mut stripe, 0, len)
        })
}

/// [`ReedSolomon::is_parity_correct`], one stripe per task
pub fn is_parity_correct<S>(
    codec: &ReedSolomon,
    shards: &[S],
    offset: usize,
    byte_count: usize,
    stripe_size: usize,
) -> Result<bool>
where
    S: AsRef<[u8]>,
{
    let results = stripe_views(codec, shards, offset, byte_count, stripe_size)?
        .into_par_iter()
        .map(|stripe| {
            let len = stripe[0].len();
            codec.is_parity_correct(&stripe, 0, len)
        })
        .collect::<Result<Vec<bool>>>()?;
    Ok(results.into_iter().all(|ok| ok))
}

/// [`ReedSolomon::decode_missing`], one stripe per task.
///
/// The shard count and presence are checked up front so an unrecoverable
/// erasure pattern fails before any stripe is written.
pub fn decode_missing<S>(
    codec: &ReedSolomon,
    shards: &mut [S],
    present: &[bool],
    offset: usize,
    byte_count: usize,
    stripe_size: usize,
) -> Result<()>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    if present.len() != codec.total_shard_count() {
        return Err(RsError::InvalidArgument(format!(
            "presence vector has {} entries, expected {}",
            present.len(),
            codec.total_shard_count()
        )));
    }
    let number_present = present.iter().filter(|&&p| p).count();
    if number_present < codec.data_shard_count() {
        return Err(RsError::InsufficientShards {
            present: number_present,
            needed: codec.data_shard_count(),
        });
    }

    stripe_views_mut(codec, shards, offset, byte_count, stripe_size)?
        .into_par_iter()
        .try_for_each(|mut stripe| {
            let len = stripe[0].len();
            codec.decode_missing(&mut stripe, present, 0, len)
        })
}
