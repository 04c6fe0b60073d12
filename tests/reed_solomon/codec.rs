//! Codec Tests
//!
//! Generator matrix invariants, encode / verify / reconstruct and the
//! erasure bound, exercised through the public API only.

use rs256::reed_solomon::{Matrix, ReedSolomon, RsError};

/// Every `size`-element subset of `0..n`, in lexicographic order
fn combinations(n: usize, size: usize) -> Vec<Vec<usize>> {
    fn extend(start: usize, n: usize, size: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            extend(i + 1, n, size, current, out);
            current.pop();
        }
    }
    let mut out = Vec::new();
    extend(0, n, size, &mut Vec::new(), &mut out);
    out
}

fn test_shards(codec: &ReedSolomon, shard_size: usize) -> Vec<Vec<u8>> {
    (0..codec.total_shard_count())
        .map(|i| {
            if i < codec.data_shard_count() {
                (0..shard_size).map(|b| (b * 13 + i * 101 + 7) as u8).collect()
            } else {
                vec![0u8; shard_size]
            }
        })
        .collect()
}

fn scenario_shards() -> Vec<Vec<u8>> {
    vec![
        vec![0, 1, 2, 3],
        vec![4, 5, 6, 7],
        vec![8, 9, 10, 11],
        vec![12, 13, 14, 15],
        vec![0; 4],
        vec![0; 4],
    ]
}

// ============================================================================
// Generator Matrix
// ============================================================================

#[test]
fn test_generator_top_is_identity() {
    for (k, m) in [(1, 1), (3, 2), (4, 4), (10, 4), (17, 3)] {
        let codec = ReedSolomon::new(k, m).unwrap();
        let matrix = codec.generator_matrix();
        assert_eq!(matrix.dimensions(), (k + m, k));
        assert_eq!(matrix.submatrix(0, 0, k, k).unwrap(), Matrix::identity(k));
    }
}

#[test]
fn test_every_k_rows_invertible() {
    for (k, m) in [(2, 2), (3, 3), (4, 4), (5, 3)] {
        let codec = ReedSolomon::new(k, m).unwrap();
        let matrix = codec.generator_matrix();
        for rows in combinations(k + m, k) {
            let selected: Vec<Vec<u8>> = rows.iter().map(|&r| matrix.row_bytes(r).unwrap()).collect();
            let square = Matrix::from_rows(&selected).unwrap();
            assert!(square.invert().is_ok(), "rows {:?} of {}+{}", rows, k, m);
        }
    }
}

#[test]
fn test_largest_field_sized_codec() {
    let codec = ReedSolomon::new(200, 56).unwrap();
    assert_eq!(codec.total_shard_count(), 256);
    assert_eq!(
        ReedSolomon::new(200, 57).unwrap_err(),
        RsError::InvalidArgument("total shard count 257 exceeds 256".to_string())
    );
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_encode() {
    let codec = ReedSolomon::new(4, 2).unwrap();
    let mut shards = scenario_shards();
    codec.encode_parity(&mut shards, 0, 4).unwrap();
    assert_eq!(shards[4], vec![16, 17, 18, 19]);
    assert_eq!(shards[5], vec![20, 21, 22, 23]);
}

#[test]
fn test_scenario_rebuild_data_and_parity() {
    let codec = ReedSolomon::new(4, 2).unwrap();
    let mut shards = scenario_shards();
    codec.encode_parity(&mut shards, 0, 4).unwrap();
    let original = shards.clone();

    shards[1].fill(0xEE);
    shards[4].fill(0xEE);
    let present = [true, false, true, true, false, true];
    codec.decode_missing(&mut shards, &present, 0, 4).unwrap();
    assert_eq!(shards, original);
}

#[test]
fn test_scenario_too_few_shards() {
    let codec = ReedSolomon::new(4, 2).unwrap();
    let mut shards = scenario_shards();
    codec.encode_parity(&mut shards, 0, 4).unwrap();
    let before = shards.clone();

    let present = [false, false, false, true, true, true];
    assert_eq!(
        codec.decode_missing(&mut shards, &present, 0, 4),
        Err(RsError::InsufficientShards { present: 3, needed: 4 })
    );
    assert_eq!(shards, before);
}

// ============================================================================
// Verification
// ============================================================================

#[test]
fn test_tamper_detection() {
    let codec = ReedSolomon::new(5, 3).unwrap();
    let mut shards = test_shards(&codec, 5000);
    codec.encode_parity(&mut shards, 0, 5000).unwrap();
    assert!(codec.is_parity_correct(&shards, 0, 5000).unwrap());

    for (shard, byte) in [(0, 0), (4, 4095), (5, 4096), (7, 4999)] {
        let mut tampered = shards.clone();
        tampered[shard][byte] ^= 0x01;
        assert!(
            !codec.is_parity_correct(&tampered, 0, 5000).unwrap(),
            "flip in shard {} byte {} went unnoticed",
            shard,
            byte
        );
    }
}

#[test]
fn test_verify_outside_tampered_range() {
    let codec = ReedSolomon::new(3, 2).unwrap();
    let mut shards = test_shards(&codec, 64);
    codec.encode_parity(&mut shards, 0, 64).unwrap();
    shards[2][60] ^= 0xFF;
    assert!(codec.is_parity_correct(&shards, 0, 60).unwrap());
    assert!(!codec.is_parity_correct(&shards, 0, 61).unwrap());
}

#[test]
fn test_slices_as_shards() {
    let codec = ReedSolomon::new(2, 1).unwrap();
    let mut backing = [1u8, 2, 3, 4, 0, 0];
    let (data, parity) = backing.split_at_mut(4);
    let (first, second) = data.split_at_mut(2);
    let mut shards: Vec<&mut [u8]> = vec![first, second, parity];
    codec.encode_parity(&mut shards, 0, 2).unwrap();
    assert!(codec.is_parity_correct(&shards, 0, 2).unwrap());
}

// ============================================================================
// Erasure Bound
// ============================================================================

#[test]
fn test_every_erasure_pattern() {
    let codec = ReedSolomon::new(4, 3).unwrap();
    let total = codec.total_shard_count();
    let mut encoded = test_shards(&codec, 37);
    codec.encode_parity(&mut encoded, 0, 37).unwrap();

    for mask in 0u32..(1 << total) {
        let present: Vec<bool> = (0..total).map(|i| mask & (1 << i) == 0).collect();
        let missing = present.iter().filter(|&&p| !p).count();

        let mut shards = encoded.clone();
        for (shard, &p) in shards.iter_mut().zip(&present) {
            if !p {
                shard.fill(0);
            }
        }

        let result = codec.decode_missing(&mut shards, &present, 0, 37);
        if missing <= codec.parity_shard_count() {
            assert_eq!(result, Ok(()), "pattern {:07b}", mask);
            assert_eq!(shards, encoded, "pattern {:07b}", mask);
        } else {
            assert_eq!(
                result,
                Err(RsError::InsufficientShards {
                    present: total - missing,
                    needed: 4
                })
            );
        }
    }
}

#[test]
fn test_single_data_shard() {
    // k = 1 is plain replication
    let codec = ReedSolomon::new(1, 3).unwrap();
    let mut shards = vec![vec![9u8, 8, 7], vec![0; 3], vec![0; 3], vec![0; 3]];
    codec.encode_parity(&mut shards, 0, 3).unwrap();
    for parity in &shards[1..] {
        assert_eq!(parity, &vec![9u8, 8, 7]);
    }
}

#[test]
fn test_zero_length_range() {
    let codec = ReedSolomon::new(3, 2).unwrap();
    let mut shards = vec![Vec::<u8>::new(); 5];
    codec.encode_parity(&mut shards, 0, 0).unwrap();
    assert!(codec.is_parity_correct(&shards, 0, 0).unwrap());
    codec
        .decode_missing(&mut shards, &[false, true, true, true, false], 0, 0)
        .unwrap();
}
