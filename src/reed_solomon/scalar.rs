//! Scalar GF(2^8) slice kernels for Reed-Solomon coding
//!
//! Every coded byte is a sum of products `coefficient * input[i]`, where the
//! coefficient is fixed for a whole slice. Instead of two log lookups and an
//! exp lookup per byte, the kernels index a 256-entry row of a precomputed
//! product table chosen once per coefficient.
//!
//! ## Key Components
//!
//! - **`MulTable`**: the 256 products of one coefficient with every byte
//! - **`WriteOp`**: operation mode (direct write vs XOR accumulate)
//! - **Slice kernels**: 8-way unrolled loops over the table

use super::galois::{Galois8, FIELD_SIZE};
use std::sync::OnceLock;

/// Specifies how to combine the multiplication result with the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Direct write: output = coefficient * input (replaces contents)
    Direct,
    /// Accumulate: output = output XOR (coefficient * input)
    Add,
}

/// Products of one coefficient with each of the 256 field elements
pub type MulTable = [u8; FIELD_SIZE];

/// Full 256 × 256 product table, 64 KiB, built on first use
fn product_table() -> &'static [MulTable; FIELD_SIZE] {
    static TABLE: OnceLock<Box<[MulTable; FIELD_SIZE]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Box::new([[0u8; FIELD_SIZE]; FIELD_SIZE]);
        for (a, row) in table.iter_mut().enumerate() {
            for (b, cell) in row.iter_mut().enumerate() {
                *cell = (Galois8::new(a as u8) * Galois8::new(b as u8)).value();
            }
        }
        table
    })
}

/// Multiplication table for a coefficient
#[inline]
pub fn mul_table(coefficient: u8) -> &'static MulTable {
    &product_table()[coefficient as usize]
}

/// Scalar GF(2^8) multiply over a slice with configurable write mode
///
/// Processes `min(input.len(), output.len())` bytes.
#[inline]
pub fn process_slice_multiply_mode(
    input: &[u8],
    output: &mut [u8],
    table: &MulTable,
    mode: WriteOp,
) {
    let len = input.len().min(output.len());
    let (input, output) = (&input[..len], &mut output[..len]);

    let mut in_chunks = input.chunks_exact(8);
    let mut out_chunks = output.chunks_exact_mut(8);
    for (i, o) in (&mut in_chunks).zip(&mut out_chunks) {
        let r = [
            table[i[0] as usize],
            table[i[1] as usize],
            table[i[2] as usize],
            table[i[3] as usize],
            table[i[4] as usize],
            table[i[5] as usize],
            table[i[6] as usize],
            table[i[7] as usize],
        ];
        match mode {
            WriteOp::Direct => o.copy_from_slice(&r),
            WriteOp::Add => {
                for (dst, src) in o.iter_mut().zip(r) {
                    *dst ^= src;
                }
            }
        }
    }

    // Handle the trailing 0-7 bytes
    for (i, o) in in_chunks
        .remainder()
        .iter()
        .zip(out_chunks.into_remainder())
    {
        match mode {
            WriteOp::Direct => *o = table[*i as usize],
            WriteOp::Add => *o ^= table[*i as usize],
        }
    }
}

/// Scalar multiply with direct write: `output = coefficient * input`
#[inline]
pub fn process_slice_multiply_direct(input: &[u8], output: &mut [u8], table: &MulTable) {
    process_slice_multiply_mode(input, output, table, WriteOp::Direct);
}

/// Scalar multiply with XOR accumulate: `output ^= coefficient * input`
///
/// This is the most common operation in Reed-Solomon coding.
#[inline]
pub fn process_slice_multiply_add(input: &[u8], output: &mut [u8], table: &MulTable) {
    process_slice_multiply_mode(input, output, table, WriteOp::Add);
}
