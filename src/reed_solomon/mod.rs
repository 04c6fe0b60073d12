//! Reed-Solomon Erasure Coding Module
//!
//! Given `k` data shards this module computes `m` parity shards such that any
//! `k` of the `k + m` shards are enough to rebuild the rest. All arithmetic is
//! done in GF(2^8) with generating polynomial 29.
//!
//! Layering, bottom up: [`galois`] field arithmetic, [`matrix`] dense
//! matrices with inversion, [`scalar`] slice kernels, and [`codec`] which
//! builds the generator matrix and exposes encode / verify / decode.

pub mod codec;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod scalar;
pub mod types;

pub use codec::*;
pub use error::*;
pub use galois::*;
pub use matrix::*;
pub use scalar::*;
pub use types::*;
