//! Reed-Solomon erasure coding over GF(2^8)
//!
//! [`reed_solomon`] holds the field, matrix and codec. The other modules are
//! thin layers on top of it: [`payload`] splits and joins whole byte
//! payloads, [`parallel`] runs the codec over stripes on the rayon pool, and
//! [`shard_file`] frames shards on disk for the `rs256` tool.

pub mod parallel;
pub mod payload;
pub mod reed_solomon;
pub mod shard_file;

pub use reed_solomon::{CodecConfig, Galois8, Matrix, ReedSolomon, RsError};
