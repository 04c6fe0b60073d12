//! On-disk framing for individual shards
//!
//! Each shard is stored as a 36-byte little-endian header followed by the
//! shard bytes:
//!
//! ```text
//! magic "RS256SHD" | version u16 | data u16 | parity u16 | index u16
//! original_len u64 | shard_len u64 | crc32 u32 | body[shard_len]
//! ```
//!
//! The CRC32 covers the body only. A shard whose header or checksum does not
//! verify is treated as missing by [`load_shard_set`].

use binrw::{BinRead, BinWrite};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current shard file format version
pub const FORMAT_VERSION: u16 = 1;

/// File extension for shard files
pub const SHARD_EXTENSION: &str = "rs256";

/// Errors that can occur while reading or writing shard files
#[derive(Debug, Error)]
pub enum ShardFileError {
    /// Failed to open, create or read a file
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Header could not be parsed (bad magic, short file)
    #[error("Malformed shard header: {0}")]
    Header(#[from] binrw::Error),

    /// Header carries a version this build does not read
    #[error("Unsupported shard file version {0}")]
    UnsupportedVersion(u16),

    /// Body length disagrees with the header
    #[error("Shard body is {actual} bytes, header says {expected}")]
    LengthMismatch { expected: u64, actual: u64 },

    /// Body does not match its checksum
    #[error("CRC32 mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    /// Valid shards in one directory disagree on the coding parameters
    #[error("Shard {path} does not belong to the same set: {reason}")]
    Inconsistent { path: PathBuf, reason: String },

    /// No readable shard was found
    #[error("No valid shard files in {0}")]
    NoShards(PathBuf),
}

/// Result type for shard file operations
pub type Result<T> = std::result::Result<T, ShardFileError>;

/// Fixed-size header in front of every shard body
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = b"RS256SHD")]
pub struct ShardHeader {
    pub version: u16,
    pub data_shards: u16,
    pub parity_shards: u16,
    pub index: u16,
    pub original_len: u64,
    pub shard_len: u64,
    pub crc32: u32,
}

impl ShardHeader {
    /// Whether two headers describe shards of the same encoded payload
    fn same_set(&self, other: &ShardHeader) -> bool {
        self.data_shards == other.data_shards
            && self.parity_shards == other.parity_shards
            && self.original_len == other.original_len
            && self.shard_len == other.shard_len
    }
}

/// A shard together with its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardFile {
    pub header: ShardHeader,
    pub data: Vec<u8>,
}

impl ShardFile {
    /// Frame `data` as shard `index` of a `data_shards + parity_shards` set
    pub fn new(
        data_shards: u16,
        parity_shards: u16,
        index: u16,
        original_len: u64,
        data: Vec<u8>,
    ) -> Self {
        let header = ShardHeader {
            version: FORMAT_VERSION,
            data_shards,
            parity_shards,
            index,
            original_len,
            shard_len: data.len() as u64,
            crc32: crc32fast::hash(&data),
        };
        Self { header, data }
    }

    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.header.write(writer)?;
        writer.write_all(&self.data).map_err(binrw::Error::Io)?;
        Ok(())
    }

    /// Parse and verify a shard: version, body length and CRC32
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let header = ShardHeader::read(reader)?;
        if header.version != FORMAT_VERSION {
            return Err(ShardFileError::UnsupportedVersion(header.version));
        }

        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(binrw::Error::Io)?;
        if data.len() as u64 != header.shard_len {
            return Err(ShardFileError::LengthMismatch {
                expected: header.shard_len,
                actual: data.len() as u64,
            });
        }

        let computed = crc32fast::hash(&data);
        if computed != header.crc32 {
            return Err(ShardFileError::ChecksumMismatch {
                expected: header.crc32,
                computed,
            });
        }

        Ok(Self { header, data })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| ShardFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(|source| ShardFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote shard {} to {:?}", self.header.index, path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ShardFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_from(&mut BufReader::new(file))
    }
}

/// Conventional file name for shard `index`
pub fn shard_file_name(index: usize) -> String {
    format!("shard_{:03}.{}", index, SHARD_EXTENSION)
}

/// A shard set rebuilt from a directory: absent or corrupt shards are
/// zero-filled and flagged in `present`.
#[derive(Debug)]
pub struct LoadedShardSet {
    pub data_shards: usize,
    pub parity_shards: usize,
    pub original_len: usize,
    pub shards: Vec<Vec<u8>>,
    pub present: Vec<bool>,
}

/// A shard belongs to the set if its index fits its own shard counts and its
/// header agrees with the first accepted shard.
fn check_membership(path: &Path, header: &ShardHeader, template: Option<&ShardHeader>) -> Result<()> {
    let total = header.data_shards as usize + header.parity_shards as usize;
    if header.index as usize >= total {
        return Err(ShardFileError::Inconsistent {
            path: path.to_path_buf(),
            reason: format!("index {} outside a set of {}", header.index, total),
        });
    }
    if let Some(template) = template {
        if !template.same_set(header) {
            return Err(ShardFileError::Inconsistent {
                path: path.to_path_buf(),
                reason: format!("{:?} vs {:?}", header, template),
            });
        }
    }
    Ok(())
}

/// Read every `*.rs256` file in `dir` into a shard set.
///
/// Unreadable, corrupt or foreign files are logged and left absent.
pub fn load_shard_set(dir: &Path) -> Result<LoadedShardSet> {
    let io_err = |source| ShardFileError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == SHARD_EXTENSION))
        .collect();
    paths.sort();

    let mut template: Option<ShardHeader> = None;
    let mut accepted: Vec<ShardFile> = Vec::new();
    for path in &paths {
        let result = ShardFile::load(path).and_then(|shard| {
            check_membership(path, &shard.header, template.as_ref())?;
            Ok(shard)
        });
        match result {
            Ok(shard) => {
                template.get_or_insert_with(|| shard.header.clone());
                accepted.push(shard);
            }
            Err(e) => warn!("Ignoring shard {:?}: {}", path, e),
        }
    }

    let Some(template) = template else {
        return Err(ShardFileError::NoShards(dir.to_path_buf()));
    };
    let total = template.data_shards as usize + template.parity_shards as usize;

    let mut shards = vec![vec![0u8; template.shard_len as usize]; total];
    let mut present = vec![false; total];
    for shard in accepted {
        let index = shard.header.index as usize;
        shards[index] = shard.data;
        present[index] = true;
    }

    debug!(
        "Loaded {}/{} shards from {:?}",
        present.iter().filter(|&&p| p).count(),
        total,
        dir
    );

    Ok(LoadedShardSet {
        data_shards: template.data_shards as usize,
        parity_shards: template.parity_shards as usize,
        original_len: template.original_len as usize,
        shards,
        present,
    })
}
