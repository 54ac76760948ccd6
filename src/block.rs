//! Read-only block view of the source file plus the session metadata derived
//! from it.

use std::path::Path;

use thiserror::Error;

use crate::randgen::RAND_MAX;

/// Largest admissible block count. Index selection reduces a 15-bit draw
/// modulo the block count, so any block beyond `RAND_MAX + 1` could never be
/// chosen and would silently vanish from every packet.
pub const MAX_BLOCK_COUNT: usize = RAND_MAX as usize + 1;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),
    #[error("Source file is empty")]
    EmptyFile,
    #[error("File too large: {0} bytes exceeds the u32 wire field")]
    FileTooLarge(u64),
    #[error("Too many blocks: {0}, at most {max} are addressable, increase the block size", max = MAX_BLOCK_COUNT)]
    TooManyBlocks(usize),
    #[error("Block index {index} out of range (block count {count})")]
    IndexOutOfRange { index: u16, count: u16 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-session file description, computed once at startup and sent verbatim in
/// every metadata reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub block_size: u16,
    pub block_count: u16,
    pub file_size: u32,
    pub filename: String,
}

impl FileMetadata {
    /// `ceil(file_size / block_size)`, the number of source blocks. Returned
    /// wide so callers can range-check before narrowing to the wire field.
    pub fn block_count_for(file_size: u32, block_size: u16) -> usize {
        let (size, blk) = (file_size as u64, block_size as u64);
        ((size + blk - 1) / blk) as usize
    }
}

/// The source file split into fixed-size blocks, tail zero-padded. Immutable
/// for the lifetime of a session; every encoder invocation shares one handle.
#[derive(Debug)]
pub struct BlockStore {
    data: Vec<u8>,
    metadata: FileMetadata,
}

impl BlockStore {
    /// Build a store from in-memory contents. The backing buffer is padded so
    /// the final block is exactly `block_size` bytes.
    pub fn from_bytes(
        contents: Vec<u8>,
        block_size: u16,
        filename: &str,
    ) -> Result<Self, BlockError> {
        if block_size == 0 {
            return Err(BlockError::InvalidBlockSize(0));
        }
        if contents.is_empty() {
            return Err(BlockError::EmptyFile);
        }
        if contents.len() > u32::MAX as usize {
            return Err(BlockError::FileTooLarge(contents.len() as u64));
        }
        let file_size = contents.len() as u32;

        let count = FileMetadata::block_count_for(file_size, block_size);
        if count > MAX_BLOCK_COUNT {
            return Err(BlockError::TooManyBlocks(count));
        }

        let mut data = contents;
        data.resize(count * block_size as usize, 0);

        Ok(Self {
            data,
            metadata: FileMetadata {
                block_size,
                block_count: count as u16,
                file_size,
                filename: filename.to_string(),
            },
        })
    }

    /// Read the file once and split it into blocks. Failure here is fatal to
    /// startup; nothing is bound or served before the store exists.
    pub async fn open(path: &Path, block_size: u16) -> Result<Self, BlockError> {
        let contents = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(contents, block_size, &filename)
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn block_size(&self) -> u16 {
        self.metadata.block_size
    }

    pub fn block_count(&self) -> u16 {
        self.metadata.block_count
    }

    /// Fetch one block; always exactly `block_size` bytes.
    pub fn block(&self, index: u16) -> Result<&[u8], BlockError> {
        if index >= self.metadata.block_count {
            return Err(BlockError::IndexOutOfRange {
                index,
                count: self.metadata.block_count,
            });
        }
        let start = index as usize * self.metadata.block_size as usize;
        Ok(&self.data[start..start + self.metadata.block_size as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_count_rounds_up() {
        // 300 / 128 = 2 remainder 44, so three blocks.
        assert_eq!(FileMetadata::block_count_for(300, 128), 3);
        // 256 / 128 divides exactly.
        assert_eq!(FileMetadata::block_count_for(256, 128), 2);
        assert_eq!(FileMetadata::block_count_for(1, 128), 1);
    }

    #[test]
    fn store_pads_final_block() {
        let store = BlockStore::from_bytes(vec![0xAB; 300], 128, "f.bin").unwrap();
        assert_eq!(store.block_count(), 3);
        assert_eq!(store.metadata().file_size, 300);

        let last = store.block(2).unwrap();
        assert_eq!(last.len(), 128);
        assert_eq!(&last[..44], &[0xAB; 44][..]);
        assert_eq!(&last[44..], &[0u8; 84][..]);
    }

    #[test]
    fn exact_multiple_is_not_padded() {
        let store = BlockStore::from_bytes(vec![1; 256], 128, "f.bin").unwrap();
        assert_eq!(store.block_count(), 2);
        assert_eq!(store.block(1).unwrap(), &[1u8; 128][..]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let store = BlockStore::from_bytes(vec![1; 256], 128, "f.bin").unwrap();
        assert!(matches!(
            store.block(2),
            Err(BlockError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            BlockStore::from_bytes(vec![1; 4], 0, "f"),
            Err(BlockError::InvalidBlockSize(0))
        ));
        assert!(matches!(
            BlockStore::from_bytes(Vec::new(), 128, "f"),
            Err(BlockError::EmptyFile)
        ));
    }

    #[test]
    fn block_count_is_capped_at_the_sampler_range() {
        // Index selection reduces 15-bit draws, so blocks past 32768 would
        // never appear in any packet and the file could never be rebuilt.
        assert!(matches!(
            BlockStore::from_bytes(vec![0; 40_000], 1, "f"),
            Err(BlockError::TooManyBlocks(40_000))
        ));
        assert!(matches!(
            BlockStore::from_bytes(vec![0; MAX_BLOCK_COUNT + 1], 1, "f"),
            Err(BlockError::TooManyBlocks(_))
        ));

        // Exactly MAX_BLOCK_COUNT blocks is fine: every index is reachable.
        let store = BlockStore::from_bytes(vec![0; MAX_BLOCK_COUNT], 1, "f").unwrap();
        assert_eq!(store.block_count() as usize, MAX_BLOCK_COUNT);
    }

    #[tokio::test]
    async fn open_reads_file_and_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.dat");
        tokio::fs::write(&path, vec![7u8; 200]).await.unwrap();

        let store = BlockStore::open(&path, 128).await.unwrap();
        assert_eq!(store.metadata().filename, "payload.dat");
        assert_eq!(store.block_count(), 2);
        assert_eq!(store.metadata().file_size, 200);
    }

    #[tokio::test]
    async fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = BlockStore::open(&dir.path().join("nope"), 128).await;
        assert!(matches!(err, Err(BlockError::Io(_))));
    }
}
